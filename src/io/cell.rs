/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! CASTEP `.cell` reader (`LATTICE_CART` and `POSITIONS_FRAC` blocks)

use super::errors::{FileError, Result};
use crate::atoms::{Lattice, Position, Vector3D};
use crate::structure::Structure;
use log::debug;
use std::fs;
use std::path::Path;

/// Read a `.cell` file
pub fn read_cell<P: AsRef<Path>>(path: P) -> Result<Structure> {
    let path = path.as_ref();
    debug!("Reading {}", path.display());
    let content = fs::read_to_string(path)?;
    parse_cell(&content)
}

/// Parse `.cell` text
pub fn parse_cell(content: &str) -> Result<Structure> {
    let lattice_lines = block(content, "LATTICE_CART")?;
    // an optional unit line ("ang") precedes the vectors
    let vectors: Vec<(usize, &str)> = lattice_lines
        .into_iter()
        .filter(|(_, text)| text.split_whitespace().count() >= 3)
        .collect();
    if vectors.len() != 3 {
        return Err(FileError::InvalidFormat(format!(
            "LATTICE_CART needs 3 vectors, found {}",
            vectors.len()
        )));
    }
    let mut rows = [[0.0; 3]; 3];
    for (row, (line, text)) in rows.iter_mut().zip(&vectors) {
        *row = parse_numbers(text.split_whitespace(), *line)?;
    }
    let lattice = Lattice::new(rows)?;

    let mut species = Vec::new();
    let mut positions = Vec::new();
    for (line, text) in block(content, "POSITIONS_FRAC")? {
        let mut tokens = text.split_whitespace();
        let Some(label) = tokens.next() else {
            continue;
        };
        species.push(label);
        positions.push(Position::Fractional(Vector3D::from_array(parse_numbers(tokens, line)?)));
    }

    Ok(Structure::from_positions(lattice, &species, &positions)?)
}

/// Non-empty, non-comment lines between `%BLOCK name` and `%ENDBLOCK name`,
/// with their 1-based line numbers
fn block<'a>(content: &'a str, name: &str) -> Result<Vec<(usize, &'a str)>> {
    let start = format!("%BLOCK {}", name);
    let end = format!("%ENDBLOCK {}", name);
    let mut inside = false;
    let mut lines = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let text = raw.trim();
        let upper = text.to_uppercase();
        if upper.starts_with(&start) {
            inside = true;
        } else if upper.starts_with(&end) {
            return Ok(lines);
        } else if inside && !text.is_empty() && !text.starts_with(['!', '#']) {
            lines.push((index + 1, text));
        }
    }
    Err(FileError::MissingBlock(name.to_string()))
}

fn parse_numbers<'a>(tokens: impl Iterator<Item = &'a str>, line: usize) -> Result<[f64; 3]> {
    let values = tokens
        .take(3)
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| FileError::parse(line, format!("invalid number '{}'", token)))
        })
        .collect::<Result<Vec<f64>>>()?;
    match values[..] {
        [x, y, z] => Ok([x, y, z]),
        _ => Err(FileError::parse(line, "expected three numbers")),
    }
}
