/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! POSCAR / CONTCAR reader and writer
//!
//! Layout:
//!
//! ```text
//! title
//! scale                  (negative: target cell volume)
//! a1 a2 a3
//! b1 b2 b3
//! c1 c2 c3
//! Ce O                   (species line, required)
//! 4 8
//! Selective dynamics     (optional)
//! Direct | Cartesian
//! x y z [T T F]          (one line per atom)
//! ```

use super::errors::{FileError, Result};
use crate::atoms::{Atom, AtomSet, Lattice, Position, Vector3D};
use crate::structure::Structure;
use log::debug;
use std::fs;
use std::path::Path;

/// Title written when none is given
pub const DEFAULT_TITLE: &str = "AutoGenerated";

/// Read a POSCAR-format file
pub fn read_poscar<P: AsRef<Path>>(path: P) -> Result<Structure> {
    let path = path.as_ref();
    debug!("Reading {}", path.display());
    let content = fs::read_to_string(path)?;
    parse_poscar(&content)
}

/// Parse POSCAR-format text
pub fn parse_poscar(content: &str) -> Result<Structure> {
    let lines: Vec<&str> = content.lines().collect();
    let line = |index: usize| nth_line(&lines, index);

    let scale: f64 = parse_number(line(1)?.split_whitespace().next().unwrap_or(""), 2)?;

    let mut rows = [[0.0; 3]; 3];
    for (i, row) in rows.iter_mut().enumerate() {
        *row = parse_vector(line(2 + i)?, 3 + i)?;
    }
    let unscaled = Lattice::new(rows)?;
    let factor = if scale < 0.0 {
        (scale.abs() / unscaled.volume().abs()).cbrt()
    } else {
        scale
    };
    let lattice = Lattice::new(rows.map(|row| row.map(|v| v * factor)))?;

    let species_line = line(5)?;
    if species_line
        .split_whitespace()
        .next()
        .is_some_and(|token| token.parse::<f64>().is_ok())
    {
        return Err(FileError::InvalidFormat(
            "species line (line 6) is required".to_string(),
        ));
    }
    let names: Vec<&str> = species_line.split_whitespace().collect();
    let counts = line(6)?
        .split_whitespace()
        .map(|token| {
            token
                .parse::<usize>()
                .map_err(|_| FileError::parse(7, format!("invalid atom count '{}'", token)))
        })
        .collect::<Result<Vec<_>>>()?;
    if names.len() != counts.len() {
        return Err(FileError::parse(
            7,
            format!("{} species but {} counts", names.len(), counts.len()),
        ));
    }

    let mut cursor = 7;
    let selective = line(cursor)?.trim_start().to_lowercase().starts_with('s');
    if selective {
        cursor += 1;
    }
    let cartesian = matches!(
        line(cursor)?.trim_start().chars().next(),
        Some('c' | 'C' | 'k' | 'K')
    );
    cursor += 1;

    let mut atoms = Vec::with_capacity(counts.iter().sum());
    for (name, count) in names.iter().zip(&counts) {
        for _ in 0..*count {
            let text = line(cursor)?;
            let coord = Vector3D::from_array(parse_vector(text, cursor + 1)?);
            let position = if cartesian {
                Position::Cartesian(coord * factor)
            } else {
                Position::Fractional(coord)
            };

            let mut atom = Atom::new(name, atoms.len(), position, &lattice)?;
            if selective {
                atom = atom.with_selective(parse_flags(text, cursor + 1)?);
            }
            atoms.push(atom);
            cursor += 1;
        }
    }

    Ok(Structure::new(lattice, AtomSet::new(atoms)?))
}

/// Format a structure as POSCAR text (direct coordinates, atom order kept)
pub fn format_poscar(structure: &Structure, title: Option<&str>) -> String {
    let atoms = structure.atoms();
    let selective = atoms.has_selective();
    let elements = atoms.elements();

    let mut lines = vec![title.unwrap_or(DEFAULT_TITLE).to_string(), "1.0".to_string()];
    lines.extend(
        structure
            .lattice()
            .matrix()
            .iter()
            .map(|row| format!("{:>9.6} {:>9.6} {:>9.6}", row[0], row[1], row[2])),
    );

    let names: Vec<&str> = elements.iter().map(|(name, _)| name.as_str()).collect();
    let counts: Vec<String> = elements.iter().map(|(_, count)| count.to_string()).collect();
    lines.push(names.join(" "));
    lines.push(counts.join(" "));

    if selective {
        lines.push("Selective Dynamics".to_string());
    }
    lines.push("Direct".to_string());

    lines.extend(atoms.iter().map(|atom| {
        let f = atom.frac_coord();
        let coords = format!("{:15.12} {:15.12} {:15.12}", f.x, f.y, f.z);
        if !selective {
            return coords;
        }
        let flags: Vec<&str> = atom
            .selective()
            .unwrap_or([true; 3])
            .iter()
            .map(|&on| if on { "T" } else { "F" })
            .collect();
        format!("{}\t{}", coords, flags.join("   "))
    }));

    let mut out = lines.join("\n");
    out.push_str("\n\n");
    out
}

/// Write a structure to a POSCAR file
pub fn write_poscar<P: AsRef<Path>>(path: P, structure: &Structure, title: Option<&str>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, format_poscar(structure, title))?;
    debug!("{} write finished", path.display());
    Ok(())
}

fn nth_line<'a>(lines: &[&'a str], index: usize) -> Result<&'a str> {
    lines
        .get(index)
        .copied()
        .ok_or_else(|| FileError::parse(index + 1, "unexpected end of file"))
}

fn parse_number(token: &str, line: usize) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| FileError::parse(line, format!("invalid number '{}'", token)))
}

fn parse_vector(text: &str, line: usize) -> Result<[f64; 3]> {
    let tokens: Vec<&str> = text.split_whitespace().take(3).collect();
    if tokens.len() < 3 {
        return Err(FileError::parse(line, "expected three numbers"));
    }
    Ok([
        parse_number(tokens[0], line)?,
        parse_number(tokens[1], line)?,
        parse_number(tokens[2], line)?,
    ])
}

fn parse_flags(text: &str, line: usize) -> Result<[bool; 3]> {
    let tokens: Vec<&str> = text.split_whitespace().skip(3).take(3).collect();
    if tokens.len() < 3 {
        return Err(FileError::parse(line, "expected three selective-dynamics flags"));
    }
    let mut flags = [true; 3];
    for (flag, token) in flags.iter_mut().zip(tokens) {
        *flag = match token.chars().next() {
            Some('T' | 't') => true,
            Some('F' | 'f') => false,
            _ => return Err(FileError::parse(line, format!("invalid flag '{}'", token))),
        };
    }
    Ok(flags)
}
