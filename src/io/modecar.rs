/*
MIT License

Copyright (c) 2025 gvasp-rs developers
*/

//! MODECAR writer (dimer-method initial mode)

use super::errors::Result;
use crate::atoms::Vector3D;
use crate::structure::Structure;
use log::debug;
use std::fs;
use std::path::Path;

/// One line per atom, three `%20.10E` numbers
pub fn format_modecar(mode: &[Vector3D]) -> String {
    let mut out = String::with_capacity(mode.len() * 61);
    for v in mode {
        let line: Vec<String> = v.to_array().iter().map(|&x| format!("{:>20}", scientific(x))).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

/// Write the normalised displacement `first - second` as a MODECAR
pub fn write_modecar<P: AsRef<Path>>(path: P, first: &Structure, second: &Structure) -> Result<()> {
    let mode = first.displacement_mode(second)?;
    let path = path.as_ref();
    fs::write(path, format_modecar(&mode))?;
    debug!("{} write finished", path.display());
    Ok(())
}

/// C-style `%.10E`: signed, at least two exponent digits
fn scientific(value: f64) -> String {
    let text = format!("{:.10E}", value);
    match text.split_once('E') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}E{}{:02}", mantissa, sign, exponent.abs())
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::{Lattice, Position};
    use rstest::rstest;

    #[rstest]
    #[case(1.5, "1.5000000000E+00")]
    #[case(-0.00025, "-2.5000000000E-04")]
    #[case(0.0, "0.0000000000E+00")]
    #[case(123456.0, "1.2345600000E+05")]
    fn test_scientific(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(scientific(value), expected);
    }

    #[test]
    fn test_modecar_lines() {
        let lattice = Lattice::cubic(10.0).unwrap();
        let make = |x: f64| {
            Structure::from_positions(
                lattice.clone(),
                &["O", "O"],
                &[
                    Position::Cartesian(Vector3D::new(1.0, 1.0, 1.0)),
                    Position::Cartesian(Vector3D::new(x, 1.0, 1.0)),
                ],
            )
            .unwrap()
        };
        let mode = make(3.0).displacement_mode(&make(2.0)).unwrap();
        let text = format_modecar(&mode);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "    1.0000000000E+00     0.0000000000E+00     0.0000000000E+00"
        );
    }
}
