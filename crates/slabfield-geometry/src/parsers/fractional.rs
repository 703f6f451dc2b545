//! Parser for plain-text fractional-coordinate atom lists.
//!
//! The layout mirrors XYZ files, but positions are given along the lattice
//! vectors rather than in Cartesian space:
//! ```text
//! <num_atoms>
//! <comment line>
//! <label> <fx> <fy> <fz>
//! <label> <fx> <fy> <fz>
//! ...
//! ```
//!
//! Coordinates are kept as written. Wrapping into `[0, 1)` is left to the
//! caller, since the field engine rejects anything outside `[0, 1]`.

use std::path::Path;

use super::{ParseError, ParsedAtom};

/// Read and parse a fractional-coordinate file from disk.
pub fn read_fractional(path: &Path) -> Result<Vec<ParsedAtom>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_fractional(&content)
}

/// Parse a fractional-coordinate atom list from a string.
pub fn parse_fractional(content: &str) -> Result<Vec<ParsedAtom>, ParseError> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 2 {
        return Err(ParseError::FormatError {
            line: 1,
            message: "File must start with an atom count and a comment line".into(),
        });
    }

    let num_atoms: usize = lines[0].trim().parse().map_err(|_| ParseError::FormatError {
        line: 1,
        message: "First line must be the number of atoms".into(),
    })?;

    let mut atoms = Vec::with_capacity(num_atoms);
    for (idx, line) in lines[2..].iter().enumerate() {
        let line_no = idx + 3;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(ParseError::FormatError {
                line: line_no,
                message: format!("Expected 'label fx fy fz', got '{}'", line),
            });
        }

        let mut position = [0.0; 3];
        for (axis, token) in parts[1..4].iter().enumerate() {
            position[axis] = token.parse().map_err(|_| ParseError::FormatError {
                line: line_no,
                message: format!("Invalid fractional coordinate: {}", token),
            })?;
        }

        atoms.push(ParsedAtom {
            position,
            label: parts[0].to_string(),
        });
    }

    if atoms.len() != num_atoms {
        return Err(ParseError::FormatError {
            line: 1,
            message: format!("Header says {} atoms but found {}", num_atoms, atoms.len()),
        });
    }

    Ok(atoms)
}
