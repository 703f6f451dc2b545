//! File format parsers for importing atomic structures.
//!
//! Supported formats:
//! - [`fractional`]: atom lists in fractional (direct) coordinates

pub mod fractional;

use thiserror::Error;

/// Errors during structure file parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    FormatError { line: usize, message: String },
}

/// A parsed atom: fractional position plus its species label.
#[derive(Debug, Clone)]
pub struct ParsedAtom {
    /// Fractional coordinates along the three lattice vectors.
    pub position: [f64; 3],
    pub label: String,
}
