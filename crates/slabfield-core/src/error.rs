//! Errors raised by the field engine.

use slabfield_compute::ComputeError;
use thiserror::Error;

/// Everything that can go wrong while configuring or applying the field.
///
/// Only [`FieldError::Compute`] can originate inside the collective
/// reduction; every other variant is detected locally.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("Invalid field direction {0}: expected 0, 1 or 2")]
    InvalidDirection(usize),

    #[error("Invalid value for {name}: {value} ({expected})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Sawtooth argument {x} is outside [0, 1]")]
    SawtoothOutOfRange { x: f64 },

    #[error("Degenerate field geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Shape mismatch for {what}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Field state has not been updated by a potential build yet")]
    StateNotUpdated,

    #[error("Collective reduction failed: {0}")]
    Compute(#[from] ComputeError),
}
