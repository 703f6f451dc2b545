//! Physical constants in Rydberg atomic units

use std::f64::consts::PI;

pub const FOUR_PI: f64 = 4.0 * PI;
pub const E2: f64 = 2.0; // e² in Ry·Bohr
