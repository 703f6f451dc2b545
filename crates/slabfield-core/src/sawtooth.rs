//! The periodic sawtooth profile.
//!
//! Over one period the profile rises with unit slope, then falls back
//! linearly across a region of width $b$ starting at $a$:
//!
//! $$
//! s(x) = \begin{cases}
//!   x - a + \tfrac{1}{2}(1-b) & x < a \\
//!   \tfrac{1}{2}(1-b) - (1-b)\,\dfrac{x-a}{b} & a \le x \le a+b \\
//!   x - a - 1 + \tfrac{1}{2}(1-b) & x > a+b
//! \end{cases}
//! $$
//!
//! The falling region must fit inside the cell, $a + b \le 1$. The profile
//! is then periodic, has zero mean over $[0, 1]$, and its rising part
//! behaves like a uniform field.

use crate::error::FieldError;

/// Sawtooth parameters: `pos_max` ($a$) and `pos_dec` ($b$).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sawtooth {
    pos_max: f64,
    pos_dec: f64,
}

impl Sawtooth {
    /// Validate the parameters. `pos_max` must lie in `[0, 1]`, `pos_dec`
    /// in `(0, 1]` and their sum must not exceed 1; a zero width would
    /// divide by zero in the falling region.
    pub fn new(pos_max: f64, pos_dec: f64) -> Result<Self, FieldError> {
        if !(0.0..=1.0).contains(&pos_max) {
            return Err(FieldError::InvalidParameter {
                name: "efield_pos_max",
                value: pos_max,
                expected: "must lie in [0, 1]",
            });
        }
        if pos_dec == 0.0 {
            return Err(FieldError::DegenerateGeometry(
                "sawtooth width efield_pos_dec is zero".into(),
            ));
        }
        if !(pos_dec > 0.0 && pos_dec <= 1.0) {
            return Err(FieldError::InvalidParameter {
                name: "efield_pos_dec",
                value: pos_dec,
                expected: "must lie in (0, 1]",
            });
        }
        // Rounding slack for pairs such as 0.9 + 0.1.
        if pos_max + pos_dec > 1.0 + 1e-12 {
            return Err(FieldError::InvalidParameter {
                name: "efield_pos_max + efield_pos_dec",
                value: pos_max + pos_dec,
                expected: "falling region must end inside the cell (sum <= 1)",
            });
        }
        Ok(Self { pos_max, pos_dec })
    }

    pub fn pos_max(&self) -> f64 {
        self.pos_max
    }

    pub fn pos_dec(&self) -> f64 {
        self.pos_dec
    }

    /// Evaluate the profile at fractional coordinate `x ∈ [0, 1]`.
    pub fn eval(&self, x: f64) -> Result<f64, FieldError> {
        if !(0.0..=1.0).contains(&x) {
            return Err(FieldError::SawtoothOutOfRange { x });
        }

        let (a, b) = (self.pos_max, self.pos_dec);
        let fac = 1.0 - b;

        let value = if x < a {
            x - a + 0.5 * fac
        } else if x > a + b {
            x - a - 1.0 + 0.5 * fac
        } else {
            0.5 * fac - fac * (x - a) / b
        };
        Ok(value)
    }
}

/// Evaluate the sawtooth with parameters `(a, b)` at `x`, validating all three.
pub fn saw_function(a: f64, b: f64, x: f64) -> Result<f64, FieldError> {
    Sawtooth::new(a, b)?.eval(x)
}
