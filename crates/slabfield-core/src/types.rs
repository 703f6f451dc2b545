//! Types shared across the field engine: spin layout, the potential
//! container handed back to the SCF driver, and the per-step report.

use std::fmt;

use ndarray::{Array2, ArrayViewMut2};
use serde::Serialize;

use crate::error::FieldError;
use crate::state::FieldAxis;

/// How many density/potential channels are stored, and how many carry a
/// charge of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpinChannels {
    /// One channel (`nspin = 1`).
    Unpolarized,
    /// Spin-up and spin-down densities (`nspin = 2`).
    Collinear,
    /// Charge plus magnetisation components (`nspin = 4`); only the first
    /// channel is a charge density.
    Noncollinear,
}

impl SpinChannels {
    /// Number of stored channels (`nspin`).
    pub fn stored(self) -> usize {
        match self {
            SpinChannels::Unpolarized => 1,
            SpinChannels::Collinear => 2,
            SpinChannels::Noncollinear => 4,
        }
    }

    /// Number of leading channels that hold charge and feel the field.
    pub fn active(self) -> usize {
        match self {
            SpinChannels::Collinear => 2,
            SpinChannels::Unpolarized | SpinChannels::Noncollinear => 1,
        }
    }
}

impl TryFrom<usize> for SpinChannels {
    type Error = FieldError;

    fn try_from(nspin: usize) -> Result<Self, Self::Error> {
        match nspin {
            1 => Ok(SpinChannels::Unpolarized),
            2 => Ok(SpinChannels::Collinear),
            4 => Ok(SpinChannels::Noncollinear),
            other => Err(FieldError::InvalidParameter {
                name: "nspin",
                value: other as f64,
                expected: "must be 1, 2 or 4",
            }),
        }
    }
}

/// The field potential on one grid partition, shape `(nspin, nrxx)` (Ry).
#[derive(Debug, Clone)]
pub struct FieldPotential {
    pub values: Array2<f64>,
}

impl FieldPotential {
    /// Add the field potential into the total local potential `vloc`.
    pub fn add_to(&self, mut vloc: ArrayViewMut2<'_, f64>) -> Result<(), FieldError> {
        if vloc.shape() != self.values.shape() {
            return Err(FieldError::ShapeMismatch {
                what: "local potential",
                expected: self.values.shape().to_vec(),
                found: vloc.shape().to_vec(),
            });
        }
        vloc += &self.values;
        Ok(())
    }
}

/// Diagnostics of one field step, in Rydberg atomic units.
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub axis: FieldAxis,
    /// Present only with the dipole correction.
    pub electron_dipole: Option<f64>,
    pub ion_dipole: f64,
    /// Present only with the dipole correction.
    pub tot_dipole: Option<f64>,
    pub efield_amp: f64,
    /// Potential drop across the rising part of the sawtooth (Ry).
    pub potential_amplitude: f64,
    /// Length of the rising part of the sawtooth (Bohr).
    pub length: f64,
    /// Field energy correction (Ry).
    pub etotefield: f64,
}

impl fmt::Display for FieldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Adding external electric field:")?;
        if let (Some(elec), Some(total)) = (self.electron_dipole, self.tot_dipole) {
            writeln!(f, "{:<36} = {}", "Computed dipole along efield_dir", self.axis.index())?;
            writeln!(f, "{:<36} = {:.10e}", "Elec. dipole (Ry a.u.)", elec)?;
            writeln!(f, "{:<36} = {:.10e}", "Ion dipole (Ry a.u.)", self.ion_dipole)?;
            writeln!(f, "{:<36} = {:.10e}", "Total dipole (Ry a.u.)", total)?;
        }
        if self.efield_amp.abs() > 0.0 {
            writeln!(f, "{:<36} = {:.10e}", "Amplitude of Efield (Hartree)", self.efield_amp)?;
        }
        writeln!(f, "{:<36} = {:.10e}", "Potential amplitude (Ry)", self.potential_amplitude)?;
        writeln!(f, "{:<36} = {:.10e}", "Total length (Bohr)", self.length)?;
        write!(f, "{:<36} = {:.10e}", "Field energy correction (Ry)", self.etotefield)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_spin_channel_counts() {
        assert_eq!(SpinChannels::try_from(1).unwrap().active(), 1);
        assert_eq!(SpinChannels::try_from(2).unwrap().active(), 2);
        let nc = SpinChannels::try_from(4).unwrap();
        assert_eq!((nc.stored(), nc.active()), (4, 1));
        assert!(SpinChannels::try_from(3).is_err());
    }

    #[test]
    fn test_add_to_accumulates() {
        let field = FieldPotential {
            values: Array2::from_elem((1, 4), 0.5),
        };
        let mut vloc = Array2::from_elem((1, 4), 1.0);
        field.add_to(vloc.view_mut()).unwrap();
        assert!(vloc.iter().all(|&v| (v - 1.5).abs() < 1e-15));
    }

    #[test]
    fn test_add_to_rejects_wrong_shape() {
        let field = FieldPotential {
            values: Array2::zeros((2, 4)),
        };
        let mut vloc = Array2::zeros((1, 4));
        assert!(matches!(
            field.add_to(vloc.view_mut()),
            Err(FieldError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_report_omits_dipoles_without_correction() {
        let report = FieldReport {
            axis: FieldAxis::A3,
            electron_dipole: None,
            ion_dipole: 0.1,
            tot_dipole: None,
            efield_amp: 0.0,
            potential_amplitude: 0.0,
            length: 9.0,
            etotefield: 0.0,
        };
        let text = report.to_string();
        assert!(!text.contains("Elec. dipole"));
        assert!(!text.contains("Amplitude of Efield"));
        assert!(text.contains("Total length (Bohr)"));
    }
}
