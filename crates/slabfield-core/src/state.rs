//! Static field options and the per-step field state.
//!
//! [`FieldState`] moves through two phases. [`FieldState::configure`]
//! validates the options and yields a [`FieldPhase::Configured`] state;
//! every call to [`crate::potential::add_efield`] refreshes the reciprocal
//! direction, dipole and energy and leaves it [`FieldPhase::Updated`] until
//! the next step overwrites them.

use serde::{Deserialize, Serialize};

use crate::energy::EnergyCorrection;
use crate::error::FieldError;
use crate::sawtooth::Sawtooth;

/// Field options as read from the input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    /// Lattice axis of the field: 0, 1 or 2.
    pub efield_dir: usize,
    /// Start of the falling region of the sawtooth (fractional).
    pub efield_pos_max: f64,
    /// Width of the falling region of the sawtooth (fractional).
    pub efield_pos_dec: f64,
    /// Field amplitude (Hartree a.u.).
    pub efield_amp: f64,
    /// Subtract the self-consistent slab dipole.
    pub dip_cor_flag: bool,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            efield_dir: 2,
            efield_pos_max: 0.5,
            efield_pos_dec: 0.1,
            efield_amp: 0.0,
            dip_cor_flag: false,
        }
    }
}

/// The lattice axis along which the field is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldAxis {
    A1,
    A2,
    A3,
}

impl FieldAxis {
    pub fn index(self) -> usize {
        match self {
            FieldAxis::A1 => 0,
            FieldAxis::A2 => 1,
            FieldAxis::A3 => 2,
        }
    }
}

impl TryFrom<usize> for FieldAxis {
    type Error = FieldError;

    fn try_from(dir: usize) -> Result<Self, Self::Error> {
        match dir {
            0 => Ok(FieldAxis::A1),
            1 => Ok(FieldAxis::A2),
            2 => Ok(FieldAxis::A3),
            other => Err(FieldError::InvalidDirection(other)),
        }
    }
}

/// Lifecycle of a [`FieldState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPhase {
    /// Options validated; no step has been applied yet.
    Configured,
    /// Direction, dipole and energy reflect the most recent step.
    Updated,
}

/// Field options plus the quantities refreshed on every step.
#[derive(Debug, Clone)]
pub struct FieldState {
    axis: FieldAxis,
    sawtooth: Sawtooth,
    efield_amp: f64,
    dipole_correction: bool,
    bvec: [f64; 3],
    bmod: f64,
    tot_dipole: f64,
    etotefield: f64,
    phase: FieldPhase,
}

impl FieldState {
    /// Validate `params` and build a configured state.
    ///
    /// Fails with [`FieldError::InvalidDirection`] for a direction outside
    /// `{0, 1, 2}`, [`FieldError::DegenerateGeometry`] for a zero sawtooth
    /// width and [`FieldError::InvalidParameter`] for other out-of-domain
    /// values. Nothing grid-related happens here.
    pub fn configure(params: &FieldParams) -> Result<Self, FieldError> {
        let axis = FieldAxis::try_from(params.efield_dir)?;
        let sawtooth = Sawtooth::new(params.efield_pos_max, params.efield_pos_dec)?;
        if !params.efield_amp.is_finite() {
            return Err(FieldError::InvalidParameter {
                name: "efield_amp",
                value: params.efield_amp,
                expected: "must be finite",
            });
        }

        Ok(Self {
            axis,
            sawtooth,
            efield_amp: params.efield_amp,
            dipole_correction: params.dip_cor_flag,
            bvec: [0.0; 3],
            bmod: 0.0,
            tot_dipole: 0.0,
            etotefield: 0.0,
            phase: FieldPhase::Configured,
        })
    }

    pub fn axis(&self) -> FieldAxis {
        self.axis
    }

    pub fn sawtooth(&self) -> &Sawtooth {
        &self.sawtooth
    }

    pub fn efield_amp(&self) -> f64 {
        self.efield_amp
    }

    pub fn dipole_correction(&self) -> bool {
        self.dipole_correction
    }

    /// Reciprocal row along the field axis (units of $2\pi/\text{lat0}$).
    pub fn bvec(&self) -> [f64; 3] {
        self.bvec
    }

    pub fn bmod(&self) -> f64 {
        self.bmod
    }

    /// Total (ionic minus electronic) dipole. Zero without dipole correction.
    pub fn tot_dipole(&self) -> f64 {
        self.tot_dipole
    }

    /// Field energy correction (Ry).
    pub fn etotefield(&self) -> f64 {
        self.etotefield
    }

    pub fn phase(&self) -> FieldPhase {
        self.phase
    }

    /// Commit the results of one step.
    pub(crate) fn update(&mut self, bvec: [f64; 3], bmod: f64, correction: EnergyCorrection) {
        self.bvec = bvec;
        self.bmod = bmod;
        self.tot_dipole = correction.tot_dipole;
        self.etotefield = correction.etotefield;
        self.phase = FieldPhase::Updated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_configure() {
        let state = FieldState::configure(&FieldParams::default()).unwrap();
        assert_eq!(state.axis(), FieldAxis::A3);
        assert_eq!(state.phase(), FieldPhase::Configured);
        assert_eq!(state.tot_dipole(), 0.0);
        assert!(!state.dipole_correction());
    }

    #[test]
    fn test_direction_three_is_fatal() {
        let params = FieldParams {
            efield_dir: 3,
            ..Default::default()
        };
        let err = FieldState::configure(&params).unwrap_err();
        assert!(matches!(err, FieldError::InvalidDirection(3)));
        assert!(err.to_string().contains("Invalid field direction"));
    }

    #[test]
    fn test_each_valid_direction_maps_to_its_axis() {
        for dir in 0..3 {
            assert_eq!(FieldAxis::try_from(dir).unwrap().index(), dir);
        }
    }

    #[test]
    fn test_zero_width_fails_configuration() {
        let params = FieldParams {
            efield_pos_dec: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            FieldState::configure(&params),
            Err(FieldError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_sawtooth_overrunning_cell_fails_configuration() {
        let params = FieldParams {
            efield_pos_max: 0.9,
            efield_pos_dec: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            FieldState::configure(&params),
            Err(FieldError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_non_finite_amplitude_is_rejected() {
        let params = FieldParams {
            efield_amp: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            FieldState::configure(&params),
            Err(FieldError::InvalidParameter { name: "efield_amp", .. })
        ));
    }
}
