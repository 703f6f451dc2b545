//! Field energy correction.
//!
//! With the dipole correction the slab dipole $d = d_{\text{ion}} - d_{\text{el}}$
//! interacts with the applied field and with itself:
//!
//! $$
//! E_{\text{field}} = -e^2 \left(A - \tfrac{1}{2} d\right) d \,\frac{\Omega}{4\pi}
//! $$
//!
//! Without it only the ions couple to the field,
//! $E_{\text{field}} = -e^2 A\, d_{\text{ion}}\, \Omega / 4\pi$, and the total
//! dipole is taken as zero.

use crate::constants::{E2, FOUR_PI};

/// Total dipole and energy correction of one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyCorrection {
    pub tot_dipole: f64,
    pub etotefield: f64,
}

/// Combine the dipoles and field amplitude into the energy correction.
///
/// `electron_dipole` is ignored when `dipole_correction` is off.
pub fn energy_correction(
    dipole_correction: bool,
    efield_amp: f64,
    ion_dipole: f64,
    electron_dipole: f64,
    omega: f64,
) -> EnergyCorrection {
    if dipole_correction {
        let tot_dipole = ion_dipole - electron_dipole;
        EnergyCorrection {
            tot_dipole,
            etotefield: -E2 * (efield_amp - 0.5 * tot_dipole) * tot_dipole * omega / FOUR_PI,
        }
    } else {
        EnergyCorrection {
            tot_dipole: 0.0,
            etotefield: -E2 * efield_amp * ion_dipole * omega / FOUR_PI,
        }
    }
}
