//! Ionic and electronic dipole moments along the field axis.
//!
//! Both moments are the charge distribution integrated against the sawtooth
//! profile, scaled to a field-like quantity by
//! $\text{lat0} / |\mathbf{b}| \cdot 4\pi / N$ with $N$ the cell volume for
//! point ions and the number of grid points for the density.

use ndarray::ArrayView2;
use slabfield_compute::GlobalReduce;
use slabfield_geometry::{GridPartition, UnitCell};

use crate::constants::FOUR_PI;
use crate::error::FieldError;
use crate::state::FieldState;
use crate::types::SpinChannels;

/// Reject a reciprocal norm the dipole scaling cannot divide by.
pub(crate) fn check_bmod(bmod: f64) -> Result<(), FieldError> {
    if bmod.is_finite() && bmod > 0.0 {
        Ok(())
    } else {
        Err(FieldError::DegenerateGeometry(format!(
            "reciprocal vector norm along the field is {}",
            bmod
        )))
    }
}

/// Ionic dipole: $\sum_{\text{atoms}} z_v\, s(\tau_{\text{dir}})$, scaled by
/// $\text{lat0}/b_{\text{mod}} \cdot 4\pi/\Omega$.
///
/// Every fractional coordinate along the field axis must lie in `[0, 1]`.
pub fn ion_dipole(cell: &UnitCell, state: &FieldState, bmod: f64) -> Result<f64, FieldError> {
    check_bmod(bmod)?;
    let dir = state.axis().index();
    let saw = state.sawtooth();

    let mut dipole = 0.0;
    for species in cell.species() {
        let mut sum = 0.0;
        for tau in &species.positions {
            sum += saw.eval(tau[dir])?;
        }
        dipole += sum * species.zv;
    }

    Ok(dipole * cell.lat0() / bmod * FOUR_PI / cell.omega())
}

/// Electronic dipole: the local density integrated against the sawtooth,
/// summed over all partitions, scaled by
/// $\text{lat0}/b_{\text{mod}} \cdot 4\pi/N_{\text{grid}}$.
///
/// `rho` has shape `(nspin, nrxx)`; only the active spin channels
/// contribute. This is a collective call: every partition owner must reach
/// it once per step, in the same order, or the reduction never completes.
/// Local validation errors are returned before the reduction, so a caller
/// that sees one must abort the whole group.
pub fn electron_dipole<R>(
    cell: &UnitCell,
    grid: &GridPartition,
    spin: SpinChannels,
    rho: ArrayView2<'_, f64>,
    state: &FieldState,
    bmod: f64,
    reduce: &R,
) -> Result<f64, FieldError>
where
    R: GlobalReduce + ?Sized,
{
    check_bmod(bmod)?;
    let expected = (spin.stored(), grid.local_len());
    if rho.dim() != expected {
        return Err(FieldError::ShapeMismatch {
            what: "charge density",
            expected: vec![expected.0, expected.1],
            found: rho.shape().to_vec(),
        });
    }

    let dir = state.axis().index();
    let saw = state.sawtooth();
    let active = spin.active();

    let mut local = 0.0;
    for ir in 0..grid.local_len() {
        let s = saw.eval(grid.fractional(ir)[dir])?;
        for is in 0..active {
            local += rho[[is, ir]] * s;
        }
    }

    let total = reduce.global_sum(local)?;
    log::debug!(
        "electron dipole: local sum {:e}, reduced {:e} over {} points",
        local,
        total,
        grid.global_len()
    );

    Ok(total * cell.lat0() / bmod * FOUR_PI / grid.global_len() as f64)
}
