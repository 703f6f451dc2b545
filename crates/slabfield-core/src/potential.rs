//! Real-space field potential.
//!
//! On every step the potential is rebuilt from scratch, since the cell (and
//! with it the reciprocal direction) may change during a variable-cell run:
//!
//! $$
//! V(\mathbf{r}) = e^2 \,(A - d)\, \frac{\text{lat0}}{|\mathbf{b}|}\, s(x_{\text{dir}})
//! $$
//!
//! where $d$ is the total dipole ($0$ without dipole correction).

use ndarray::{Array2, ArrayView2};
use slabfield_compute::GlobalReduce;
use slabfield_geometry::{GridPartition, UnitCell};

use crate::constants::E2;
use crate::dipole::{check_bmod, electron_dipole, ion_dipole};
use crate::energy::energy_correction;
use crate::error::FieldError;
use crate::state::FieldState;
use crate::types::{FieldPotential, FieldReport, SpinChannels};

/// Output of one field step on one partition.
#[derive(Debug, Clone)]
pub struct FieldStep {
    pub potential: FieldPotential,
    pub report: FieldReport,
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Refresh `state` for the current step and build the field potential.
///
/// In order: the reciprocal row along the field and its norm, the
/// effective slab length, the ionic dipole, the electronic dipole (only with
/// dipole correction; a collective call), the energy correction, and
/// finally the sawtooth potential scaled by $e^2 (A - d)\,\text{lat0}/b_{\text{mod}}$.
/// The state is only modified once every quantity has been computed.
///
/// `rho` is the local charge density, shape `(nspin, nrxx)`. The returned
/// potential has the same shape; inactive spin channels stay zero.
pub fn add_efield<R>(
    state: &mut FieldState,
    cell: &UnitCell,
    grid: &GridPartition,
    spin: SpinChannels,
    rho: ArrayView2<'_, f64>,
    reduce: &R,
) -> Result<FieldStep, FieldError>
where
    R: GlobalReduce + ?Sized,
{
    let dir = state.axis().index();

    let bvec = cell.reciprocal_row(dir);
    let bmod = norm(bvec);
    check_bmod(bmod)?;

    let latvec = norm(cell.lattice_vector(dir));
    let length = (1.0 - state.sawtooth().pos_dec()) * latvec * cell.lat0();

    let ion = ion_dipole(cell, state, bmod)?;
    let electron = if state.dipole_correction() {
        Some(electron_dipole(cell, grid, spin, rho, state, bmod, reduce)?)
    } else {
        None
    };
    let correction = energy_correction(
        state.dipole_correction(),
        state.efield_amp(),
        ion,
        electron.unwrap_or(0.0),
        cell.omega(),
    );

    let amp = state.efield_amp() - correction.tot_dipole;
    let saw = state.sawtooth();
    let mut values = Array2::zeros((spin.stored(), grid.local_len()));
    for ir in 0..grid.local_len() {
        let s = saw.eval(grid.fractional(ir)[dir])?;
        for is in 0..spin.active() {
            values[[is, ir]] = s;
        }
    }
    values *= E2 * amp * cell.lat0() / bmod;

    let report = FieldReport {
        axis: state.axis(),
        electron_dipole: electron,
        ion_dipole: ion,
        tot_dipole: electron.map(|_| correction.tot_dipole),
        efield_amp: state.efield_amp(),
        potential_amplitude: E2 * amp * length,
        length,
        etotefield: correction.etotefield,
    };

    state.update(bvec, bmod, correction);

    for line in report.to_string().lines() {
        log::info!("{}", line);
    }

    Ok(FieldStep {
        potential: FieldPotential { values },
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FieldParams, FieldPhase};
    use approx::assert_abs_diff_eq;
    use slabfield_compute::SerialReduce;
    use slabfield_geometry::AtomSpecies;

    fn params(dir: usize, dip_cor_flag: bool) -> FieldParams {
        FieldParams {
            efield_dir: dir,
            efield_pos_max: 0.5,
            efield_pos_dec: 0.5,
            efield_amp: 0.01,
            dip_cor_flag,
        }
    }

    fn cubic() -> UnitCell {
        UnitCell::new(
            10.0,
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec![AtomSpecies::new("X", 1.0, vec![[0.5, 0.5, 0.5]])],
        )
        .unwrap()
    }

    #[test]
    fn test_potential_profile_along_first_axis() {
        let mut state = FieldState::configure(&params(0, false)).unwrap();
        let grid = GridPartition::whole([4, 1, 1]).unwrap();
        let rho = Array2::zeros((1, 4));

        let step = add_efield(&mut state, &cubic(), &grid, SpinChannels::Unpolarized, rho.view(), &SerialReduce)
            .unwrap();

        // fac = e2 * 0.01 * 10 / 1 = 0.2; s = [-0.25, 0, 0.25, 0]
        let expected = [-0.05, 0.0, 0.05, 0.0];
        for (v, e) in step.potential.values.row(0).iter().zip(expected) {
            assert_abs_diff_eq!(*v, e, epsilon = 1e-15);
        }
        assert_abs_diff_eq!(step.report.length, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(step.report.potential_amplitude, 0.1, epsilon = 1e-14);
        assert!(step.report.electron_dipole.is_none());
        assert_eq!(state.phase(), FieldPhase::Updated);
        assert_eq!(state.bvec(), [1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(state.bmod(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_only_active_spin_channels_are_filled() {
        let grid = GridPartition::whole([1, 1, 4]).unwrap();

        let mut state = FieldState::configure(&params(2, false)).unwrap();
        let rho = Array2::zeros((2, 4));
        let step = add_efield(&mut state, &cubic(), &grid, SpinChannels::Collinear, rho.view(), &SerialReduce)
            .unwrap();
        assert_eq!(step.potential.values.row(0), step.potential.values.row(1));

        let mut state = FieldState::configure(&params(2, false)).unwrap();
        let rho = Array2::zeros((4, 4));
        let step = add_efield(&mut state, &cubic(), &grid, SpinChannels::Noncollinear, rho.view(), &SerialReduce)
            .unwrap();
        assert_eq!(step.potential.values.dim(), (4, 4));
        assert!(step.potential.values.row(0).iter().any(|&v| v != 0.0));
        for is in 1..4 {
            assert!(step.potential.values.row(is).iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_dipole_correction_screens_the_field() {
        // Put all electrons on the ion site: the slab is neutral and the
        // potential reduces to the bare sawtooth.
        let cell = cubic();
        let grid = GridPartition::whole([1, 1, 4]).unwrap();
        let mut rho = Array2::zeros((1, 4));
        // One electron on a single grid point: ρ = N / Ω.
        rho[[0, 2]] = 4.0 / cell.omega();

        let mut state = FieldState::configure(&params(2, true)).unwrap();
        let step = add_efield(&mut state, &cell, &grid, SpinChannels::Unpolarized, rho.view(), &SerialReduce)
            .unwrap();

        let ion = step.report.ion_dipole;
        let elec = step.report.electron_dipole.unwrap();
        assert_abs_diff_eq!(ion, elec, epsilon = 1e-15);
        assert_abs_diff_eq!(state.tot_dipole(), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(state.etotefield(), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(step.potential.values[[0, 2]], 0.05, epsilon = 1e-14);
    }

    #[test]
    fn test_failed_step_leaves_state_untouched() {
        let cell = UnitCell::new(
            10.0,
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec![AtomSpecies::new("X", 1.0, vec![[0.0, 0.0, 1.5]])],
        )
        .unwrap();
        let grid = GridPartition::whole([1, 1, 4]).unwrap();
        let rho = Array2::zeros((1, 4));
        let mut state = FieldState::configure(&params(2, false)).unwrap();

        let result = add_efield(&mut state, &cell, &grid, SpinChannels::Unpolarized, rho.view(), &SerialReduce);
        assert!(matches!(result, Err(FieldError::SawtoothOutOfRange { .. })));
        assert_eq!(state.phase(), FieldPhase::Configured);
    }
}
