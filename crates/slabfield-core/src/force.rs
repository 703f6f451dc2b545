//! Per-atom forces from the applied field.
//!
//! A point ion of charge $z_v$ in the sawtooth field feels
//!
//! $$
//! \mathbf{F} = e^2 (A - d)\, z_v\, \frac{\mathbf{b}}{|\mathbf{b}|}
//! $$
//!
//! with $d$ the total dipole of the last step ($0$ without dipole
//! correction). No grid data or communication is involved.

use ndarray::Array2;
use slabfield_geometry::UnitCell;

use crate::constants::E2;
use crate::error::FieldError;
use crate::state::{FieldPhase, FieldState};

/// Field forces (Ry/Bohr), shape `(n_atoms, 3)` in the cell's atom order.
///
/// Requires a state updated by [`crate::potential::add_efield`] in the
/// current step; a merely configured state has no direction yet.
pub fn field_forces(cell: &UnitCell, state: &FieldState) -> Result<Array2<f64>, FieldError> {
    if state.phase() != FieldPhase::Updated {
        return Err(FieldError::StateNotUpdated);
    }

    let amp = if state.dipole_correction() {
        state.efield_amp() - state.tot_dipole()
    } else {
        state.efield_amp()
    };
    let bvec = state.bvec();
    let bmod = state.bmod();

    let mut forces = Array2::zeros((cell.n_atoms(), 3));
    for (iat, (species, _)) in cell.atoms().enumerate() {
        for jj in 0..3 {
            forces[[iat, jj]] = E2 * amp * species.zv * bvec[jj] / bmod;
        }
    }
    Ok(forces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::add_efield;
    use crate::state::FieldParams;
    use crate::types::SpinChannels;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;
    use slabfield_compute::SerialReduce;
    use slabfield_geometry::{AtomSpecies, GridPartition};

    fn slab() -> UnitCell {
        UnitCell::new(
            8.0,
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 3.0]],
            vec![
                AtomSpecies::new("Na", 1.0, vec![[0.0, 0.0, 0.3]]),
                AtomSpecies::new("Cl", 7.0, vec![[0.5, 0.5, 0.3], [0.0, 0.5, 0.35]]),
            ],
        )
        .unwrap()
    }

    fn updated(cell: &UnitCell, amp: f64) -> FieldState {
        let mut state = FieldState::configure(&FieldParams {
            efield_dir: 2,
            efield_amp: amp,
            ..Default::default()
        })
        .unwrap();
        let grid = GridPartition::whole([2, 2, 8]).unwrap();
        let rho = Array2::zeros((1, grid.local_len()));
        add_efield(&mut state, cell, &grid, SpinChannels::Unpolarized, rho.view(), &SerialReduce).unwrap();
        state
    }

    #[test]
    fn test_forces_point_along_reciprocal_axis() {
        let cell = slab();
        let state = updated(&cell, 0.002);
        let forces = field_forces(&cell, &state).unwrap();

        assert_eq!(forces.dim(), (3, 3));
        // b3 = (0, 0, 1/3), unit vector along z
        assert_abs_diff_eq!(forces[[0, 2]], 2.0 * 0.002 * 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(forces[[1, 2]], 2.0 * 0.002 * 7.0, epsilon = 1e-15);
        assert_abs_diff_eq!(forces[[2, 2]], 2.0 * 0.002 * 7.0, epsilon = 1e-15);
        for iat in 0..3 {
            assert_eq!(forces[[iat, 0]], 0.0);
            assert_eq!(forces[[iat, 1]], 0.0);
        }
    }

    #[test]
    fn test_configured_state_is_rejected() {
        let cell = slab();
        let state = FieldState::configure(&FieldParams::default()).unwrap();
        assert!(matches!(field_forces(&cell, &state), Err(FieldError::StateNotUpdated)));
    }
}
