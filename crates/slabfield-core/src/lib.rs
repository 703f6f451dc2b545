//! # Slabfield Core
//!
//! Applied electric field and slab dipole correction for periodic
//! plane-wave electronic-structure codes. A uniform field is not periodic,
//! so it is emulated by a sawtooth potential along one lattice axis; with the
//! dipole correction enabled the sawtooth also cancels the spurious field of
//! the periodic images of a polar slab.
//!
//! ## Per-step flow
//!
//! 1. [`state::FieldState::configure`] validates the static options once.
//! 2. [`potential::add_efield`] is called every SCF/ionic step. It refreshes
//!    the reciprocal direction, evaluates the ionic and electronic dipoles
//!    (the latter through one collective reduction), updates the energy
//!    correction and returns the potential to add to the local potential.
//! 3. [`force::field_forces`] derives per-atom forces from the updated state.
//!
//! ## Modules
//!
//! - [`sawtooth`]: The periodic sawtooth profile.
//! - [`dipole`]: Ionic and electronic dipole moments along the field.
//! - [`energy`]: Field energy correction and total dipole.
//! - [`potential`]: Real-space potential builder and diagnostics.
//! - [`force`]: Per-atom field forces.
//! - [`state`]: Static options and the per-step field state.
//! - [`types`]: Spin channels, potential container and step report.
//! - [`constants`]: Rydberg-unit physical constants.

pub mod constants;
pub mod dipole;
pub mod energy;
pub mod error;
pub mod force;
pub mod potential;
pub mod sawtooth;
pub mod state;
pub mod types;

pub use error::FieldError;
pub use state::{FieldAxis, FieldParams, FieldPhase, FieldState};
pub use types::{FieldPotential, FieldReport, SpinChannels};
