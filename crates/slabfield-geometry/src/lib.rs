//! # Slabfield Geometry
//!
//! Structural inputs for the slabfield engine. This crate provides:
//!
//! - **Unit cells** ([`cell`]): Lattice vectors, reciprocal rows, cell
//!   volume and atomic species with fractional coordinates.
//! - **Grid partitions** ([`grid`]): The slab of the real-space FFT grid
//!   owned by one participant, with index-to-fraction mapping.
//! - **File parsers** ([`parsers`]): Import fractional atomic coordinates.

pub mod cell;
pub mod grid;
pub mod parsers;

pub use cell::{AtomSpecies, CellError, UnitCell};
pub use grid::{GridError, GridPartition};
