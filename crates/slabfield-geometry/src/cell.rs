//! Periodic unit cell and atomic species.
//!
//! Lattice vectors are stored as the rows of $A$ in units of the lattice
//! constant `lat0` (Bohr). The reciprocal rows are the rows of
//! $G = (A^{-1})^{T}$, so that $\mathbf{a}_i \cdot \mathbf{b}_j = \delta_{ij}$
//! (the factor $2\pi/\text{lat0}$ is left out, as plane-wave codes usually do).

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while assembling a unit cell.
#[derive(Debug, Error)]
pub enum CellError {
    #[error("Lattice constant must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("Lattice vectors are linearly dependent (det = {det:.3e})")]
    SingularLattice { det: f64 },

    #[error("Species '{label}' has a non-finite valence charge")]
    InvalidValence { label: String },
}

/// One atomic species: a valence charge shared by all of its atoms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomSpecies {
    /// Element or pseudopotential label.
    pub label: String,
    /// Valence (ionic) charge used in electrostatics.
    pub zv: f64,
    /// Fractional coordinates of each atom of this species.
    pub positions: Vec<[f64; 3]>,
}

impl AtomSpecies {
    pub fn new(label: impl Into<String>, zv: f64, positions: Vec<[f64; 3]>) -> Self {
        Self {
            label: label.into(),
            zv,
            positions,
        }
    }

    /// Number of atoms of this species.
    pub fn count(&self) -> usize {
        self.positions.len()
    }
}

/// A periodic simulation cell.
#[derive(Debug, Clone)]
pub struct UnitCell {
    lat0: f64,
    latvec: Matrix3<f64>,
    reciprocal: Matrix3<f64>,
    omega: f64,
    species: Vec<AtomSpecies>,
}

impl UnitCell {
    /// Build a cell from the lattice constant, lattice rows (in units of
    /// `lat0`) and species list.
    pub fn new(
        lat0: f64,
        latvec: [[f64; 3]; 3],
        species: Vec<AtomSpecies>,
    ) -> Result<Self, CellError> {
        if !(lat0.is_finite() && lat0 > 0.0) {
            return Err(CellError::InvalidScale(lat0));
        }
        if let Some(bad) = species.iter().find(|s| !s.zv.is_finite()) {
            return Err(CellError::InvalidValence {
                label: bad.label.clone(),
            });
        }

        let latvec = Matrix3::from_fn(|i, j| latvec[i][j]);
        let det = latvec.determinant();
        let inverse = latvec
            .try_inverse()
            .filter(|_| det.abs() > f64::EPSILON)
            .ok_or(CellError::SingularLattice { det })?;

        Ok(Self {
            lat0,
            latvec,
            reciprocal: inverse.transpose(),
            omega: det.abs() * lat0.powi(3),
            species,
        })
    }

    /// Lattice constant (Bohr).
    pub fn lat0(&self) -> f64 {
        self.lat0
    }

    /// Cell volume $\Omega$ (Bohr³).
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Lattice vector `axis` (a row of $A$), in units of `lat0`.
    ///
    /// # Panics
    /// If `axis > 2`.
    pub fn lattice_vector(&self, axis: usize) -> [f64; 3] {
        row(&self.latvec, axis)
    }

    /// Reciprocal row `axis` of $G$, in units of $2\pi/\text{lat0}$.
    ///
    /// # Panics
    /// If `axis > 2`.
    pub fn reciprocal_row(&self, axis: usize) -> [f64; 3] {
        row(&self.reciprocal, axis)
    }

    pub fn species(&self) -> &[AtomSpecies] {
        &self.species
    }

    /// Total number of atoms over all species.
    pub fn n_atoms(&self) -> usize {
        self.species.iter().map(AtomSpecies::count).sum()
    }

    /// Every atom as `(species, fractional position)`, species-major.
    ///
    /// This ordering defines the atom index used by per-atom arrays.
    pub fn atoms(&self) -> impl Iterator<Item = (&AtomSpecies, &[f64; 3])> + '_ {
        self.species
            .iter()
            .flat_map(|s| s.positions.iter().map(move |p| (s, p)))
    }
}

fn row(m: &Matrix3<f64>, axis: usize) -> [f64; 3] {
    [m[(axis, 0)], m[(axis, 1)], m[(axis, 2)]]
}
