//! Real-space grid partitions.
//!
//! The global FFT grid has dimensions `(ncx, ncy, ncz)` and is decomposed
//! along the third axis: each participant owns the planes
//! `nczp_start .. nczp_start + nczp`. Local data is stored with the
//! partitioned axis running fastest,
//!
//! ```text
//! ir = (i * ncy + j) * nczp + (k - nczp_start)
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while describing a grid partition.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Grid dimensions must be non-zero, got {0:?}")]
    EmptyGrid([usize; 3]),

    #[error("Slab {start}..{end} lies outside the {ncz} planes of the grid")]
    SlabOutOfBounds { start: usize, end: usize, ncz: usize },

    #[error("Cannot split {ncz} planes into {parts} partitions")]
    TooManyPartitions { ncz: usize, parts: usize },
}

/// The slab of the global grid owned by one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPartition {
    dims: [usize; 3],
    nczp: usize,
    nczp_start: usize,
}

impl GridPartition {
    /// Describe the slab of `nczp` planes starting at `nczp_start`.
    pub fn new(dims: [usize; 3], nczp: usize, nczp_start: usize) -> Result<Self, GridError> {
        if dims.iter().any(|&n| n == 0) {
            return Err(GridError::EmptyGrid(dims));
        }
        if nczp_start + nczp > dims[2] {
            return Err(GridError::SlabOutOfBounds {
                start: nczp_start,
                end: nczp_start + nczp,
                ncz: dims[2],
            });
        }
        Ok(Self {
            dims,
            nczp,
            nczp_start,
        })
    }

    /// A single partition covering the whole grid.
    pub fn whole(dims: [usize; 3]) -> Result<Self, GridError> {
        Self::new(dims, dims[2], 0)
    }

    /// Split the grid into `parts` contiguous slabs along the third axis.
    ///
    /// Leftover planes go to the leading partitions, one each.
    pub fn split(dims: [usize; 3], parts: usize) -> Result<Vec<Self>, GridError> {
        if parts == 0 || parts > dims[2] {
            return Err(GridError::TooManyPartitions {
                ncz: dims[2],
                parts,
            });
        }
        let base = dims[2] / parts;
        let extra = dims[2] % parts;

        let mut start = 0;
        let mut slabs = Vec::with_capacity(parts);
        for p in 0..parts {
            let nczp = base + usize::from(p < extra);
            slabs.push(Self::new(dims, nczp, start)?);
            start += nczp;
        }
        Ok(slabs)
    }

    /// Global dimensions `(ncx, ncy, ncz)`.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Local slab thickness along the partitioned axis.
    pub fn nczp(&self) -> usize {
        self.nczp
    }

    /// First global plane owned by this partition.
    pub fn nczp_start(&self) -> usize {
        self.nczp_start
    }

    /// Number of locally stored points (`nrxx`).
    pub fn local_len(&self) -> usize {
        self.dims[0] * self.dims[1] * self.nczp
    }

    /// Number of points in the whole grid (`ncxyz`).
    pub fn global_len(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Global lattice indices `(i, j, k)` of local point `ir`.
    pub fn indices(&self, ir: usize) -> [usize; 3] {
        let i = ir / (self.dims[1] * self.nczp);
        let j = ir / self.nczp - i * self.dims[1];
        let k = ir % self.nczp + self.nczp_start;
        [i, j, k]
    }

    /// Fractional coordinates of local point `ir`, each in `[0, 1)`.
    pub fn fractional(&self, ir: usize) -> [f64; 3] {
        let [i, j, k] = self.indices(ir);
        [
            i as f64 / self.dims[0] as f64,
            j as f64 / self.dims[1] as f64,
            k as f64 / self.dims[2] as f64,
        ]
    }

    /// Index into a whole-grid array (third axis fastest) of local point `ir`.
    pub fn global_index(&self, ir: usize) -> usize {
        let [i, j, k] = self.indices(ir);
        (i * self.dims[1] + j) * self.dims[2] + k
    }
}
