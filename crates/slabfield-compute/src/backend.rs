//! Collective-reduction trait and group description.
//!
//! The [`GlobalReduce`] trait abstracts over the way grid partitions are
//! distributed (a single process, threads in one process, or ranks of a
//! message-passing job) so that the dipole integrals in `slabfield-core`
//! stay independent of the communication layer.

use thiserror::Error;

/// Errors originating from a communication backend.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Communication failure: {0}")]
    Communication(String),
}

/// Describes the process group behind a reduction handle.
#[derive(Debug, Clone)]
pub struct GroupInfo {
    pub name: String,
    pub backend_type: BackendType,
    /// Index of the calling participant within the group.
    pub rank: usize,
    /// Number of participants that must join every reduction.
    pub size: usize,
}

/// The kind of group a reduction handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Serial,
    Threaded,
}

/// A blocking, collective sum over every participant owning a grid partition.
///
/// Every participant must call [`global_sum`](GlobalReduce::global_sum) the
/// same number of times and in the same relative order. A participant that
/// skips a call leaves the others blocked forever; implementations do not
/// detect this.
pub trait GlobalReduce: Send + Sync {
    /// Return information about the group.
    fn group_info(&self) -> GroupInfo;

    /// Sum `local` over all participants and return the total to each of them.
    fn global_sum(&self, local: f64) -> Result<f64, ComputeError>;
}
