//! Single-process backend: the local value already is the global one.

use crate::backend::{BackendType, ComputeError, GlobalReduce, GroupInfo};

/// Reduction over a group of one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialReduce;

impl SerialReduce {
    pub fn new() -> Self {
        Self
    }
}

impl GlobalReduce for SerialReduce {
    fn group_info(&self) -> GroupInfo {
        GroupInfo {
            name: "serial".into(),
            backend_type: BackendType::Serial,
            rank: 0,
            size: 1,
        }
    }

    fn global_sum(&self, local: f64) -> Result<f64, ComputeError> {
        Ok(local)
    }
}
