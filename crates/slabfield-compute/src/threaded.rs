//! In-process backend: each grid partition runs on its own thread.
//!
//! The handles returned by [`thread_group`] share one slot per rank and a
//! barrier. A reduction writes the caller's slot, waits for every rank,
//! sums the slots in rank order and waits again before returning, so the
//! buffer is free for the next call and every rank sees the bit-identical
//! total.
//!
//! Each handle must be driven by a distinct thread. Calling `global_sum` on
//! two handles of the same group from one thread blocks forever.

use std::sync::{Arc, Barrier, Mutex};

use crate::backend::{BackendType, ComputeError, GlobalReduce, GroupInfo};

struct Shared {
    barrier: Barrier,
    slots: Mutex<Vec<f64>>,
}

/// One participant of an in-process reduction group.
pub struct ThreadRank {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

/// Create `size` connected reduction handles, ordered by rank.
pub fn thread_group(size: usize) -> Vec<ThreadRank> {
    let shared = Arc::new(Shared {
        barrier: Barrier::new(size),
        slots: Mutex::new(vec![0.0; size]),
    });
    (0..size)
        .map(|rank| ThreadRank {
            rank,
            size,
            shared: Arc::clone(&shared),
        })
        .collect()
}

impl ThreadRank {
    pub fn rank(&self) -> usize {
        self.rank
    }

    fn poisoned() -> ComputeError {
        ComputeError::Communication("reduction buffer poisoned by a panicked rank".into())
    }
}

impl GlobalReduce for ThreadRank {
    fn group_info(&self) -> GroupInfo {
        GroupInfo {
            name: format!("threads ({} ranks)", self.size),
            backend_type: BackendType::Threaded,
            rank: self.rank,
            size: self.size,
        }
    }

    fn global_sum(&self, local: f64) -> Result<f64, ComputeError> {
        {
            let mut slots = self.shared.slots.lock().map_err(|_| Self::poisoned())?;
            slots[self.rank] = local;
        }
        self.shared.barrier.wait();

        let total = {
            let slots = self.shared.slots.lock().map_err(|_| Self::poisoned())?;
            slots.iter().sum::<f64>()
        };
        self.shared.barrier.wait();

        log::trace!("rank {}/{}: global_sum {:e} -> {:e}", self.rank, self.size, local, total);
        Ok(total)
    }
}
