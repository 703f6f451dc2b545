//! # Slabfield Compute
//!
//! Communication backends for the slabfield engine. The physics code in
//! `slabfield-core` never talks to a communicator directly; it receives a
//! [`GlobalReduce`](backend::GlobalReduce) capability and calls
//! `global_sum` exactly where a grid-wide total is needed.
//!
//! ## Available backends
//!
//! | Backend | Type | Use |
//! |---------|------|-----|
//! | Serial | [`SerialReduce`] | one process owns the whole grid |
//! | Threaded | [`ThreadRank`] | N in-process partitions, one thread each |

pub mod backend;
pub mod serial;
pub mod threaded;

pub use backend::{BackendType, ComputeError, GlobalReduce, GroupInfo};
pub use serial::SerialReduce;
pub use threaded::{thread_group, ThreadRank};
