//! Proxy settings synchronization loop.
//!
//! [`SyncLoop`] polls the OS proxy settings on a fixed interval, compares
//! each snapshot with the last one it published, and republishes the
//! environment projection only when something changed. At most one poll
//! cycle runs at a time; a tick that finds a cycle in progress is dropped.

mod summary;
mod sync_loop;

pub use summary::{ChangeSummary, Field};
pub use sync_loop::{CycleOutcome, DEFAULT_INTERVAL, MIN_INTERVAL, ObserverFn, SyncEvent, SyncLoop};
