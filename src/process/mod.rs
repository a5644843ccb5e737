//! Child-process execution for benchmark binaries.
//!
//! The proxy decouples lifecycle queries from the native handle: start and
//! exit metadata are captured into a [`ProcessSnapshot`] the moment they are
//! observed, so they stay readable after the handle is released. Waiting is a
//! three-way race between natural exit, cancellation, and an optional
//! deadline; losing the race never terminates the child.

pub mod proxy;
pub mod snapshot;

pub use proxy::{LaunchError, ProcessError, ProcessProxy, ProcessSpec, WaitOutcome};
pub use snapshot::ProcessSnapshot;
