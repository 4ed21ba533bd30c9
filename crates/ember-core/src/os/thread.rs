//! Thin wrappers over host thread start/join.
//!
//! The runtime itself does not schedule; it offers these so user code can
//! spawn caller-owned worker threads. There is no cancellation or timeout —
//! `join` blocks until the thread's entry function returns.

use super::error::{OsError, OsResult};
use std::thread::JoinHandle;

/// The function signature a spawned thread's entry point must have.
pub type ThreadEntry = Box<dyn FnOnce() + Send + 'static>;

/// A running (or finished, not yet joined) OS thread.
pub struct OsThread {
    handle: Option<JoinHandle<()>>,
}

impl OsThread {
    /// Starts a new thread running `entry`.
    pub fn start(entry: ThreadEntry) -> OsResult<Self> {
        let handle = std::thread::Builder::new()
            .spawn(entry)
            .map_err(|_| OsError::SystemFailure)?;
        Ok(OsThread {
            handle: Some(handle),
        })
    }

    /// Blocks until the thread finishes.
    pub fn join(mut self) -> OsResult<()> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| OsError::SystemFailure),
            None => Err(OsError::InvalidArgument),
        }
    }
}
