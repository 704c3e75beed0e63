//! Thread builder for the relay's named worker threads
//!
//! Every thread the relay starts gets a name (`acceptor`, `io-N`) that shows
//! up in each log line it writes. I/O worker threads can optionally be pinned
//! to CPU cores.

use std::io;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::error::RelayError;

/// Result of attempting to pin a thread to a specific core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinningResult {
    /// Successfully pinned to the requested core
    Success,
    /// Successfully pinned, but to a different core than requested
    SuccessDifferentCore(usize),
    /// Pinning was not requested or is not supported on this platform
    Unsupported,
    /// Pinning failed for some other reason
    Failed,
}

/// A spawned worker thread
#[derive(Debug)]
pub struct WorkerThread {
    /// The thread's name
    name: String,
    /// The thread's join handle
    handle: JoinHandle<()>,
    /// The CPU core this thread was assigned, if any
    core_id: Option<usize>,
}

impl WorkerThread {
    /// Get the thread's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the CPU core this thread was assigned, if any
    pub fn core_id(&self) -> Option<usize> {
        self.core_id
    }

    /// Wait for the thread to finish
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

/// Builder for creating worker threads
#[derive(Debug)]
pub struct ThreadBuilder {
    /// Whether to pin pinnable threads to cores
    pin: bool,
    /// Number of cores to spread pinned threads over
    cores: usize,
    /// Index of the next pinned thread
    next_core: usize,
}

impl ThreadBuilder {
    /// Create a new thread builder
    pub fn new(pin: bool) -> Self {
        Self {
            pin,
            cores: num_cpus::get().max(1),
            next_core: 0,
        }
    }

    /// Spawn a named thread that is never pinned
    pub fn spawn<F>(&mut self, name: &str, f: F) -> Result<WorkerThread, RelayError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn_inner(name, None, f)
    }

    /// Spawn a named thread, pinned to the next core if pinning is enabled
    pub fn spawn_pinned<F>(&mut self, name: &str, f: F) -> Result<WorkerThread, RelayError>
    where
        F: FnOnce() + Send + 'static,
    {
        let core = if self.pin {
            let core = self.next_core % self.cores;
            self.next_core += 1;
            Some(core)
        } else {
            None
        };
        self.spawn_inner(name, core, f)
    }

    fn spawn_inner<F>(
        &mut self,
        name: &str,
        core: Option<usize>,
        f: F,
    ) -> Result<WorkerThread, RelayError>
    where
        F: FnOnce() + Send + 'static,
    {
        let spawn_err = |source: io::Error| RelayError::Spawn {
            name: name.to_string(),
            source,
        };

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                if let Some(core) = core {
                    match pin_thread_to_core(core) {
                        PinningResult::Success => debug!("pinned to core {}", core),
                        PinningResult::SuccessDifferentCore(actual) => {
                            debug!("pinned to core {} instead of {}", actual, core)
                        }
                        result => warn!("thread pinning to core {}: {:?}", core, result),
                    }
                }
                f();
            })
            .map_err(spawn_err)?;

        Ok(WorkerThread {
            name: name.to_string(),
            handle,
            core_id: core,
        })
    }
}

/// Attempt to pin the current thread to a specific CPU core
fn pin_thread_to_core(core_id: usize) -> PinningResult {
    let core_ids = match core_affinity::get_core_ids() {
        Some(core_ids) if !core_ids.is_empty() => core_ids,
        Some(_) => return PinningResult::Failed,
        None => return PinningResult::Unsupported,
    };

    if let Some(core) = core_ids.get(core_id) {
        if core_affinity::set_for_current(*core) {
            PinningResult::Success
        } else {
            PinningResult::Failed
        }
    } else {
        // Fewer usable cores than reported; wrap around
        let fallback_core_id = core_id % core_ids.len();
        if core_affinity::set_for_current(core_ids[fallback_core_id]) {
            PinningResult::SuccessDifferentCore(fallback_core_id)
        } else {
            PinningResult::Failed
        }
    }
}
