//! Acceptor event loop.
//!
//! The acceptor owns every listening socket and the write end of each I/O
//! worker's handoff pipe. Accepted descriptors go to the workers in strict
//! round-robin order; after the handoff the acceptor never touches them.

use std::io;
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use socket2::Socket;
use tracing::{info, warn};

use crate::config::ProxySettings;
use crate::error::{fatal, RelayError};
use crate::net::fd::describe_errno;
use crate::net::HandoffSender;
use crate::poll::{self, Interest, Poller, Token};

/// Per-worker count of handed-off descriptors, shared with observers.
#[derive(Debug, Clone)]
pub struct HandoffCounts(Arc<Vec<AtomicUsize>>);

impl HandoffCounts {
    pub fn new(workers: usize) -> Self {
        Self(Arc::new((0..workers).map(|_| AtomicUsize::new(0)).collect()))
    }

    fn record(&self, worker: usize) {
        self.0[worker].fetch_add(1, Ordering::Relaxed);
    }

    /// Current counts, indexed by worker.
    pub fn snapshot(&self) -> Vec<usize> {
        self.0.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }
}

/// Accepts clients and distributes them to the I/O workers.
pub struct AcceptorWorker {
    listeners: Vec<Socket>,
    poller: Box<dyn Poller>,
    workers: Vec<HandoffSender>,
    next: usize,
    max_ops_per_fd: usize,
    counts: HandoffCounts,
    /// Listener indexes from the current ready set, reused across turns.
    ready: Vec<usize>,
}

impl AcceptorWorker {
    /// Registers every listener; listener `i` is reported as `Token(i)`.
    pub fn new(
        listeners: Vec<Socket>,
        workers: Vec<HandoffSender>,
        settings: &ProxySettings,
        counts: HandoffCounts,
    ) -> Result<Self, RelayError> {
        if workers.is_empty() {
            return Err(RelayError::InvalidArgument(
                "acceptor needs at least one io worker".to_string(),
            ));
        }

        let mut poller = poll::create(settings.poller)?;
        for (i, listener) in listeners.iter().enumerate() {
            poller.add(listener.as_raw_fd(), Token(i), Interest::READABLE)?;
        }

        Ok(Self {
            listeners,
            poller,
            workers,
            next: 0,
            max_ops_per_fd: settings.max_ops_per_fd,
            counts,
            ready: Vec::new(),
        })
    }

    /// Runs the accept loop forever.
    pub fn run(mut self) -> ! {
        loop {
            self.turn();
        }
    }

    /// Waits for ready listeners and accepts from each.
    pub fn turn(&mut self) {
        let mut ready = std::mem::take(&mut self.ready);
        ready.clear();
        match self.poller.poll() {
            Ok(Some(events)) => ready.extend(
                events
                    .iter()
                    .filter(|e| e.readable || e.error)
                    .map(|e| e.token.0),
            ),
            Ok(None) => fatal("acceptor has no listening sockets"),
            Err(e) => fatal(format!("acceptor poll failed: {e}")),
        }

        for &index in &ready {
            self.accept_ready(index);
        }
        self.ready = ready;
    }

    fn accept_ready(&mut self, index: usize) {
        let max_ops = self.max_ops_per_fd;
        for _ in 0..max_ops {
            let listener = match self.listeners.get(index) {
                Some(listener) => listener,
                None => fatal(format!("ready event for unknown listener {index}")),
            };
            match listener.accept() {
                Ok((socket, _)) => {
                    let fd = socket.into_raw_fd();
                    info!("accepted fd {}", fd);
                    self.hand_off(fd);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("accept error {}", describe_errno(&e));
                    break;
                }
            }
        }
    }

    fn hand_off(&mut self, fd: RawFd) {
        let worker = self.next;
        if let Err(e) = self.workers[worker].send(fd) {
            fatal(format!(
                "error writing to pipe fd {}: {}",
                self.workers[worker].fd(),
                e
            ));
        }
        self.counts.record(worker);
        self.next = (worker + 1) % self.workers.len();
    }
}
