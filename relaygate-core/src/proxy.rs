//! Proxy startup.
//!
//! [`ProxyServer::bind`] does everything that may fail at startup: settings
//! validation, binding and listening. [`ProxyServer::start`] then spawns the
//! acceptor and the I/O workers, after which failures are process-fatal.

use std::io;
use std::net::SocketAddr;
use std::os::unix::io::AsRawFd;
use std::sync::Arc;

use socket2::Socket;
use tracing::info;

use crate::arch::{ThreadBuilder, WorkerThread};
use crate::config::ProxySettings;
use crate::error::{fatal, RelayError, Result};
use crate::net::{bind_listener, channel, ignore_sigpipe};
use crate::relay::{AcceptorWorker, HandoffCounts, IoWorker};

/// A proxy whose listening sockets are bound but not yet served.
#[derive(Debug)]
pub struct ProxyServer {
    settings: Arc<ProxySettings>,
    listeners: Vec<Socket>,
    local_addrs: Vec<SocketAddr>,
}

impl ProxyServer {
    /// Validates `settings` and binds every listen address.
    pub fn bind(settings: ProxySettings) -> Result<Self> {
        settings.validate()?;

        let mut listeners = Vec::with_capacity(settings.listen_addrs.len());
        let mut local_addrs = Vec::with_capacity(settings.listen_addrs.len());
        for &addr in &settings.listen_addrs {
            let listener = bind_listener(addr)?;
            let local = listener
                .local_addr()
                .ok()
                .and_then(|a| a.as_socket())
                .unwrap_or(addr);
            info!("listening on {} (fd={})", local, listener.as_raw_fd());
            listeners.push(listener);
            local_addrs.push(local);
        }

        Ok(Self {
            settings: Arc::new(settings),
            listeners,
            local_addrs,
        })
    }

    /// Bound listen addresses, with ephemeral ports resolved.
    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.local_addrs
    }

    pub fn settings(&self) -> &ProxySettings {
        &self.settings
    }

    /// Spawns the I/O workers and the acceptor.
    pub fn start(self) -> Result<ProxyHandle> {
        ignore_sigpipe()?;

        let settings = self.settings;
        info!("remote address {}", settings.remote_addr);
        info!("buffer size {}", settings.buffer_size);
        info!("no delay {}", settings.no_delay);
        info!("num io threads {}", settings.io_threads);
        info!("poller {}", settings.poller);

        let mut builder = ThreadBuilder::new(settings.pin_threads);
        let mut threads = Vec::with_capacity(settings.io_threads + 1);
        let mut senders = Vec::with_capacity(settings.io_threads);

        for index in 0..settings.io_threads {
            let (sender, receiver) = channel()?;
            senders.push(sender);

            let worker_settings = Arc::clone(&settings);
            let thread = builder.spawn_pinned(&format!("io-{index}"), move || {
                match IoWorker::new(index, worker_settings, receiver) {
                    Ok(worker) => worker.run(),
                    Err(e) => fatal(format!("io worker {index} failed to start: {e}")),
                }
            });
            threads.push(spawned(thread));
        }

        let counts = HandoffCounts::new(settings.io_threads);
        let acceptor = AcceptorWorker::new(self.listeners, senders, &settings, counts.clone())?;
        let thread = builder.spawn("acceptor", move || acceptor.run());
        threads.push(spawned(thread));

        Ok(ProxyHandle {
            local_addrs: self.local_addrs,
            counts,
            threads,
        })
    }
}

fn spawned(thread: Result<WorkerThread>) -> WorkerThread {
    match thread {
        Ok(thread) => thread,
        Err(e) => fatal(e),
    }
}

/// A running proxy.
#[derive(Debug)]
pub struct ProxyHandle {
    local_addrs: Vec<SocketAddr>,
    counts: HandoffCounts,
    threads: Vec<WorkerThread>,
}

impl ProxyHandle {
    /// Addresses clients can connect to.
    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.local_addrs
    }

    /// Descriptors handed to each I/O worker so far.
    pub fn handoff_counts(&self) -> Vec<usize> {
        self.counts.snapshot()
    }

    /// Blocks until every relay thread exits, which only happens if one of
    /// them panics.
    pub fn join(self) -> Result<()> {
        for thread in self.threads {
            let name = thread.name().to_string();
            if thread.join().is_err() {
                return Err(RelayError::Io(io::Error::new(
                    io::ErrorKind::Other,
                    format!("thread {name} panicked"),
                )));
            }
        }
        Ok(())
    }
}
