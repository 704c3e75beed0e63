//! Proxy settings and endpoint resolution.

use std::net::{SocketAddr, ToSocketAddrs};

use crate::error::{RelayError, Result};
use crate::poll::PollerKind;
use crate::pool::INITIAL_POOL_SIZE;

/// Default size of each session staging buffer in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 16384;

/// Default number of I/O worker threads.
pub const DEFAULT_IO_THREADS: usize = 1;

/// Default bound on accepts or reads performed for one descriptor per
/// readiness event.
pub const DEFAULT_MAX_OPS_PER_FD: usize = 100;

/// Configuration for a proxy instance.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    /// Addresses to accept clients on.
    pub listen_addrs: Vec<SocketAddr>,

    /// Endpoint every client is relayed to.
    pub remote_addr: SocketAddr,

    /// Size of each session staging buffer in bytes.
    pub buffer_size: usize,

    /// Whether to set `TCP_NODELAY` on both sockets of a pair.
    pub no_delay: bool,

    /// Number of I/O worker threads.
    pub io_threads: usize,

    /// Accepts or reads per descriptor per readiness event.
    pub max_ops_per_fd: usize,

    /// Buffers each worker's pool starts with.
    pub initial_pool_size: usize,

    /// Multiplexer backend for every thread.
    pub poller: PollerKind,

    /// Whether to pin I/O worker threads to CPU cores.
    pub pin_threads: bool,
}

impl ProxySettings {
    /// Settings with defaults for everything but the addresses.
    pub fn new(listen_addrs: Vec<SocketAddr>, remote_addr: SocketAddr) -> Self {
        Self {
            listen_addrs,
            remote_addr,
            ..Self::default()
        }
    }

    /// Checks that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        if self.listen_addrs.is_empty() {
            return Err(RelayError::InvalidArgument(
                "at least one listen address is required".to_string(),
            ));
        }
        if self.buffer_size == 0 {
            return Err(RelayError::InvalidArgument(
                "buffer size must be positive".to_string(),
            ));
        }
        if self.io_threads == 0 {
            return Err(RelayError::InvalidArgument(
                "num io threads must be positive".to_string(),
            ));
        }
        if self.max_ops_per_fd == 0 {
            return Err(RelayError::InvalidArgument(
                "max operations per fd must be positive".to_string(),
            ));
        }
        if self.initial_pool_size == 0 {
            return Err(RelayError::InvalidArgument(
                "initial pool size must be positive".to_string(),
            ));
        }
        if !self.poller.is_available() {
            return Err(RelayError::InvalidArgument(format!(
                "{} poller is not available on this platform",
                self.poller
            )));
        }
        Ok(())
    }
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            listen_addrs: Vec::new(),
            remote_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            buffer_size: DEFAULT_BUFFER_SIZE,
            no_delay: false,
            io_threads: DEFAULT_IO_THREADS,
            max_ops_per_fd: DEFAULT_MAX_OPS_PER_FD,
            initial_pool_size: INITIAL_POOL_SIZE,
            poller: PollerKind::native(),
            pin_threads: false,
        }
    }
}

/// Resolves a `host:port` argument to its first address.
///
/// The port follows the last colon, so IPv6 hosts may be written bare or in
/// brackets (`::1:8080`, `[::1]:8080`).
pub fn resolve_endpoint(input: &str) -> Result<SocketAddr> {
    let invalid = || RelayError::InvalidArgument(format!("invalid address:port argument: '{input}'"));

    let colon = input.rfind(':').ok_or_else(invalid)?;
    let (host, port) = (&input[..colon], &input[colon + 1..]);
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() || port.is_empty() {
        return Err(invalid());
    }
    let port: u16 = port.parse().map_err(|_| invalid())?;

    let resolve_err = |message: String| RelayError::Resolve {
        input: input.to_string(),
        message,
    };
    (host, port)
        .to_socket_addrs()
        .map_err(|e| resolve_err(e.to_string()))?
        .next()
        .ok_or_else(|| resolve_err("no addresses found".to_string()))
}
