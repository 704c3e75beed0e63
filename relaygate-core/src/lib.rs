//! Relaygate Core - multi-threaded non-blocking TCP forwarding proxy
//!
//! Clients connecting to any listen address are paired with a fresh
//! connection to a single remote endpoint, and bytes are relayed both ways
//! until either side closes.

/// Thread management
pub mod arch;

/// Command line interface
pub mod cli;

/// Proxy settings and address resolution
pub mod config;

/// Error types
pub mod error;

/// Log output
pub mod logging;

/// Socket setup, non-blocking transfers and descriptor handoff
pub mod net;

/// Readiness notification backends
pub mod poll;

/// Staging buffer pool
pub mod pool;

/// Proxy startup
pub mod proxy;

/// Acceptor, I/O workers and relay sessions
pub mod relay;

pub use config::ProxySettings;
pub use error::{PollError, RelayError};
pub use poll::PollerKind;
pub use proxy::{ProxyHandle, ProxyServer};
