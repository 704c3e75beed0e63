//! Error types for the relay.
//!
//! Three classes of failure exist in this crate:
//!
//! - Per-connection failures (read/write/connect errors, EOF). These never
//!   surface as `Err` values from the event loops; they tear down the
//!   affected session pair and are logged.
//! - Startup failures ([`RelayError`]): bad arguments, resolve/bind/listen
//!   errors. The binary prints them and exits with status 1.
//! - Process-fatal failures: multiplexer syscall errors outside the retry
//!   set, registration invariant violations, thread spawn failures. The
//!   loops escalate these through [`fatal`], which aborts.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::os::unix::io::RawFd;

use crate::poll::PollerKind;

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors that can occur while configuring or starting the relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// An address argument could not be resolved.
    #[error("Failed to resolve '{input}': {message}")]
    Resolve { input: String, message: String },

    /// A setting is out of range or missing.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failed to create or bind a listening socket.
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Failed to put a bound socket into the listening state.
    #[error("Failed to listen on {addr}: {source}")]
    Listen {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Failed to create or configure a handoff pipe.
    #[error("Failed to set up handoff pipe: {0}")]
    Pipe(#[source] nix::Error),

    /// Failed to install a signal disposition.
    #[error("Failed to configure signal handling: {0}")]
    Signal(#[source] nix::Error),

    /// Failed to spawn a worker thread.
    #[error("Failed to spawn thread {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Multiplexer failure.
    #[error(transparent)]
    Poll(#[from] PollError),

    /// Other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors reported by a [`Poller`](crate::poll::Poller) backend.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The backend's kernel object could not be created.
    #[error("Failed to create {kind} poller: {source}")]
    Create {
        kind: PollerKind,
        #[source]
        source: io::Error,
    },

    /// The requested backend is not compiled for this platform.
    #[error("{0} poller is not available on this platform")]
    Unsupported(PollerKind),

    /// `add` was called for a descriptor that is already registered.
    #[error("fd {fd} is already registered")]
    AlreadyRegistered { fd: RawFd },

    /// `update` or `remove` was called for an unknown descriptor.
    #[error("fd {fd} is not registered")]
    NotRegistered { fd: RawFd },

    /// A registration syscall failed.
    #[error("{op} failed for fd {fd}: {source}")]
    Control {
        fd: RawFd,
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// The blocking wait failed with something other than `EINTR`.
    #[error("Readiness wait failed: {0}")]
    Wait(#[source] io::Error),
}

impl PollError {
    /// Returns true for registration bookkeeping violations.
    ///
    /// These indicate a bug in the caller rather than an OS failure.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRegistered { .. } | Self::NotRegistered { .. }
        )
    }
}

/// Logs `message` and aborts the process.
///
/// Used for conditions the relay treats as unrecoverable: a corrupted
/// registration table or a failing multiplexer leaves every session on the
/// thread in an unknown state.
pub fn fatal(message: impl fmt::Display) -> ! {
    tracing::error!("{}", message);
    std::process::abort()
}
