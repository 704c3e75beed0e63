//! Readiness multiplexing.
//!
//! A [`Poller`] watches a set of registered file descriptors and blocks until
//! at least one of them is ready. Three backends implement the trait:
//!
//! - `epoll` on Linux and Android
//! - `kqueue` on macOS, iOS and the BSDs
//! - portable `poll(2)` on every Unix target
//!
//! The backend is chosen at startup through [`PollerKind`]; call sites never
//! see which one is active. Registrations are level-triggered in every
//! backend, so a descriptor that stays ready keeps being reported.

#[cfg(any(target_os = "linux", target_os = "android"))]
mod epoll;
mod fd_table;
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
mod kqueue;
mod portable;
mod ready;

use std::fmt;
use std::os::unix::io::RawFd;
use std::str::FromStr;

use crate::error::PollError;

pub use fd_table::FdTable;
pub use ready::{ReadyEvent, ReadyList, INITIAL_READY_CAPACITY};

/// Opaque user data attached to a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub usize);

impl Token {
    /// Reserved for an I/O worker's control pipe.
    pub const CONTROL: Token = Token(usize::MAX);
}

/// Read and write interest for one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interest {
    pub read: bool,
    pub write: bool,
}

impl Interest {
    pub const NONE: Interest = Interest::new(false, false);
    pub const READABLE: Interest = Interest::new(true, false);
    pub const WRITABLE: Interest = Interest::new(false, true);
    pub const BOTH: Interest = Interest::new(true, true);

    pub const fn new(read: bool, write: bool) -> Self {
        Self { read, write }
    }
}

/// The multiplexer backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollerKind {
    /// Linux `epoll`.
    Epoll,
    /// BSD `kqueue`.
    Kqueue,
    /// Portable `poll(2)`.
    Poll,
}

impl PollerKind {
    /// Every backend, in preference order.
    pub const ALL: [PollerKind; 3] = [PollerKind::Epoll, PollerKind::Kqueue, PollerKind::Poll];

    /// The default backend for this build.
    pub fn native() -> Self {
        if cfg!(feature = "portable-poll") {
            return PollerKind::Poll;
        }

        if cfg!(any(target_os = "linux", target_os = "android")) {
            PollerKind::Epoll
        } else if cfg!(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "dragonfly"
        )) {
            PollerKind::Kqueue
        } else {
            PollerKind::Poll
        }
    }

    /// Whether this backend is compiled for the current target.
    pub fn is_available(self) -> bool {
        match self {
            PollerKind::Epoll => cfg!(any(target_os = "linux", target_os = "android")),
            PollerKind::Kqueue => cfg!(any(
                target_os = "macos",
                target_os = "ios",
                target_os = "freebsd",
                target_os = "openbsd",
                target_os = "dragonfly"
            )),
            PollerKind::Poll => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PollerKind::Epoll => "epoll",
            PollerKind::Kqueue => "kqueue",
            PollerKind::Poll => "poll",
        }
    }
}

impl Default for PollerKind {
    fn default() -> Self {
        Self::native()
    }
}

impl fmt::Display for PollerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PollerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "epoll" => Ok(PollerKind::Epoll),
            "kqueue" => Ok(PollerKind::Kqueue),
            "poll" => Ok(PollerKind::Poll),
            other => Err(format!("unknown poller '{other}'")),
        }
    }
}

/// A readiness multiplexer.
///
/// A descriptor may be registered at most once. `add` on a registered
/// descriptor fails with [`PollError::AlreadyRegistered`]; `update` and
/// `remove` on an unknown one fail with [`PollError::NotRegistered`].
pub trait Poller: Send {
    /// Which backend this is.
    fn kind(&self) -> PollerKind;

    /// Registers `fd` with the given token and interest.
    fn add(&mut self, fd: RawFd, token: Token, interest: Interest) -> Result<(), PollError>;

    /// Replaces the token and interest of a registered `fd`.
    fn update(&mut self, fd: RawFd, token: Token, interest: Interest) -> Result<(), PollError>;

    /// Unregisters `fd`.
    fn remove(&mut self, fd: RawFd) -> Result<(), PollError>;

    /// Number of registered descriptors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blocks until at least one registered descriptor is ready.
    ///
    /// Returns `Ok(None)` without blocking when nothing is registered. An
    /// interrupted wait is retried with a zero timeout, so the returned list
    /// may be empty. The list is reused by the next call.
    fn poll(&mut self) -> Result<Option<&ReadyList>, PollError>;
}

/// Creates a poller of the requested kind.
pub fn create(kind: PollerKind) -> Result<Box<dyn Poller>, PollError> {
    match kind {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        PollerKind::Epoll => Ok(Box::new(epoll::EpollPoller::new()?)),
        #[cfg(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "dragonfly"
        ))]
        PollerKind::Kqueue => Ok(Box::new(kqueue::KqueuePoller::new()?)),
        PollerKind::Poll => Ok(Box::new(portable::PortablePoller::new())),
        #[allow(unreachable_patterns)]
        other => Err(PollError::Unsupported(other)),
    }
}

/// Runs `f` until it stops failing with `EINTR`.
///
/// `f` receives `true` on every call after an interruption, which backends
/// use to switch to a zero timeout.
pub(crate) fn retry_interrupted<F>(mut f: F) -> std::io::Result<usize>
where
    F: FnMut(bool) -> nix::Result<usize>,
{
    let mut interrupted = false;
    loop {
        match f(interrupted) {
            Ok(count) => return Ok(count),
            Err(nix::errno::Errno::EINTR) => interrupted = true,
            Err(errno) => return Err(errno.into()),
        }
    }
}
