//! One half of a relayed connection.

use std::fmt;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

use socket2::Socket;

use crate::net::{write_some, Transfer};
use crate::poll::{Interest, Token};

/// Slot of a session in its worker's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub usize);

impl SessionId {
    pub fn token(self) -> Token {
        Token(self.0)
    }

    pub fn from_token(token: Token) -> Self {
        SessionId(token.0)
    }
}

/// Which socket of the pair a session wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    /// Accepted from a client.
    ClientSide,
    /// Connected out to the remote endpoint.
    RemoteSide,
}

impl SessionRole {
    pub fn label(self) -> &'static str {
        match self {
            SessionRole::ClientSide => "client to proxy",
            SessionRole::RemoteSide => "proxy to remote",
        }
    }
}

/// State derived from a session's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a non-blocking connect to finish.
    Connecting,
    /// Reading from its socket, nothing buffered.
    Idle,
    /// Holding bytes the socket would not take yet.
    BlockedOnWrite,
    /// Peer is gone; flushing what is buffered, then closing.
    Draining,
    /// Neither reading nor writing, e.g. the client side while its remote
    /// connect is in progress.
    Paused,
}

/// Result of flushing a session's staged bytes.
#[derive(Debug)]
pub enum Flush {
    /// Every staged byte was written.
    Complete,
    /// The socket stopped accepting bytes; some remain staged.
    WouldBlock,
    Failed(io::Error),
}

/// One socket of a session pair plus the bytes staged for writing to it.
///
/// The staging buffer is filled by the *peer's* reads: data read from the
/// client lands in the remote session's buffer and vice versa.
#[derive(Debug)]
pub struct Session {
    pub(crate) socket: Socket,
    role: SessionRole,
    pub(crate) buffer: Box<[u8]>,
    offset: usize,
    len: usize,
    pub(crate) awaiting_connect: bool,
    pub(crate) awaiting_readable: bool,
    pub(crate) awaiting_writable: bool,
    pub(crate) close_after_flush: bool,
    pub(crate) peer: Option<SessionId>,
    client_label: String,
    server_label: String,
}

impl Session {
    pub fn new(
        socket: Socket,
        role: SessionRole,
        buffer: Box<[u8]>,
        client_label: String,
        server_label: String,
    ) -> Self {
        Self {
            socket,
            role,
            buffer,
            offset: 0,
            len: 0,
            awaiting_connect: false,
            awaiting_readable: false,
            awaiting_writable: false,
            close_after_flush: false,
            peer: None,
            client_label,
            server_label,
        }
    }

    pub fn fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn peer(&self) -> Option<SessionId> {
        self.peer
    }

    pub fn awaiting_connect(&self) -> bool {
        self.awaiting_connect
    }

    pub fn awaiting_readable(&self) -> bool {
        self.awaiting_readable
    }

    pub fn awaiting_writable(&self) -> bool {
        self.awaiting_writable
    }

    pub fn close_after_flush(&self) -> bool {
        self.close_after_flush
    }

    /// Bytes staged but not yet written.
    pub fn pending(&self) -> usize {
        self.len - self.offset
    }

    /// Multiplexer interest implied by the flags.
    pub fn interest(&self) -> Interest {
        Interest::new(
            self.awaiting_readable,
            self.awaiting_connect || self.awaiting_writable,
        )
    }

    pub fn state(&self) -> SessionState {
        if self.awaiting_connect {
            SessionState::Connecting
        } else if self.close_after_flush {
            SessionState::Draining
        } else if self.awaiting_writable {
            SessionState::BlockedOnWrite
        } else if self.awaiting_readable {
            SessionState::Idle
        } else {
            SessionState::Paused
        }
    }

    /// Marks the first `len` bytes of the buffer as staged.
    pub(crate) fn stage(&mut self, len: usize) {
        debug_assert!(len <= self.buffer.len());
        self.offset = 0;
        self.len = len;
    }

    pub(crate) fn clear_staged(&mut self) {
        self.offset = 0;
        self.len = 0;
    }

    /// Writes staged bytes until none remain or the socket would block.
    pub(crate) fn flush(&mut self) -> Flush {
        while self.offset < self.len {
            match write_some(&mut self.socket, &self.buffer[self.offset..self.len]) {
                Transfer::Done(n) => self.offset += n,
                Transfer::WouldBlock => return Flush::WouldBlock,
                Transfer::Failed(e) => return Flush::Failed(e),
                Transfer::Eof => {
                    return Flush::Failed(io::Error::from(io::ErrorKind::WriteZero))
                }
            }
        }
        Flush::Complete
    }

    pub(crate) fn into_parts(self) -> (Socket, Box<[u8]>, Option<SessionId>) {
        (self.socket, self.buffer, self.peer)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} (fd={})",
            self.role.label(),
            self.client_label,
            self.server_label,
            self.fd()
        )
    }
}
