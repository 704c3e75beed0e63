//! Acceptor to I/O worker descriptor handoff.
//!
//! Each I/O worker owns the read end of one pipe and the acceptor owns the
//! write end. A message is the native-endian bytes of one `RawFd`. Reads and
//! writes may be partial; the receiver keeps a partly assembled message
//! across readiness events.

use std::io;
use std::mem::size_of;
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use nix::errno::Errno;
use nix::unistd;

use super::fd::set_nonblocking;
use crate::error::RelayError;

const MESSAGE_LEN: usize = size_of::<RawFd>();

/// Creates a connected sender/receiver pair.
///
/// The receiving end is non-blocking; the sending end blocks.
pub fn channel() -> Result<(HandoffSender, HandoffReceiver), RelayError> {
    let (read_fd, write_fd) = unistd::pipe().map_err(RelayError::Pipe)?;
    // SAFETY: pipe() returned two fresh descriptors that nothing else owns.
    let (read_end, write_end) =
        unsafe { (OwnedFd::from_raw_fd(read_fd), OwnedFd::from_raw_fd(write_fd)) };
    set_nonblocking(read_end.as_raw_fd()).map_err(RelayError::Pipe)?;

    Ok((
        HandoffSender { fd: write_end },
        HandoffReceiver {
            fd: read_end,
            pending: [0; MESSAGE_LEN],
            filled: 0,
        },
    ))
}

/// Write end of a handoff pipe.
#[derive(Debug)]
pub struct HandoffSender {
    fd: OwnedFd,
}

impl HandoffSender {
    /// Writes one descriptor value, looping over partial writes.
    pub fn send(&self, value: RawFd) -> io::Result<()> {
        let bytes = value.to_ne_bytes();
        let mut written = 0;
        while written < bytes.len() {
            match unistd::write(self.fd.as_raw_fd(), &bytes[written..]) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
                Ok(n) => written += n,
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(io::Error::from(errno)),
            }
        }
        Ok(())
    }

    pub fn fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

/// Read end of a handoff pipe.
#[derive(Debug)]
pub struct HandoffReceiver {
    fd: OwnedFd,
    pending: [u8; MESSAGE_LEN],
    filled: usize,
}

impl HandoffReceiver {
    pub fn fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }

    /// Reads until the pipe would block, calling `on_fd` for every complete
    /// descriptor value.
    ///
    /// EOF means the sender is gone and is reported as `UnexpectedEof`.
    pub fn drain<F>(&mut self, mut on_fd: F) -> io::Result<()>
    where
        F: FnMut(RawFd),
    {
        loop {
            match unistd::read(self.fd.as_raw_fd(), &mut self.pending[self.filled..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "handoff pipe closed",
                    ))
                }
                Ok(n) => {
                    self.filled += n;
                    if self.filled == MESSAGE_LEN {
                        self.filled = 0;
                        on_fd(RawFd::from_ne_bytes(self.pending));
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(Errno::EAGAIN) => return Ok(()),
                Err(errno) => return Err(io::Error::from(errno)),
            }
        }
    }

    /// Bytes of a partly received message.
    pub fn partial_len(&self) -> usize {
        self.filled
    }
}
