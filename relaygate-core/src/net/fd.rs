//! Non-blocking descriptor I/O.

use std::io::{self, Read, Write};
use std::os::unix::io::RawFd;

use nix::fcntl::{fcntl, FcntlArg, OFlag};

/// Outcome of one non-blocking read or write.
#[derive(Debug)]
pub enum Transfer {
    /// This many bytes moved.
    Done(usize),
    /// Nothing can move until the descriptor is ready again.
    WouldBlock,
    /// The peer closed its end (reads only).
    Eof,
    /// Any other failure.
    Failed(io::Error),
}

impl Transfer {
    fn from_result(result: io::Result<usize>, zero: Transfer) -> Transfer {
        match result {
            Ok(0) => zero,
            Ok(n) => Transfer::Done(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Transfer::WouldBlock,
            Err(e) => Transfer::Failed(e),
        }
    }
}

/// Reads once into `buf`, retrying interrupted calls.
pub fn read_some<R: Read>(reader: &mut R, buf: &mut [u8]) -> Transfer {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            result => return Transfer::from_result(result, Transfer::Eof),
        }
    }
}

/// Writes once from `buf`, retrying interrupted calls.
///
/// A write accepting zero bytes of a non-empty buffer is a failure.
pub fn write_some<W: Write>(writer: &mut W, buf: &[u8]) -> Transfer {
    debug_assert!(!buf.is_empty());
    loop {
        match writer.write(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            result => {
                return Transfer::from_result(
                    result,
                    Transfer::Failed(io::Error::from(io::ErrorKind::WriteZero)),
                )
            }
        }
    }
}

/// Sets `O_NONBLOCK` on a raw descriptor.
pub fn set_nonblocking(fd: RawFd) -> nix::Result<()> {
    let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
    fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    Ok(())
}

/// Renders an error as `errno N: message`, the way connection errors are logged.
pub fn describe_errno(err: &io::Error) -> String {
    match err.raw_os_error() {
        Some(code) => format!("errno {}: {}", code, nix::errno::Errno::from_i32(code).desc()),
        None => err.to_string(),
    }
}
