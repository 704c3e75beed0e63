//! TCP socket setup.

use std::io;
use std::net::SocketAddr;

use nix::sys::signal::{signal, SigHandler, Signal};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::error::RelayError;

/// Outcome of starting a non-blocking connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStatus {
    /// The connection was established immediately.
    Connected,
    /// The connection completes later; watch for writability.
    InProgress,
}

/// Creates a non-blocking listening socket bound to `addr`.
///
/// The socket has `SO_REUSEADDR` set and uses the system's maximum backlog.
pub fn bind_listener(addr: SocketAddr) -> Result<Socket, RelayError> {
    let bind_err = |source| RelayError::Bind { addr, source };

    let socket =
        Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP)).map_err(bind_err)?;
    socket.set_reuse_address(true).map_err(bind_err)?;
    socket.bind(&addr.into()).map_err(bind_err)?;
    socket
        .listen(libc::SOMAXCONN)
        .map_err(|source| RelayError::Listen { addr, source })?;
    socket
        .set_nonblocking(true)
        .map_err(|source| RelayError::Listen { addr, source })?;
    Ok(socket)
}

/// Prepares an accepted client socket for relaying.
pub fn prepare_client(socket: &Socket, no_delay: bool) -> io::Result<()> {
    socket.set_nonblocking(true)?;
    if no_delay {
        socket.set_nodelay(true)?;
    }
    Ok(())
}

/// Starts a non-blocking connect to `addr`.
///
/// `EINPROGRESS` and `EINTR` both mean the connect continues in the
/// background.
pub fn connect_remote(addr: SocketAddr, no_delay: bool) -> io::Result<(Socket, ConnectStatus)> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_nonblocking(true)?;

    let status = match socket.connect(&addr.into()) {
        Ok(()) => ConnectStatus::Connected,
        Err(e) if is_connect_pending(&e) => ConnectStatus::InProgress,
        Err(e) => return Err(e),
    };

    if no_delay {
        socket.set_nodelay(true)?;
    }
    Ok((socket, status))
}

fn is_connect_pending(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EINPROGRESS) | Some(libc::EINTR))
        || err.kind() == io::ErrorKind::WouldBlock
}

/// Renders a socket address for log lines, `?` if it is not an IP address.
pub fn describe(addr: io::Result<SockAddr>) -> String {
    match addr.ok().and_then(|a| a.as_socket()) {
        Some(addr) => addr.to_string(),
        None => "?".to_string(),
    }
}

/// Ignores `SIGPIPE` so writes to a closed socket fail with `EPIPE`.
pub fn ignore_sigpipe() -> Result<(), RelayError> {
    // SAFETY: SigIgn installs no handler code.
    unsafe { signal(Signal::SIGPIPE, SigHandler::SigIgn) }
        .map(|_| ())
        .map_err(RelayError::Signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{TcpListener, TcpStream};

    #[test]
    fn test_bind_listener_accepts() {
        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap().as_socket().unwrap();
        assert_ne!(addr.port(), 0);
        assert!(listener.nonblocking().unwrap());

        let err = listener.accept().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);

        let _client = TcpStream::connect(addr).unwrap();
        let (accepted, peer) = loop {
            match listener.accept() {
                Ok(pair) => break pair,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => std::thread::yield_now(),
                Err(e) => panic!("accept failed: {e}"),
            }
        };
        assert!(peer.as_socket().is_some());
        prepare_client(&accepted, true).unwrap();
        assert!(accepted.nodelay().unwrap());
    }

    #[test]
    fn test_bind_conflict_reports_address() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();

        match bind_listener(addr) {
            Err(RelayError::Bind { addr: reported, .. }) => assert_eq!(reported, addr),
            other => panic!("expected bind error, got {other:?}"),
        }
    }

    #[test]
    fn test_connect_remote() {
        let remote = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = remote.local_addr().unwrap();

        let (socket, status) = connect_remote(addr, true).unwrap();
        assert!(socket.nonblocking().unwrap());
        assert!(socket.nodelay().unwrap());
        assert!(matches!(
            status,
            ConnectStatus::Connected | ConnectStatus::InProgress
        ));
        remote.accept().unwrap();
    }

    #[test]
    fn test_describe() {
        let addr: SocketAddr = "[::1]:8080".parse().unwrap();
        assert_eq!(describe(Ok(SockAddr::from(addr))), "[::1]:8080");
        assert_eq!(describe(Err(io::Error::from(io::ErrorKind::NotConnected))), "?");
    }
}
