//! I/O worker event loop.
//!
//! An [`IoWorker`] owns a poller, a buffer pool, an arena of sessions and the
//! read end of its handoff pipe. Everything it owns stays on its thread.

use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};
use std::sync::Arc;

use slab::Slab;
use socket2::Socket;
use tracing::{debug, info, warn};

use super::session::{Flush, Session, SessionId, SessionRole};
use crate::config::ProxySettings;
use crate::error::{fatal, RelayError};
use crate::net::fd::describe_errno;
use crate::net::socket::describe;
use crate::net::{connect_remote, prepare_client, read_some, ConnectStatus, HandoffReceiver, Transfer};
use crate::poll::{self, Interest, Poller, ReadyEvent, Token};
use crate::pool::BufferPool;

/// Event loop driving the session pairs handed to one thread.
pub struct IoWorker {
    index: usize,
    settings: Arc<ProxySettings>,
    poller: Box<dyn Poller>,
    buffers: BufferPool,
    sessions: Slab<Session>,
    control: HandoffReceiver,
    /// Descriptors decoded from the control pipe, reused across drains.
    incoming: Vec<RawFd>,
    /// Copy of the current ready set.
    batch: Vec<ReadyEvent>,
}

impl IoWorker {
    /// Creates a worker and registers its control pipe.
    pub fn new(
        index: usize,
        settings: Arc<ProxySettings>,
        control: HandoffReceiver,
    ) -> Result<Self, RelayError> {
        let mut poller = poll::create(settings.poller)?;
        poller.add(control.fd(), Token::CONTROL, Interest::READABLE)?;

        let buffers = BufferPool::new(settings.buffer_size, settings.initial_pool_size);
        let sessions = Slab::with_capacity(settings.initial_pool_size);

        Ok(Self {
            index,
            settings,
            poller,
            buffers,
            sessions,
            control,
            incoming: Vec::new(),
            batch: Vec::new(),
        })
    }

    /// Runs the event loop forever.
    pub fn run(mut self) -> ! {
        debug!("io worker {} running", self.index);
        loop {
            self.turn();
        }
    }

    /// Waits for one ready batch and handles it.
    ///
    /// Once a session is destroyed the rest of the batch is dropped: it may
    /// name sessions that no longer exist or whose slots were reused. The
    /// next turn rediscovers anything still ready.
    pub fn turn(&mut self) {
        self.batch.clear();
        match self.poller.poll() {
            Ok(Some(ready)) => self.batch.extend(ready.iter().copied()),
            Ok(None) => fatal(format!(
                "io worker {} has no registered descriptors",
                self.index
            )),
            Err(e) => fatal(format!("io worker {} poll failed: {}", self.index, e)),
        }

        for i in 0..self.batch.len() {
            let event = self.batch[i];
            if event.token == Token::CONTROL {
                self.on_control();
            } else if self.on_session_ready(event) {
                break;
            }
        }
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(id.0)
    }

    /// Buffers currently held by sessions.
    pub fn buffers_in_use(&self) -> usize {
        self.buffers.in_use()
    }

    /// Links two connected or connecting sockets into a session pair and
    /// registers both.
    ///
    /// Both sockets must already be non-blocking. Returns the client-side
    /// and remote-side ids.
    pub fn attach_pair(
        &mut self,
        client: Socket,
        remote: Socket,
        status: ConnectStatus,
    ) -> (SessionId, SessionId) {
        let connected = status == ConnectStatus::Connected;

        let client_label = describe(client.peer_addr());
        let proxy_label = describe(client.local_addr());
        let outbound_label = describe(remote.local_addr());
        let remote_label = self.settings.remote_addr.to_string();

        info!(
            "connect client to proxy {} -> {} (fd={})",
            client_label,
            proxy_label,
            client.as_raw_fd()
        );
        info!(
            "connect {} proxy to remote {} -> {} (fd={})",
            if connected { "complete" } else { "starting" },
            outbound_label,
            remote_label,
            remote.as_raw_fd()
        );

        let mut client_session = Session::new(
            client,
            SessionRole::ClientSide,
            self.buffers.acquire(),
            client_label,
            proxy_label,
        );
        client_session.awaiting_readable = connected;

        let mut remote_session = Session::new(
            remote,
            SessionRole::RemoteSide,
            self.buffers.acquire(),
            outbound_label,
            remote_label,
        );
        remote_session.awaiting_readable = connected;
        remote_session.awaiting_connect = !connected;

        let client_id = SessionId(self.sessions.insert(client_session));
        let remote_id = SessionId(self.sessions.insert(remote_session));
        self.session_mut(client_id).peer = Some(remote_id);
        self.session_mut(remote_id).peer = Some(client_id);

        self.register(client_id);
        self.register(remote_id);
        (client_id, remote_id)
    }

    /// Tears down a session and cascades to its peer.
    ///
    /// A peer with bytes still staged is left to flush them and close; any
    /// other peer is destroyed immediately.
    pub fn destroy(&mut self, id: SessionId) {
        let session = match self.sessions.try_remove(id.0) {
            Some(session) => session,
            None => fatal(format!("destroy of unknown session {}", id.0)),
        };
        info!("disconnect {}", session);

        let (socket, buffer, peer) = session.into_parts();
        self.buffers.release(buffer);
        if let Err(e) = self.poller.remove(socket.as_raw_fd()) {
            fatal(e);
        }
        drop(socket);

        let peer_id = match peer {
            Some(peer_id) => peer_id,
            None => return,
        };
        let peer_session = self.session_mut(peer_id);
        if peer_session.peer != Some(id) {
            fatal(format!(
                "session {} is not linked back to session {}",
                peer_id.0, id.0
            ));
        }
        peer_session.peer = None;

        if peer_session.awaiting_writable {
            peer_session.close_after_flush = true;
            peer_session.awaiting_readable = false;
            self.update_registration(peer_id);
        } else {
            self.destroy(peer_id);
        }
    }

    fn on_control(&mut self) {
        let mut incoming = std::mem::take(&mut self.incoming);
        if let Err(e) = self.control.drain(|fd| incoming.push(fd)) {
            fatal(format!(
                "read from pipe fd {} failed: {}",
                self.control.fd(),
                e
            ));
        }
        for fd in incoming.drain(..) {
            self.accept_client(fd);
        }
        self.incoming = incoming;
    }

    fn accept_client(&mut self, fd: RawFd) {
        // SAFETY: the acceptor gives up ownership of every descriptor it
        // sends, so this is the only owner.
        let client = unsafe { Socket::from_raw_fd(fd) };

        if let Err(e) = prepare_client(&client, self.settings.no_delay) {
            warn!(
                "error setting up accepted socket fd {}: {}",
                fd,
                describe_errno(&e)
            );
            return;
        }

        match connect_remote(self.settings.remote_addr, self.settings.no_delay) {
            Ok((remote, status)) => {
                self.attach_pair(client, remote, status);
            }
            Err(e) => {
                warn!("remote socket connect error {}", describe_errno(&e));
            }
        }
    }

    /// Handles one ready session. Returns true if a session was destroyed.
    fn on_session_ready(&mut self, event: ReadyEvent) -> bool {
        let id = SessionId::from_token(event.token);
        if !self.sessions.contains(id.0) {
            fatal(format!("ready event for unknown session {}", id.0));
        }

        let mut doomed = None;
        if event.error {
            doomed = self.on_error(id);
        }
        if doomed.is_none() && event.readable {
            doomed = self.on_readable(id);
        }
        if doomed.is_none() && event.writable {
            doomed = self.on_writable(id);
        }

        match doomed {
            Some(target) => {
                self.destroy(target);
                true
            }
            None => false,
        }
    }

    fn on_error(&mut self, id: SessionId) -> Option<SessionId> {
        let session = self.session_mut(id);
        let err = match session.socket.take_error() {
            Ok(None) => return None,
            Ok(Some(err)) | Err(err) => err,
        };
        info!("fd {} {}", session.fd(), describe_errno(&err));
        Some(id)
    }

    /// Moves bytes from this session's socket to its peer's, stopping when
    /// the read would block, the peer stops accepting bytes or the per-event
    /// cap is reached.
    fn on_readable(&mut self, id: SessionId) -> Option<SessionId> {
        let session = self.session_mut(id);
        if !session.awaiting_readable {
            return None;
        }
        let peer = match session.peer {
            Some(peer) => peer,
            None => fatal(format!("readable session {} has no peer", id.0)),
        };

        for _ in 0..self.settings.max_ops_per_fd {
            let (session, peer_session) = match self.sessions.get2_mut(id.0, peer.0) {
                Some(pair) => pair,
                None => fatal(format!("session {} lost peer {}", id.0, peer.0)),
            };

            match read_some(&mut session.socket, &mut peer_session.buffer) {
                Transfer::WouldBlock => return None,
                Transfer::Eof => return Some(id),
                Transfer::Failed(e) => {
                    debug!("read fd {} {}", session.fd(), describe_errno(&e));
                    return Some(id);
                }
                Transfer::Done(n) => {
                    peer_session.stage(n);
                    match peer_session.flush() {
                        Flush::Complete => {}
                        Flush::WouldBlock => {
                            peer_session.awaiting_writable = true;
                            session.awaiting_readable = false;
                            self.update_registration(peer);
                            self.update_registration(id);
                            return None;
                        }
                        Flush::Failed(e) => {
                            debug!("write fd {} {}", peer_session.fd(), describe_errno(&e));
                            return Some(peer);
                        }
                    }
                }
            }
        }
        None
    }

    fn on_writable(&mut self, id: SessionId) -> Option<SessionId> {
        let session = self.session_mut(id);

        if session.awaiting_connect {
            let err = match session.socket.take_error() {
                Ok(None) => None,
                Ok(Some(err)) | Err(err) => Some(err),
            };
            match err {
                None => {
                    info!("connect complete {}", session);
                    session.awaiting_connect = false;
                    session.awaiting_readable = true;
                    let peer = session.peer;
                    self.update_registration(id);
                    self.resume_peer(id, peer);
                    None
                }
                Some(err) if err.raw_os_error() == Some(libc::EINPROGRESS) => None,
                Some(err) => {
                    info!(
                        "async remote connect fd {} {}",
                        session.fd(),
                        describe_errno(&err)
                    );
                    Some(id)
                }
            }
        } else if session.awaiting_writable {
            match session.flush() {
                Flush::WouldBlock => None,
                Flush::Failed(e) => {
                    debug!("write fd {} {}", session.fd(), describe_errno(&e));
                    Some(id)
                }
                Flush::Complete if session.close_after_flush => Some(id),
                Flush::Complete => {
                    session.clear_staged();
                    session.awaiting_writable = false;
                    let peer = session.peer;
                    self.update_registration(id);
                    self.resume_peer(id, peer);
                    None
                }
            }
        } else {
            None
        }
    }

    fn resume_peer(&mut self, id: SessionId, peer: Option<SessionId>) {
        let peer = match peer {
            Some(peer) => peer,
            None => fatal(format!("session {} has no peer to resume", id.0)),
        };
        self.session_mut(peer).awaiting_readable = true;
        self.update_registration(peer);
    }

    fn session_mut(&mut self, id: SessionId) -> &mut Session {
        match self.sessions.get_mut(id.0) {
            Some(session) => session,
            None => fatal(format!("unknown session {}", id.0)),
        }
    }

    fn register(&mut self, id: SessionId) {
        let (fd, interest) = {
            let session = self.session_mut(id);
            (session.fd(), session.interest())
        };
        if let Err(e) = self.poller.add(fd, id.token(), interest) {
            fatal(e);
        }
    }

    fn update_registration(&mut self, id: SessionId) {
        let (fd, interest) = {
            let session = self.session_mut(id);
            (session.fd(), session.interest())
        };
        if let Err(e) = self.poller.update(fd, id.token(), interest) {
            fatal(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{channel, HandoffSender};
    use crate::relay::SessionState;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::os::unix::io::IntoRawFd;
    use std::os::unix::net::UnixStream;
    use std::thread;
    use std::time::Duration;

    use nix::poll::{PollFd, PollFlags};
    use socket2::SockRef;

    use crate::poll::PollerKind;

    fn backends() -> Vec<PollerKind> {
        PollerKind::ALL
            .into_iter()
            .filter(|kind| kind.is_available())
            .collect()
    }

    fn worker_with(buffer_size: usize, kind: PollerKind) -> (IoWorker, HandoffSender) {
        let mut settings = ProxySettings::new(
            vec!["127.0.0.1:0".parse().unwrap()],
            "127.0.0.1:9".parse().unwrap(),
        );
        settings.buffer_size = buffer_size;
        settings.initial_pool_size = 2;
        settings.poller = kind;
        let (sender, receiver) = channel().unwrap();
        (IoWorker::new(0, Arc::new(settings), receiver).unwrap(), sender)
    }

    fn worker(buffer_size: usize) -> (IoWorker, HandoffSender) {
        worker_with(buffer_size, PollerKind::native())
    }

    /// A loopback port with nothing listening on it.
    fn closed_port() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    }

    /// Returns the proxy-side socket and the test's end of a socket pair.
    fn pair() -> (Socket, UnixStream) {
        let (inner, outer) = UnixStream::pair().unwrap();
        inner.set_nonblocking(true).unwrap();
        (Socket::from(inner), outer)
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    /// Writes the pattern into `stream` until it would block.
    fn fill(stream: &mut UnixStream) -> usize {
        stream.set_nonblocking(true).unwrap();
        let data = pattern(1 << 22);
        let mut sent = 0;
        while sent < data.len() {
            match stream.write(&data[sent..]) {
                Ok(n) => sent += n,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => panic!("fill failed: {e}"),
            }
        }
        sent
    }

    fn read_to_end(mut stream: UnixStream) -> thread::JoinHandle<Vec<u8>> {
        thread::spawn(move || {
            let mut received = Vec::new();
            stream.read_to_end(&mut received).unwrap();
            received
        })
    }

    /// Sets up a pair whose remote side is blocked on a small send buffer.
    fn blocked_pair(
        worker: &mut IoWorker,
    ) -> (SessionId, SessionId, UnixStream, UnixStream, usize) {
        let (client, mut client_outer) = pair();
        let (remote, remote_outer) = pair();
        remote.set_send_buffer_size(4096).unwrap();

        let (client_id, remote_id) = worker.attach_pair(client, remote, ConnectStatus::Connected);
        let sent = fill(&mut client_outer);
        assert!(sent > 32 * 1024, "only {sent} bytes buffered");

        worker.turn();
        (client_id, remote_id, client_outer, remote_outer, sent)
    }

    #[test]
    fn test_relays_both_directions() {
        for kind in backends() {
            let (mut worker, _sender) = worker_with(16384, kind);
            let (client, mut client_outer) = pair();
            let (remote, mut remote_outer) = pair();
            let (client_id, remote_id) =
                worker.attach_pair(client, remote, ConnectStatus::Connected);

            assert_eq!(worker.session(client_id).unwrap().peer(), Some(remote_id));
            assert_eq!(worker.session(remote_id).unwrap().peer(), Some(client_id));
            assert_eq!(worker.session(client_id).unwrap().state(), SessionState::Idle);

            client_outer.write_all(b"hello").unwrap();
            worker.turn();
            let mut received = [0u8; 5];
            remote_outer.read_exact(&mut received).unwrap();
            assert_eq!(&received, b"hello", "{kind}");

            remote_outer.write_all(b"world").unwrap();
            worker.turn();
            client_outer.read_exact(&mut received).unwrap();
            assert_eq!(&received, b"world", "{kind}");
        }
    }

    #[test]
    fn test_small_buffer_splits_payload() {
        let (mut worker, _sender) = worker(4);
        let (client, mut client_outer) = pair();
        let (remote, mut remote_outer) = pair();
        worker.attach_pair(client, remote, ConnectStatus::Connected);

        client_outer.write_all(b"0123456789").unwrap();
        worker.turn();
        let mut received = [0u8; 10];
        remote_outer.read_exact(&mut received).unwrap();
        assert_eq!(&received, b"0123456789");
    }

    #[test]
    fn test_backpressure_pauses_and_resumes() {
        for kind in backends() {
            let (mut worker, _sender) = worker_with(16384, kind);
            let (client_id, remote_id, client_outer, remote_outer, sent) =
                blocked_pair(&mut worker);

            let client = worker.session(client_id).unwrap();
            let remote = worker.session(remote_id).unwrap();
            assert!(!client.awaiting_readable(), "{kind}");
            assert!(remote.awaiting_writable(), "{kind}");
            assert!(remote.pending() > 0);
            assert_eq!(remote.state(), SessionState::BlockedOnWrite);

            let reader = read_to_end(remote_outer);
            drop(client_outer);
            while worker.session_count() > 0 {
                worker.turn();
            }

            let received = reader.join().unwrap();
            assert_eq!(received.len(), sent, "{kind}");
            assert!(received == pattern(sent), "{kind}: relayed bytes differ");
            assert_eq!(worker.buffers_in_use(), 0);
        }
    }

    #[test]
    fn test_destroy_lets_peer_flush() {
        for kind in backends() {
            let (mut worker, _sender) = worker_with(16384, kind);
            let (client_id, remote_id, _client_outer, remote_outer, _) =
                blocked_pair(&mut worker);
            let pending = worker.session(remote_id).unwrap().pending();

            worker.destroy(client_id);
            assert!(worker.session(client_id).is_none());
            let remote = worker.session(remote_id).unwrap();
            assert!(remote.close_after_flush());
            assert!(!remote.awaiting_readable());
            assert_eq!(remote.peer(), None);
            assert_eq!(remote.state(), SessionState::Draining);

            let reader = read_to_end(remote_outer);
            while worker.session_count() > 0 {
                worker.turn();
            }

            let received = reader.join().unwrap();
            assert!(received.len() >= pending, "{kind}");
            assert!(received == pattern(received.len()), "{kind}: drained bytes differ");
            assert_eq!(worker.buffers_in_use(), 0);
        }
    }

    #[test]
    fn test_destroy_without_pending_closes_peer() {
        for kind in backends() {
            let (mut worker, _sender) = worker_with(16384, kind);
            let (client, _client_outer) = pair();
            let (remote, mut remote_outer) = pair();
            let (client_id, _) = worker.attach_pair(client, remote, ConnectStatus::Connected);
            assert_eq!(worker.session_count(), 2);

            worker.destroy(client_id);
            assert_eq!(worker.session_count(), 0, "{kind}");
            assert_eq!(worker.buffers_in_use(), 0);

            let mut rest = Vec::new();
            remote_outer.read_to_end(&mut rest).unwrap();
            assert!(rest.is_empty());
        }
    }

    #[test]
    fn test_client_eof_closes_pair() {
        for kind in backends() {
            let (mut worker, _sender) = worker_with(16384, kind);
            let (client, client_outer) = pair();
            let (remote, mut remote_outer) = pair();
            worker.attach_pair(client, remote, ConnectStatus::Connected);

            drop(client_outer);
            while worker.session_count() > 0 {
                worker.turn();
            }
            assert_eq!(worker.buffers_in_use(), 0, "{kind}");
            let mut rest = Vec::new();
            remote_outer.read_to_end(&mut rest).unwrap();
            assert!(rest.is_empty());
        }
    }

    #[test]
    fn test_destroyed_slots_are_reused() {
        let (mut worker, _sender) = worker(16384);
        let (client, _client_outer) = pair();
        let (remote, _remote_outer) = pair();
        let (first_client, first_remote) =
            worker.attach_pair(client, remote, ConnectStatus::Connected);
        worker.destroy(first_client);
        assert_eq!(worker.session_count(), 0);

        let (client, _client_outer) = pair();
        let (remote, _remote_outer) = pair();
        let (client_id, remote_id) = worker.attach_pair(client, remote, ConnectStatus::Connected);
        let mut reused = [client_id.0, remote_id.0];
        let mut freed = [first_client.0, first_remote.0];
        reused.sort_unstable();
        freed.sort_unstable();
        assert_eq!(reused, freed);
        assert_eq!(worker.session(client_id).unwrap().peer(), Some(remote_id));
    }

    #[test]
    fn test_client_reset_destroys_pair() {
        for kind in backends() {
            let (mut worker, _sender) = worker_with(16384, kind);

            let front = TcpListener::bind("127.0.0.1:0").unwrap();
            let client_outer = TcpStream::connect(front.local_addr().unwrap()).unwrap();
            let (accepted, _) = front.accept().unwrap();
            accepted.set_nonblocking(true).unwrap();
            let (remote, mut remote_outer) = pair();
            worker.attach_pair(Socket::from(accepted), remote, ConnectStatus::Connected);

            // Zero linger turns the close into an RST.
            SockRef::from(&client_outer)
                .set_linger(Some(Duration::ZERO))
                .unwrap();
            drop(client_outer);

            while worker.session_count() > 0 {
                worker.turn();
            }
            assert_eq!(worker.buffers_in_use(), 0, "{kind}");
            let mut rest = Vec::new();
            remote_outer.read_to_end(&mut rest).unwrap();
            assert!(rest.is_empty());
        }
    }

    #[test]
    fn test_refused_connect_destroys_pair() {
        for kind in backends() {
            let (mut worker, _sender) = worker_with(16384, kind);
            let (remote, status) = connect_remote(closed_port(), false).unwrap();
            assert_eq!(status, ConnectStatus::InProgress);
            let (client, mut client_outer) = pair();

            worker.attach_pair(client, remote, status);
            while worker.session_count() > 0 {
                worker.turn();
            }
            assert_eq!(worker.buffers_in_use(), 0, "{kind}");

            let mut rest = Vec::new();
            client_outer.read_to_end(&mut rest).unwrap();
            assert!(rest.is_empty());
        }
    }

    #[test]
    fn test_connect_error_on_writable_destroys_session() {
        let (mut worker, _sender) = worker(16384);
        let (remote, status) = connect_remote(closed_port(), false).unwrap();
        assert_eq!(status, ConnectStatus::InProgress);
        let (client, _client_outer) = pair();
        let (_, remote_id) = worker.attach_pair(client, remote, status);

        let fd = worker.session(remote_id).unwrap().fd();
        let mut fds = [PollFd::new(fd, PollFlags::POLLOUT)];
        assert_eq!(nix::poll::poll(&mut fds, 5000).unwrap(), 1);

        assert_eq!(worker.on_writable(remote_id), Some(remote_id));
        worker.destroy(remote_id);
        assert_eq!(worker.session_count(), 0);
        assert_eq!(worker.buffers_in_use(), 0);
    }

    #[test]
    fn test_connect_completion_enables_reads() {
        let (mut worker, _sender) = worker(16384);
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let (remote, _) = connect_remote(listener.local_addr().unwrap(), false).unwrap();
        let (client, _client_outer) = pair();

        let (client_id, remote_id) = worker.attach_pair(client, remote, ConnectStatus::InProgress);
        assert_eq!(worker.session(remote_id).unwrap().state(), SessionState::Connecting);
        assert!(!worker.session(client_id).unwrap().awaiting_readable());

        while worker.session(remote_id).unwrap().awaiting_connect() {
            worker.turn();
        }
        assert!(worker.session(client_id).unwrap().awaiting_readable());
        assert!(worker.session(remote_id).unwrap().awaiting_readable());
        listener.accept().unwrap();
    }

    #[test]
    fn test_handoff_creates_pair() {
        let remote = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut settings = ProxySettings::new(
            vec!["127.0.0.1:0".parse().unwrap()],
            remote.local_addr().unwrap(),
        );
        settings.initial_pool_size = 1;
        let (sender, receiver) = channel().unwrap();
        let mut worker = IoWorker::new(3, Arc::new(settings), receiver).unwrap();

        let front = TcpListener::bind("127.0.0.1:0").unwrap();
        let _client = TcpStream::connect(front.local_addr().unwrap()).unwrap();
        let (accepted, _) = front.accept().unwrap();
        sender.send(accepted.into_raw_fd()).unwrap();

        while worker.session_count() == 0 {
            worker.turn();
        }
        assert_eq!(worker.session_count(), 2);
        assert_eq!(worker.buffers_in_use(), 2);
    }
}
