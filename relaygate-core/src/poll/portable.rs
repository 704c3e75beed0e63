//! Portable `poll(2)` backend.

use std::os::unix::io::RawFd;

use nix::poll::{PollFd, PollFlags};

use super::{retry_interrupted, FdTable, Interest, Poller, PollerKind, ReadyEvent, ReadyList, Token};
use crate::error::PollError;

pub struct PortablePoller {
    /// Registered descriptors, parallel to `pollfds`.
    fds: Vec<RawFd>,
    pollfds: Vec<PollFd>,
    tokens: FdTable,
    ready: ReadyList,
}

impl PortablePoller {
    pub fn new() -> Self {
        tracing::info!("created poll");
        Self {
            fds: Vec::new(),
            pollfds: Vec::new(),
            tokens: FdTable::new(),
            ready: ReadyList::new(),
        }
    }

    fn position(&self, fd: RawFd) -> Option<usize> {
        self.fds.iter().position(|&registered| registered == fd)
    }
}

fn poll_flags(interest: Interest) -> PollFlags {
    let mut flags = PollFlags::empty();
    if interest.read {
        flags |= PollFlags::POLLIN;
    }
    if interest.write {
        flags |= PollFlags::POLLOUT;
    }
    flags
}

impl Poller for PortablePoller {
    fn kind(&self) -> PollerKind {
        PollerKind::Poll
    }

    fn add(&mut self, fd: RawFd, token: Token, interest: Interest) -> Result<(), PollError> {
        self.tokens.insert(fd, token)?;
        self.fds.push(fd);
        self.pollfds.push(PollFd::new(fd, poll_flags(interest)));
        Ok(())
    }

    fn update(&mut self, fd: RawFd, token: Token, interest: Interest) -> Result<(), PollError> {
        self.tokens.replace(fd, token)?;
        if let Some(index) = self.position(fd) {
            self.pollfds[index] = PollFd::new(fd, poll_flags(interest));
        }
        Ok(())
    }

    fn remove(&mut self, fd: RawFd) -> Result<(), PollError> {
        self.tokens.remove(fd)?;
        if let Some(index) = self.position(fd) {
            self.fds.remove(index);
            self.pollfds.remove(index);
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }

    fn poll(&mut self) -> Result<Option<&ReadyList>, PollError> {
        if self.pollfds.is_empty() {
            return Ok(None);
        }

        let pollfds = &mut self.pollfds;
        let count = retry_interrupted(|interrupted| {
            let timeout = if interrupted { 0 } else { -1 };
            nix::poll::poll(&mut pollfds[..], timeout).map(|n| n as usize)
        })
        .map_err(PollError::Wait)?;

        self.ready.reset(count);
        for (&fd, entry) in self.fds.iter().zip(&self.pollfds) {
            let revents = match entry.revents() {
                Some(revents) if !revents.is_empty() => revents,
                _ => continue,
            };
            let token = match self.tokens.get(fd) {
                Some(token) => token,
                None => continue,
            };
            self.ready.push(ReadyEvent::new(
                token,
                revents.contains(PollFlags::POLLIN),
                revents.contains(PollFlags::POLLOUT),
                revents.intersects(PollFlags::POLLERR | PollFlags::POLLHUP | PollFlags::POLLNVAL),
            ));
        }
        Ok(Some(&self.ready))
    }
}
