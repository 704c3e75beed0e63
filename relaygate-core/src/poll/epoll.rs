//! `epoll` backend.

use std::io;
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use nix::errno::Errno;
use nix::sys::epoll::{
    epoll_create1, epoll_ctl, epoll_wait, EpollCreateFlags, EpollEvent, EpollFlags, EpollOp,
};

use super::ready::doubled_capacity;
use super::{retry_interrupted, Interest, Poller, PollerKind, ReadyEvent, ReadyList, Token};
use crate::error::PollError;

pub struct EpollPoller {
    epfd: OwnedFd,
    /// Kernel output array; never shorter than the registration count.
    events: Vec<EpollEvent>,
    registered: usize,
    ready: ReadyList,
}

impl EpollPoller {
    pub fn new() -> Result<Self, PollError> {
        let fd = epoll_create1(EpollCreateFlags::EPOLL_CLOEXEC).map_err(|e| PollError::Create {
            kind: PollerKind::Epoll,
            source: io::Error::from(e),
        })?;
        // SAFETY: fd is a freshly created descriptor owned by nobody else.
        let epfd = unsafe { OwnedFd::from_raw_fd(fd) };
        tracing::info!("created epoll (fd={})", fd);

        Ok(Self {
            epfd,
            events: Vec::new(),
            registered: 0,
            ready: ReadyList::new(),
        })
    }

    fn ctl(&self, op: EpollOp, fd: RawFd, token: Token, interest: Interest) -> nix::Result<()> {
        let mut event = EpollEvent::new(epoll_flags(interest), token.0 as u64);
        epoll_ctl(self.epfd.as_raw_fd(), op, fd, &mut event)
    }
}

fn epoll_flags(interest: Interest) -> EpollFlags {
    let mut flags = EpollFlags::empty();
    if interest.read {
        flags |= EpollFlags::EPOLLIN;
    }
    if interest.write {
        flags |= EpollFlags::EPOLLOUT;
    }
    flags
}

fn control_error(fd: RawFd, op: &'static str, errno: Errno) -> PollError {
    match errno {
        Errno::EEXIST => PollError::AlreadyRegistered { fd },
        Errno::ENOENT => PollError::NotRegistered { fd },
        _ => PollError::Control {
            fd,
            op,
            source: io::Error::from(errno),
        },
    }
}

impl Poller for EpollPoller {
    fn kind(&self) -> PollerKind {
        PollerKind::Epoll
    }

    fn add(&mut self, fd: RawFd, token: Token, interest: Interest) -> Result<(), PollError> {
        self.ctl(EpollOp::EpollCtlAdd, fd, token, interest)
            .map_err(|e| control_error(fd, "epoll_ctl(EPOLL_CTL_ADD)", e))?;

        self.registered += 1;
        if self.registered > self.events.len() {
            let capacity = doubled_capacity(self.events.len(), self.registered);
            self.events.resize(capacity, EpollEvent::empty());
        }
        Ok(())
    }

    fn update(&mut self, fd: RawFd, token: Token, interest: Interest) -> Result<(), PollError> {
        self.ctl(EpollOp::EpollCtlMod, fd, token, interest)
            .map_err(|e| control_error(fd, "epoll_ctl(EPOLL_CTL_MOD)", e))
    }

    fn remove(&mut self, fd: RawFd) -> Result<(), PollError> {
        epoll_ctl(self.epfd.as_raw_fd(), EpollOp::EpollCtlDel, fd, None)
            .map_err(|e| control_error(fd, "epoll_ctl(EPOLL_CTL_DEL)", e))?;
        self.registered -= 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.registered
    }

    fn poll(&mut self) -> Result<Option<&ReadyList>, PollError> {
        if self.registered == 0 {
            return Ok(None);
        }

        let epfd = self.epfd.as_raw_fd();
        let events = &mut self.events[..self.registered];
        let count = retry_interrupted(|interrupted| {
            let timeout = if interrupted { 0 } else { -1 };
            epoll_wait(epfd, &mut *events, timeout)
        })
        .map_err(PollError::Wait)?;

        self.ready.reset(count);
        for event in &self.events[..count] {
            let flags = event.events();
            self.ready.push(ReadyEvent::new(
                Token(event.data() as usize),
                flags.contains(EpollFlags::EPOLLIN),
                flags.contains(EpollFlags::EPOLLOUT),
                flags.intersects(EpollFlags::EPOLLERR | EpollFlags::EPOLLHUP),
            ));
        }
        Ok(Some(&self.ready))
    }
}
