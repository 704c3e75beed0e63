//! `kqueue` backend.
//!
//! Every registration installs both an `EVFILT_READ` and an `EVFILT_WRITE`
//! filter, enabled or disabled according to the interest. Changing interest
//! only toggles the filters, and removal deletes both.

use std::collections::HashSet;
use std::io;
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use nix::errno::Errno;

use super::ready::doubled_capacity;
use super::{retry_interrupted, Interest, Poller, PollerKind, ReadyEvent, ReadyList, Token};
use crate::error::PollError;

pub struct KqueuePoller {
    kq: OwnedFd,
    registered: HashSet<RawFd>,
    /// Kernel output array; holds two entries per registered descriptor.
    events: Vec<libc::kevent>,
    ready: ReadyList,
}

// SAFETY: the raw `udata` pointers inside `events` only ever carry token
// values, never addresses, so moving the poller between threads is sound.
unsafe impl Send for KqueuePoller {}

impl KqueuePoller {
    pub fn new() -> Result<Self, PollError> {
        // SAFETY: kqueue takes no arguments; the result is checked below.
        let fd = unsafe { libc::kqueue() };
        if fd < 0 {
            return Err(PollError::Create {
                kind: PollerKind::Kqueue,
                source: io::Error::last_os_error(),
            });
        }
        // SAFETY: fd is a freshly created descriptor owned by nobody else.
        let kq = unsafe { OwnedFd::from_raw_fd(fd) };
        tracing::info!("created kqueue (fd={})", fd);

        Ok(Self {
            kq,
            registered: HashSet::new(),
            events: Vec::new(),
            ready: ReadyList::new(),
        })
    }

    fn apply(&self, changes: &[libc::kevent; 2]) -> io::Result<()> {
        let kq = self.kq.as_raw_fd();
        let zero = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        retry_interrupted(|_| {
            // SAFETY: changes holds two initialized kevents; no output array.
            let ret = unsafe {
                libc::kevent(
                    kq,
                    changes.as_ptr(),
                    2,
                    std::ptr::null_mut(),
                    0,
                    &zero,
                )
            };
            Errno::result(ret).map(|n| n as usize)
        })
        .map(|_| ())
    }
}

fn change(fd: RawFd, filter: i16, flags: u16, token: Token) -> libc::kevent {
    // SAFETY: kevent is plain old data; zero is valid for every field.
    let mut event: libc::kevent = unsafe { std::mem::zeroed() };
    event.ident = fd as libc::uintptr_t;
    event.filter = filter as _;
    event.flags = flags as _;
    event.udata = token.0 as _;
    event
}

fn filter_flags(enabled: bool) -> u16 {
    if enabled {
        libc::EV_ENABLE as u16
    } else {
        libc::EV_DISABLE as u16
    }
}

fn changes(fd: RawFd, token: Token, interest: Interest, extra: u16) -> [libc::kevent; 2] {
    [
        change(
            fd,
            libc::EVFILT_READ as i16,
            extra | filter_flags(interest.read),
            token,
        ),
        change(
            fd,
            libc::EVFILT_WRITE as i16,
            extra | filter_flags(interest.write),
            token,
        ),
    ]
}

impl Poller for KqueuePoller {
    fn kind(&self) -> PollerKind {
        PollerKind::Kqueue
    }

    fn add(&mut self, fd: RawFd, token: Token, interest: Interest) -> Result<(), PollError> {
        if self.registered.contains(&fd) {
            return Err(PollError::AlreadyRegistered { fd });
        }

        self.apply(&changes(fd, token, interest, libc::EV_ADD as u16))
            .map_err(|source| PollError::Control {
                fd,
                op: "kevent(EV_ADD)",
                source,
            })?;

        self.registered.insert(fd);
        let needed = self.registered.len() * 2;
        if needed > self.events.len() {
            let capacity = doubled_capacity(self.events.len(), needed);
            // SAFETY: kevent is plain old data; zero is valid for every field.
            self.events.resize(capacity, unsafe { std::mem::zeroed() });
        }
        Ok(())
    }

    fn update(&mut self, fd: RawFd, token: Token, interest: Interest) -> Result<(), PollError> {
        if !self.registered.contains(&fd) {
            return Err(PollError::NotRegistered { fd });
        }

        // EV_ADD on an existing filter modifies it in place, which also
        // replaces udata.
        self.apply(&changes(fd, token, interest, libc::EV_ADD as u16))
            .map_err(|source| PollError::Control {
                fd,
                op: "kevent(EV_ENABLE/EV_DISABLE)",
                source,
            })
    }

    fn remove(&mut self, fd: RawFd) -> Result<(), PollError> {
        if !self.registered.remove(&fd) {
            return Err(PollError::NotRegistered { fd });
        }

        let delete = libc::EV_DELETE as u16;
        let removal = [
            change(fd, libc::EVFILT_READ as i16, delete, Token(0)),
            change(fd, libc::EVFILT_WRITE as i16, delete, Token(0)),
        ];
        self.apply(&removal).map_err(|source| PollError::Control {
            fd,
            op: "kevent(EV_DELETE)",
            source,
        })
    }

    fn len(&self) -> usize {
        self.registered.len()
    }

    fn poll(&mut self) -> Result<Option<&ReadyList>, PollError> {
        if self.registered.is_empty() {
            return Ok(None);
        }

        let kq = self.kq.as_raw_fd();
        let max_events = (self.registered.len() * 2).min(libc::c_int::MAX as usize) as libc::c_int;
        let events = self.events.as_mut_ptr();
        let zero = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        let count = retry_interrupted(|interrupted| {
            let timeout = if interrupted {
                &zero as *const libc::timespec
            } else {
                std::ptr::null()
            };
            // SAFETY: events points at self.events, which holds at least
            // twice as many entries as there are registrations.
            let ret =
                unsafe { libc::kevent(kq, std::ptr::null(), 0, events, max_events, timeout) };
            Errno::result(ret).map(|n| n as usize)
        })
        .map_err(PollError::Wait)?;

        self.ready.reset(count);
        for event in &self.events[..count] {
            let token = Token(event.udata as usize);
            let filter = event.filter;
            self.ready.push(ReadyEvent::new(
                token,
                filter == libc::EVFILT_READ as _,
                filter == libc::EVFILT_WRITE as _,
                false,
            ));
        }
        Ok(Some(&self.ready))
    }
}
