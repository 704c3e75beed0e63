//! Reusable result buffer for a poll call.

use super::Token;

/// Capacity every backend event array starts at.
pub const INITIAL_READY_CAPACITY: usize = 16;

/// One ready descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyEvent {
    /// Token given at registration.
    pub token: Token,
    pub readable: bool,
    pub writable: bool,
    /// Error or hangup condition.
    pub error: bool,
}

impl ReadyEvent {
    pub fn new(token: Token, readable: bool, writable: bool, error: bool) -> Self {
        Self {
            token,
            readable,
            writable,
            error,
        }
    }
}

/// The ready set from the most recent poll.
///
/// Storage grows by doubling from [`INITIAL_READY_CAPACITY`] and is never
/// released, so steady-state polling does not allocate.
#[derive(Debug, Default)]
pub struct ReadyList {
    events: Vec<ReadyEvent>,
}

impl ReadyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the list and makes room for `count` events.
    pub(crate) fn reset(&mut self, count: usize) {
        self.events.clear();
        let capacity = doubled_capacity(self.events.capacity(), count);
        if capacity > self.events.capacity() {
            self.events.reserve_exact(capacity);
        }
    }

    pub(crate) fn push(&mut self, event: ReadyEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReadyEvent> {
        self.events.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReadyEvent> {
        self.events.iter()
    }

    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }
}

impl<'a> IntoIterator for &'a ReadyList {
    type Item = &'a ReadyEvent;
    type IntoIter = std::slice::Iter<'a, ReadyEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Smallest power-of-two multiple of the current capacity holding `needed`.
///
/// A zero `current` starts from [`INITIAL_READY_CAPACITY`].
pub(crate) fn doubled_capacity(current: usize, needed: usize) -> usize {
    let mut capacity = if current == 0 {
        INITIAL_READY_CAPACITY
    } else {
        current
    };
    while capacity < needed {
        capacity *= 2;
    }
    capacity
}
