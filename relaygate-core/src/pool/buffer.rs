//! Fixed-size buffer pool with doubling growth.

use crate::error::fatal;

/// A pool of equally sized byte buffers.
///
/// Buffers are handed out as owned `Box<[u8]>` values, so a buffer is held
/// either by the pool or by exactly one caller. The pool never shrinks:
/// buffers are only freed when the pool itself is dropped.
#[derive(Debug)]
pub struct BufferPool {
    /// Size of every buffer in bytes.
    buffer_size: usize,

    /// Buffers currently available.
    available: Vec<Box<[u8]>>,

    /// Total number of buffers the pool has allocated.
    capacity: usize,
}

impl BufferPool {
    /// Creates a pool of `initial_count` buffers of `buffer_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if either argument is zero.
    pub fn new(buffer_size: usize, initial_count: usize) -> Self {
        assert!(buffer_size > 0, "buffer size must be positive");
        assert!(initial_count > 0, "initial pool size must be positive");

        let mut pool = Self {
            buffer_size,
            available: Vec::new(),
            capacity: 0,
        };
        pool.grow(initial_count);
        pool
    }

    /// Takes a buffer out of the pool, doubling the pool first if it is empty.
    ///
    /// The returned buffer's contents are unspecified.
    pub fn acquire(&mut self) -> Box<[u8]> {
        if self.available.is_empty() {
            self.grow(self.capacity * 2);
        }

        match self.available.pop() {
            Some(buffer) => buffer,
            None => fatal("buffer pool empty after growth"),
        }
    }

    /// Returns a buffer to the pool.
    ///
    /// Releasing more buffers than were acquired is a contract violation:
    /// debug builds panic, release builds drop the surplus buffer so that
    /// `available() <= capacity()` still holds.
    pub fn release(&mut self, buffer: Box<[u8]>) {
        debug_assert_eq!(
            buffer.len(),
            self.buffer_size,
            "released buffer has the wrong size"
        );
        debug_assert!(
            self.available.len() < self.capacity,
            "buffer released to a full pool"
        );

        if self.available.len() < self.capacity {
            self.available.push(buffer);
        }
    }

    /// Size in bytes of every buffer in the pool.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Number of buffers ready to be acquired.
    pub fn available(&self) -> usize {
        self.available.len()
    }

    /// Total number of buffers owned by the pool, in or out.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of buffers currently held by callers.
    pub fn in_use(&self) -> usize {
        self.capacity - self.available.len()
    }

    fn grow(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity > self.capacity);

        let added = new_capacity - self.capacity;
        self.available.reserve_exact(new_capacity - self.available.len());
        for _ in 0..added {
            self.available
                .push(vec![0u8; self.buffer_size].into_boxed_slice());
        }
        self.capacity = new_capacity;
    }
}
