//! Allocation recycling for the I/O workers.
//!
//! Each I/O worker owns one [`BufferPool`] of session staging buffers. It is
//! never shared between threads.

mod buffer;

pub use buffer::BufferPool;

/// Number of buffers a worker's pool starts with.
pub const INITIAL_POOL_SIZE: usize = 16;
