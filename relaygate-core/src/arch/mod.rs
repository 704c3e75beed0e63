//! Thread management
//!
//! This module is responsible for:
//! - Building named worker threads
//! - Optionally pinning I/O worker threads to CPU cores

pub mod thread_builder;

pub use thread_builder::{PinningResult, ThreadBuilder, WorkerThread};
