//! The relay threads.
//!
//! One [`AcceptorWorker`] accepts clients and hands each descriptor to an
//! [`IoWorker`] over a pipe. Each I/O worker pairs the client with a fresh
//! connection to the remote endpoint and shuttles bytes both ways.

mod acceptor;
mod session;
mod worker;

pub use acceptor::{AcceptorWorker, HandoffCounts};
pub use session::{Flush, Session, SessionId, SessionRole, SessionState};
pub use worker::IoWorker;
