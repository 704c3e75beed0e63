//! Socket plumbing shared by the acceptor and the I/O workers.

pub mod fd;
pub mod handoff;
pub mod socket;

pub use fd::{read_some, write_some, Transfer};
pub use handoff::{channel, HandoffReceiver, HandoffSender};
pub use socket::{bind_listener, connect_remote, ignore_sigpipe, prepare_client, ConnectStatus};
