//! UNIX socket transport for the server.
//!
//! [`ListenerSocket`] owns the bound socket from validation to unlink,
//! [`run_accept_loop`] serves one connection at a time over it, and
//! [`CommandConnectionHandler`] turns each connection into a single
//! request/reply exchange.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;
mod validator;

pub use self::errors::ListenerError;
pub use self::handler::{CommandConnectionHandler, ConnectionHandler};
pub use self::listener::{ConnectionSource, ListenerSocket, run_accept_loop};
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, RecordingHandler, ScriptedSource};
pub use self::validator::{PathStatus, classify_socket_path};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
