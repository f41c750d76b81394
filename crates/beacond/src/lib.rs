//! Beacon server: a local control endpoint on a UNIX domain socket.
//!
//! The server validates its socket path before binding (refusing live
//! sockets and non-socket files, reclaiming sockets left behind by a crashed
//! server), then accepts connections one at a time. Each connection carries a
//! single raw command of at most 256 bytes and receives a single raw reply
//! before the server closes it:
//!
//! | Command (any case) | Reply |
//! |---|---|
//! | `PING` | `PONG` |
//! | `VERSION` | the build identifier |
//! | anything else | `REJECTED` |
//!
//! Termination signals are recorded by [`SystemShutdownSignal`] and observed
//! by the accept loop, which then returns so [`ListenerSocket::stop`] can
//! remove the socket file on the main thread.

pub mod build_info;
mod dispatch;
mod process;
pub mod telemetry;
mod transport;

pub use dispatch::{Command, CommandDispatcher, PONG_REPLY, REJECTED_REPLY};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_server, run_server_with,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{
    CommandConnectionHandler, ConnectionHandler, ConnectionSource, ListenerError, ListenerSocket,
    PathStatus, classify_socket_path, run_accept_loop,
};
