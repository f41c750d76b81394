//! Startup configuration shared by the Beacon server and client.
//!
//! The server takes every setting from its command line; there are no
//! configuration files and no environment overrides. [`ServerConfig`] is the
//! parsed form of `beacond`'s arguments, [`LogFormat`] selects the telemetry
//! formatter, and [`defaults`] holds the protocol constants both binaries must
//! agree on.

pub mod defaults;
mod logging;
mod server;

pub use defaults::{DEFAULT_LOG_FILTER, LISTEN_BACKLOG, MESSAGE_BUFFER_SIZE};
pub use logging::LogFormat;
pub use server::ServerConfig;
