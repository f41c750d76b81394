//! Protocol constants and configuration defaults.

/// Size of the receive buffer on either side of a connection.
///
/// A command longer than this is truncated by the server; a reply is read by
/// the client up to this many bytes.
pub const MESSAGE_BUFFER_SIZE: usize = 256;

/// Pending-connection backlog passed to `listen(2)`.
pub const LISTEN_BACKLOG: i32 = 5;

/// Default log filter expression used by the server.
pub const DEFAULT_LOG_FILTER: &str = "info";
