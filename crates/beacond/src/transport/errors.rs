//! Error types for socket path validation and listener operations.

use std::io;

use camino::Utf8PathBuf;
use nix::errno::Errno;
use thiserror::Error;

/// Errors surfaced while validating, binding or running the socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// `lstat` on the socket path failed for a reason other than absence.
    #[error("failed to read metadata for socket path {path}: {source}")]
    Metadata {
        /// Path being inspected.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The path exists but is not a socket; it is left untouched.
    #[error("socket path {path} exists and is not a socket: {}", Errno::ENOTSOCK.desc())]
    NotSocket {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A live server accepted the probe connection.
    #[error("socket {path} is already in use by a running server: {}", Errno::EADDRINUSE.desc())]
    InUse {
        /// Path owned by the live server.
        path: Utf8PathBuf,
    },
    /// The probe connection failed with something other than refusal.
    #[error("failed to probe existing socket {path}: {source}")]
    Probe {
        /// Path being probed.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Unlinking a stale socket failed.
    #[error("failed to remove stale socket {path}: {source}")]
    Cleanup {
        /// Stale socket path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Allocating the socket descriptor failed.
    #[error("failed to create socket: {source}")]
    Socket {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Binding the descriptor to the path failed.
    #[error("failed to bind socket {path}: {source}")]
    Bind {
        /// Path being bound.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Entering the listening state failed.
    #[error("failed to listen on socket {path}: {source}")]
    Listen {
        /// Bound path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Switching the listener to non-blocking accepts failed.
    #[error("failed to enable non-blocking listener on {path}: {source}")]
    NonBlocking {
        /// Bound path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl ListenerError {
    /// OS error number describing the failure.
    ///
    /// Conditions detected without a failing system call report the errno a
    /// `bind(2)` would have produced: `EADDRINUSE` for a live socket and
    /// `ENOTSOCK` for a non-socket file. IO errors that carry no OS code map
    /// to `EINVAL` when they reject their input (an over-long path, say) and
    /// to `EIO` otherwise.
    #[must_use]
    pub fn raw_os_error(&self) -> i32 {
        match self {
            Self::NotSocket { .. } => Errno::ENOTSOCK as i32,
            Self::InUse { .. } => Errno::EADDRINUSE as i32,
            Self::Metadata { source, .. }
            | Self::Probe { source, .. }
            | Self::Cleanup { source, .. }
            | Self::Socket { source }
            | Self::Bind { source, .. }
            | Self::Listen { source, .. }
            | Self::NonBlocking { source, .. } => {
                source.raw_os_error().unwrap_or_else(|| fallback_errno(source))
            }
        }
    }
}

fn fallback_errno(error: &io::Error) -> i32 {
    match error.kind() {
        io::ErrorKind::InvalidInput => Errno::EINVAL as i32,
        _ => Errno::EIO as i32,
    }
}
