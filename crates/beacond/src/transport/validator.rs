//! Decides whether a socket path may be bound.
//!
//! A leftover socket file is only reclaimed when connecting to it is refused,
//! which is how the kernel reports a socket with no listener behind it. Live
//! sockets and non-socket files are never removed.

use std::fs;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::UnixStream;

use camino::Utf8Path;
use tracing::{debug, info};

use super::{LISTENER_TARGET, ListenerError};

/// Outcome of a successful path check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    /// Nothing exists at the path.
    Available,
    /// A socket left behind by a dead server was removed.
    StaleReclaimed,
}

/// Classifies `path` for binding, unlinking it when it is a stale socket.
///
/// # Errors
///
/// - [`ListenerError::NotSocket`] when a non-socket entry occupies the path.
/// - [`ListenerError::InUse`] when a live server accepts a probe connection.
/// - [`ListenerError::Metadata`], [`ListenerError::Probe`] and
///   [`ListenerError::Cleanup`] carry the underlying OS error unchanged.
pub fn classify_socket_path(path: &Utf8Path) -> Result<PathStatus, ListenerError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!(target: LISTENER_TARGET, path = %path, "socket path is free");
            return Ok(PathStatus::Available);
        }
        Err(source) => {
            return Err(ListenerError::Metadata {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.file_type().is_socket() {
        return Err(ListenerError::NotSocket {
            path: path.to_path_buf(),
        });
    }

    match UnixStream::connect(path) {
        Ok(_probe) => Err(ListenerError::InUse {
            path: path.to_path_buf(),
        }),
        Err(error) if error.kind() == io::ErrorKind::ConnectionRefused => {
            fs::remove_file(path).map_err(|source| ListenerError::Cleanup {
                path: path.to_path_buf(),
                source,
            })?;
            info!(
                target: LISTENER_TARGET,
                path = %path,
                "removed stale socket left by a previous server"
            );
            Ok(PathStatus::StaleReclaimed)
        }
        Err(source) => Err(ListenerError::Probe {
            path: path.to_path_buf(),
            source,
        }),
    }
}
