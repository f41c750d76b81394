//! Listening socket lifecycle and the sequential accept loop.

use std::fs;
use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::net::{UnixListener, UnixStream};
use std::thread;
use std::time::Duration;

use beacon_config::LISTEN_BACKLOG;
use camino::{Utf8Path, Utf8PathBuf};
use socket2::{Domain, SockAddr, Socket, Type};
use tracing::{debug, info, warn};

use super::validator::{PathStatus, classify_socket_path};
use super::{ConnectionHandler, LISTENER_TARGET, ListenerError};
use crate::process::ShutdownSignal;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Source of accepted client connections polled by [`run_accept_loop`].
pub trait ConnectionSource {
    /// Accepts one pending connection without blocking.
    ///
    /// # Errors
    ///
    /// Propagates `accept(2)` failures other than `EWOULDBLOCK`.
    fn accept(&self) -> io::Result<Option<UnixStream>>;
}

/// The server's bound and listening UNIX socket.
///
/// Owns both the descriptor and the filesystem entry. [`ListenerSocket::stop`]
/// releases them; it runs at most once and is repeated by `Drop`, so every
/// exit path leaves no socket file behind.
#[derive(Debug)]
pub struct ListenerSocket {
    path: Utf8PathBuf,
    listener: Option<UnixListener>,
    reclaimed: bool,
}

impl ListenerSocket {
    /// Validates `path`, then creates, binds and listens on a socket there.
    ///
    /// The returned listener is non-blocking so the accept loop can observe
    /// shutdown requests between polls.
    ///
    /// # Errors
    ///
    /// Returns the first failing step as a [`ListenerError`] carrying the OS
    /// error unchanged. Nothing is retried.
    pub fn start(path: &Utf8Path) -> Result<Self, ListenerError> {
        let status = classify_socket_path(path)?;
        let socket = Socket::new(Domain::UNIX, Type::STREAM, None)
            .map_err(|source| ListenerError::Socket { source })?;
        let address = SockAddr::unix(path).map_err(|source| ListenerError::Bind {
            path: path.to_path_buf(),
            source,
        })?;
        socket
            .bind(&address)
            .map_err(|source| ListenerError::Bind {
                path: path.to_path_buf(),
                source,
            })?;

        // The entry now exists on disk and belongs to this process.
        let listener = match listen(socket, path) {
            Ok(listener) => listener,
            Err(error) => {
                remove_socket_file(path);
                return Err(error);
            }
        };
        let reclaimed = status == PathStatus::StaleReclaimed;
        info!(
            target: LISTENER_TARGET,
            path = %path,
            backlog = LISTEN_BACKLOG,
            reclaimed,
            "socket listener active"
        );
        Ok(Self {
            path: path.to_path_buf(),
            listener: Some(listener),
            reclaimed,
        })
    }

    /// Filesystem path of the socket.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Whether a stale socket was removed before binding.
    #[must_use]
    pub const fn reclaimed_stale_socket(&self) -> bool {
        self.reclaimed
    }

    /// Whether [`ListenerSocket::stop`] has already run.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.listener.is_none()
    }

    /// Closes the descriptor and unlinks the socket path.
    ///
    /// Safe to call repeatedly and safe when the file was already removed by
    /// someone else.
    pub fn stop(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        drop(listener);
        remove_socket_file(&self.path);
        info!(target: LISTENER_TARGET, path = %self.path, "socket listener stopped");
    }
}

impl ConnectionSource for ListenerSocket {
    /// Returns `Ok(None)` when no client is waiting or the socket has been
    /// stopped. The returned stream is blocking.
    fn accept(&self) -> io::Result<Option<UnixStream>> {
        let Some(listener) = self.listener.as_ref() else {
            return Ok(None);
        };
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false)?;
                Ok(Some(stream))
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }
}

impl Drop for ListenerSocket {
    fn drop(&mut self) {
        self.stop();
    }
}

fn listen(socket: Socket, path: &Utf8Path) -> Result<UnixListener, ListenerError> {
    socket
        .listen(LISTEN_BACKLOG)
        .map_err(|source| ListenerError::Listen {
            path: path.to_path_buf(),
            source,
        })?;
    let listener = UnixListener::from(OwnedFd::from(socket));
    listener
        .set_nonblocking(true)
        .map_err(|source| ListenerError::NonBlocking {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(listener)
}

fn remove_socket_file(path: &Utf8Path) {
    if let Err(error) = fs::remove_file(path)
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: LISTENER_TARGET,
            error = %error,
            path = %path,
            "failed to remove unix socket file"
        );
    }
}

/// Serves connections one at a time until `shutdown` reports a request.
///
/// Accept failures are logged (once per consecutive error kind) and never end
/// the loop. Each accepted connection is handled to completion before the
/// next accept.
pub fn run_accept_loop(
    source: &dyn ConnectionSource,
    handler: &dyn ConnectionHandler,
    shutdown: &dyn ShutdownSignal,
) {
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.is_requested() {
        match source.accept() {
            Ok(Some(stream)) => {
                last_error = None;
                debug!(target: LISTENER_TARGET, "connection accepted");
                handler.handle(stream, shutdown);
            }
            Ok(None) => thread::sleep(ACCEPT_BACKOFF),
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
}
