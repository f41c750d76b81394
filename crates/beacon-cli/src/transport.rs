//! Socket transport for the client: connect, send one command, collect the
//! reply the server sends before closing.

use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream;
use std::time::Duration;

use beacon_config::MESSAGE_BUFFER_SIZE;
use camino::Utf8Path;
use socket2::{Domain, SockAddr, Socket, Type};

use super::AppError;

pub(super) const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

pub(super) fn connect(path: &Utf8Path) -> Result<UnixStream, AppError> {
    connect_with_timeout(path, CONNECTION_TIMEOUT)
}

pub(super) fn connect_with_timeout(
    path: &Utf8Path,
    timeout: Duration,
) -> Result<UnixStream, AppError> {
    connect_unix(path, timeout).map_err(|source| AppError::Connect {
        path: path.to_path_buf(),
        source,
    })
}

/// Connects in blocking mode so a server with a full backlog is waited for.
/// The kernel bounds that wait by the send timeout and reports `EAGAIN` when
/// it expires.
fn connect_unix(path: &Utf8Path, timeout: Duration) -> io::Result<UnixStream> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path)?;
    socket.set_write_timeout(Some(timeout))?;
    socket.connect(&address)?;
    socket.set_write_timeout(None)?;
    Ok(UnixStream::from(OwnedFd::from(socket)))
}

/// Sends `command` and reads the reply until the server closes.
///
/// The write half is shut after sending so the server sees an empty command
/// as end-of-stream instead of waiting. Replies longer than
/// [`MESSAGE_BUFFER_SIZE`] are truncated.
pub(super) fn exchange(stream: &mut UnixStream, command: &str) -> Result<String, AppError> {
    stream
        .write_all(command.as_bytes())
        .and_then(|()| stream.flush())
        .map_err(AppError::Send)?;
    if let Err(error) = stream.shutdown(Shutdown::Write)
        && error.kind() != io::ErrorKind::NotConnected
    {
        return Err(AppError::Send(error));
    }

    let reply = read_reply(stream).map_err(AppError::Receive)?;
    Ok(String::from_utf8_lossy(&reply).into_owned())
}

fn read_reply(stream: &mut UnixStream) -> io::Result<Vec<u8>> {
    let mut buffer = [0_u8; MESSAGE_BUFFER_SIZE];
    let mut filled = 0;
    while let Some(spare) = buffer.get_mut(filled..).filter(|spare| !spare.is_empty()) {
        match stream.read(spare) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            // A server closing with our bytes unread resets the connection
            // once its reply has been drained.
            Err(error) if error.kind() == io::ErrorKind::ConnectionReset && filled > 0 => break,
            Err(error) => return Err(error),
        }
    }
    Ok(buffer.get(..filled).unwrap_or_default().to_vec())
}
