//! Per-connection request handling.

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::time::{Duration, Instant};

use beacon_config::MESSAGE_BUFFER_SIZE;
use tracing::{debug, info, warn};

use super::LISTENER_TARGET;
use crate::dispatch::{Command, CommandDispatcher};
use crate::process::ShutdownSignal;

/// Granularity at which a pending read re-checks for shutdown.
pub(crate) const READ_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handles accepted socket connections.
pub trait ConnectionHandler {
    /// Handles a single connection to completion. Implementations must not
    /// panic and must stop waiting on the client once `shutdown` reports a
    /// request.
    fn handle(&self, stream: UnixStream, shutdown: &dyn ShutdownSignal);
}

/// Result of reading a command from a client.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReadOutcome {
    /// The client sent at least one byte.
    Command(Vec<u8>),
    /// The client closed without sending anything.
    Empty,
    /// Shutdown was requested while waiting.
    Cancelled,
    /// The configured read deadline elapsed.
    TimedOut,
}

/// Reads one command, answers it through the dispatcher and closes.
#[derive(Debug, Clone)]
pub struct CommandConnectionHandler {
    dispatcher: CommandDispatcher,
    read_timeout: Option<Duration>,
}

impl CommandConnectionHandler {
    /// Builds a handler. `read_timeout` bounds how long a silent client may
    /// hold the server; `None` waits until the client writes or closes.
    #[must_use]
    pub fn new(dispatcher: CommandDispatcher, read_timeout: Option<Duration>) -> Self {
        Self {
            dispatcher,
            read_timeout,
        }
    }

    fn respond(&self, stream: &mut UnixStream, request: &[u8]) -> io::Result<()> {
        let command = String::from_utf8_lossy(command_text(request));
        let parsed = Command::parse(&command);
        info!(
            target: LISTENER_TARGET,
            command = %command,
            kind = %parsed,
            "received command"
        );
        let reply = self.dispatcher.reply(parsed);
        if let Some(timeout) = self.read_timeout {
            stream.set_write_timeout(Some(timeout))?;
        }
        stream.write_all(reply.as_bytes())?;
        stream.flush()
    }
}

impl ConnectionHandler for CommandConnectionHandler {
    fn handle(&self, mut stream: UnixStream, shutdown: &dyn ShutdownSignal) {
        let request = match read_command(&mut stream, shutdown, self.read_timeout) {
            Ok(ReadOutcome::Command(request)) => request,
            Ok(ReadOutcome::Empty) => {
                debug!(target: LISTENER_TARGET, "client closed without a command");
                return;
            }
            Ok(ReadOutcome::Cancelled) => {
                debug!(target: LISTENER_TARGET, "read abandoned for shutdown");
                return;
            }
            Ok(ReadOutcome::TimedOut) => {
                warn!(
                    target: LISTENER_TARGET,
                    timeout_ms = self.read_timeout.map_or(0, |timeout| timeout.as_millis()),
                    "client sent no command before the read deadline"
                );
                return;
            }
            Err(error) => {
                warn!(
                    target: LISTENER_TARGET,
                    error = %error,
                    "failed to read command"
                );
                return;
            }
        };

        if let Err(error) = self.respond(&mut stream, &request) {
            warn!(
                target: LISTENER_TARGET,
                error = %error,
                "failed to send reply"
            );
        }
    }
}

/// Command text ends at the first NUL byte; anything after it is ignored.
fn command_text(request: &[u8]) -> &[u8] {
    request
        .iter()
        .position(|byte| *byte == 0)
        .and_then(|end| request.get(..end))
        .unwrap_or(request)
}

/// Performs a single bounded read, waking periodically to honour shutdown
/// requests and the optional deadline.
///
/// Bytes beyond [`MESSAGE_BUFFER_SIZE`] are left unread and discarded when
/// the connection closes.
pub(crate) fn read_command(
    stream: &mut UnixStream,
    shutdown: &dyn ShutdownSignal,
    deadline: Option<Duration>,
) -> io::Result<ReadOutcome> {
    let started = Instant::now();
    let poll = deadline.map_or(READ_POLL_INTERVAL, |limit| limit.min(READ_POLL_INTERVAL));
    stream.set_read_timeout(Some(poll))?;

    let mut buffer = [0_u8; MESSAGE_BUFFER_SIZE];
    loop {
        match stream.read(&mut buffer) {
            Ok(0) => return Ok(ReadOutcome::Empty),
            Ok(read) => {
                let request = buffer.get(..read).unwrap_or(&buffer).to_vec();
                return Ok(ReadOutcome::Command(request));
            }
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) => {}
            Err(error) => return Err(error),
        }
        if shutdown.is_requested() {
            return Ok(ReadOutcome::Cancelled);
        }
        if deadline.is_some_and(|limit| started.elapsed() >= limit) {
            return Ok(ReadOutcome::TimedOut);
        }
    }
}
