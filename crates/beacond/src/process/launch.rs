//! Sequences server start-up, the accept loop and teardown.

use beacon_config::ServerConfig;
use camino::Utf8Path;
use tracing::{debug, info};

use crate::build_info;
use crate::dispatch::CommandDispatcher;
use crate::transport::{CommandConnectionHandler, ConnectionHandler, ListenerSocket, run_accept_loop};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Runs the server with the production collaborators until a termination
/// signal arrives.
///
/// Signal handlers are registered before the socket exists, so a signal at
/// any point after start-up still reaches the teardown path.
///
/// # Errors
///
/// Returns [`LaunchError`] when signal registration or any listener start-up
/// step fails.
pub fn run_server(config: &ServerConfig) -> Result<(), LaunchError> {
    let shutdown = SystemShutdownSignal::install()?;
    let build_id = config.build_id().unwrap_or(build_info::BUILD_ID);
    debug!(
        target: PROCESS_TARGET,
        build_id,
        git_commit = build_info::GIT_COMMIT,
        "resolved build identifier"
    );
    let handler =
        CommandConnectionHandler::new(CommandDispatcher::new(build_id), config.read_timeout());
    run_server_with(config.socket_path(), &handler, &shutdown)
}

/// Runs the server with injected collaborators.
///
/// Returns once `shutdown` reports a request; the socket file has been
/// removed by then.
///
/// # Errors
///
/// Returns [`LaunchError::Listener`] when the socket cannot be started.
pub fn run_server_with(
    path: &Utf8Path,
    handler: &dyn ConnectionHandler,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    info!(
        target: PROCESS_TARGET,
        path = %path,
        "starting server"
    );
    let mut socket = ListenerSocket::start(path)?;
    info!(target: PROCESS_TARGET, path = %socket.path(), "listening");
    run_accept_loop(&socket, handler, shutdown);
    socket.stop();
    info!(target: PROCESS_TARGET, "terminating");
    Ok(())
}
