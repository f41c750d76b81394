use camino::Utf8PathBuf;
use clap::Parser;

/// Sends one command to a running `beacond` and prints its reply.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "beacon", version)]
pub(crate) struct Cli {
    /// Filesystem path of the server socket.
    #[arg(value_name = "SOCKET_PATH")]
    pub(crate) socket_path: Utf8PathBuf,
    /// Command to send, for example `PING` or `VERSION`.
    #[arg(value_name = "COMMAND", allow_hyphen_values = true)]
    pub(crate) command: String,
}
