//! Process-level wiring: signal handling and the server run sequence.

mod errors;
mod launch;
mod shutdown;

pub use errors::LaunchError;
pub use launch::{run_server, run_server_with};
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
