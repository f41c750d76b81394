//! Defines the error surface for server start-up and supervision.

use std::process::ExitCode;

use nix::errno::Errno;
use thiserror::Error;

use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or running the server.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Registering termination signal handlers failed.
    #[error("failed to install shutdown handling: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
    /// Socket listener startup failed.
    #[error("socket listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
}

impl LaunchError {
    /// OS error code the process reports for this failure.
    #[must_use]
    pub fn raw_os_error(&self) -> i32 {
        match self {
            Self::Shutdown { source } => source.raw_os_error().unwrap_or(Errno::EIO as i32),
            Self::Listener { source } => source.raw_os_error(),
        }
    }

    /// Process exit status carrying [`LaunchError::raw_os_error`].
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(u8::try_from(self.raw_os_error()).unwrap_or(u8::MAX))
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}
