//! Error types for the client runtime.

use std::io;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use nix::errno::Errno;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to connect to {path}: {source}")]
    Connect { path: Utf8PathBuf, source: io::Error },
    #[error("failed to send command: {0}")]
    Send(io::Error),
    #[error("failed to receive reply: {0}")]
    Receive(io::Error),
    #[error("failed to print reply: {0}")]
    Output(io::Error),
}

impl AppError {
    /// OS error code reported as the exit status.
    pub(crate) fn raw_os_error(&self) -> i32 {
        match self {
            Self::CliUsage(_) => Errno::EINVAL as i32,
            Self::Connect { source, .. }
            | Self::Send(source)
            | Self::Receive(source)
            | Self::Output(source) => source.raw_os_error().unwrap_or(Errno::EIO as i32),
        }
    }

    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(u8::try_from(self.raw_os_error()).unwrap_or(u8::MAX))
    }
}
