use std::fmt;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Termination signals that stop the server.
pub const TERMINATION_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Abstraction over shutdown notification mechanisms.
///
/// The accept loop and pending reads poll this between waits; nothing tears
/// the socket down from inside a signal handler.
pub trait ShutdownSignal: Send + Sync {
    /// Reports whether the process has been asked to stop. Once it returns
    /// `true` it keeps returning `true`.
    fn is_requested(&self) -> bool;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl ShutdownError {
    /// OS error code describing the failure.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Install { source } => source.raw_os_error(),
        }
    }
}

/// Shutdown source backed by the process's termination signals.
///
/// Handlers stay registered for as long as the value lives, so it must
/// outlive the listener it guards.
pub struct SystemShutdownSignal {
    signals: Mutex<Signals>,
    requested: AtomicBool,
}

impl SystemShutdownSignal {
    /// Registers handlers for [`TERMINATION_SIGNALS`].
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Install`] when registration fails.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals =
            Signals::new(TERMINATION_SIGNALS).map_err(|source| ShutdownError::Install { source })?;
        Ok(Self {
            signals: Mutex::new(signals),
            requested: AtomicBool::new(false),
        })
    }
}

impl fmt::Debug for SystemShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemShutdownSignal")
            .field("requested", &self.requested.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn is_requested(&self) -> bool {
        if self.requested.load(Ordering::SeqCst) {
            return true;
        }
        let Ok(mut signals) = self.signals.lock() else {
            return self.requested.load(Ordering::SeqCst);
        };
        if let Some(signal) = signals.pending().next() {
            info!(
                target: PROCESS_TARGET,
                signal,
                "shutdown signal received"
            );
            self.requested.store(true, Ordering::SeqCst);
        }
        self.requested.load(Ordering::SeqCst)
    }
}
