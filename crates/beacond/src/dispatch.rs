//! Closed command table mapping request strings to replies.

use std::fmt;

/// Reply to a liveness check.
pub const PONG_REPLY: &str = "PONG";
/// Reply to any command outside the table, including the empty command.
pub const REJECTED_REPLY: &str = "REJECTED";

/// Commands understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Liveness check.
    Ping,
    /// Build identifier query.
    Version,
    /// Anything else.
    Unknown,
}

impl Command {
    /// Classifies a raw command. Matching ignores ASCII case and compares the
    /// whole string, so `pingx` is not `PING`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PING" => Self::Ping,
            "VERSION" => Self::Version,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ping => "ping",
            Self::Version => "version",
            Self::Unknown => "unknown",
        };
        formatter.write_str(name)
    }
}

/// Produces replies for received commands.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    build_id: String,
}

impl CommandDispatcher {
    /// Builds a dispatcher answering `VERSION` with `build_id`.
    #[must_use]
    pub fn new(build_id: impl Into<String>) -> Self {
        Self {
            build_id: build_id.into(),
        }
    }

    /// Returns the reply for `command`.
    #[must_use]
    pub fn dispatch(&self, command: &str) -> &str {
        self.reply(Command::parse(command))
    }

    /// Returns the reply for an already classified command.
    #[must_use]
    pub fn reply(&self, command: Command) -> &str {
        match command {
            Command::Ping => PONG_REPLY,
            Command::Version => &self.build_id,
            Command::Unknown => REJECTED_REPLY,
        }
    }
}
