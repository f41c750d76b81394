use std::ffi::OsString;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

use crate::defaults::DEFAULT_LOG_FILTER;
use crate::logging::LogFormat;

/// Command-line configuration for the `beacond` server.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "beacond",
    version,
    about = "Answers PING and VERSION requests on a UNIX domain socket"
)]
pub struct ServerConfig {
    /// Filesystem path of the listening socket.
    #[arg(value_name = "SOCKET_PATH")]
    socket_path: Utf8PathBuf,
    /// Log filter expression (for example `info` or `beacond=debug`).
    #[arg(long, value_name = "EXPR", default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,
    /// Log output format.
    #[arg(long, value_name = "FORMAT", default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
    /// Abandons a connection whose client sends nothing for this long.
    ///
    /// Unset or `0` waits indefinitely.
    #[arg(long, value_name = "MILLIS")]
    read_timeout_ms: Option<u64>,
    /// Overrides the build identifier returned for `VERSION`.
    #[arg(long, value_name = "ID")]
    build_id: Option<String>,
}

impl ServerConfig {
    /// Parses configuration from an argument iterator whose first item is the
    /// program name.
    ///
    /// # Errors
    ///
    /// Returns the `clap` error for missing or malformed arguments, and for
    /// `--help`/`--version` requests.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// Path the server binds.
    #[must_use]
    pub fn socket_path(&self) -> &Utf8Path {
        &self.socket_path
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Selected log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Per-connection read deadline, if one was configured.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
    }

    /// Build identifier override supplied on the command line.
    #[must_use]
    pub fn build_id(&self) -> Option<&str> {
        self.build_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use rstest::rstest;

    #[test]
    fn positional_socket_path_is_required() {
        let error = ServerConfig::load_from_iter(["beacond"]).expect_err("missing path");
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn defaults_apply_when_only_path_is_given() {
        let config =
            ServerConfig::load_from_iter(["beacond", "/tmp/beacon.sock"]).expect("parse config");
        assert_eq!(config.socket_path(), Utf8Path::new("/tmp/beacon.sock"));
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(config.read_timeout(), None);
        assert_eq!(config.build_id(), None);
    }

    #[test]
    fn optional_flags_are_parsed() {
        let config = ServerConfig::load_from_iter([
            "beacond",
            "--log-filter",
            "debug",
            "--log-format=json",
            "--read-timeout-ms",
            "1500",
            "--build-id",
            "abc1234",
            "/run/beacon.sock",
        ])
        .expect("parse config");
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.build_id(), Some("abc1234"));
    }

    #[rstest]
    #[case::zero("0", None)]
    #[case::positive("250", Some(Duration::from_millis(250)))]
    fn read_timeout_zero_disables_the_deadline(
        #[case] millis: &str,
        #[case] expected: Option<Duration>,
    ) {
        let config = ServerConfig::load_from_iter([
            "beacond",
            "--read-timeout-ms",
            millis,
            "/tmp/beacon.sock",
        ])
        .expect("parse config");
        assert_eq!(config.read_timeout(), expected);
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let error = ServerConfig::load_from_iter([
            "beacond",
            "--log-format",
            "pretty",
            "/tmp/beacon.sock",
        ])
        .expect_err("invalid format");
        assert_eq!(error.kind(), ErrorKind::ValueValidation);
    }
}
