use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use beacon_config::ServerConfig;
use beacond::{run_server, telemetry};
use tracing::error;

fn main() -> ExitCode {
    let config = match ServerConfig::load_from_iter(env::args_os()) {
        Ok(config) => config,
        Err(error) => error.exit(),
    };
    let telemetry_ready = match telemetry::initialise(&config) {
        Ok(_) => true,
        Err(error) => {
            report(&error);
            false
        }
    };
    match run_server(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(launch_error) => {
            if telemetry_ready {
                error!(
                    target: concat!(env!("CARGO_PKG_NAME"), "::process"),
                    error = %launch_error,
                    "server start-up failed"
                );
            } else {
                report(&launch_error);
            }
            launch_error.exit_code()
        }
    }
}

fn report(error: &dyn std::error::Error) {
    // Nothing useful remains to be done if stderr is gone.
    let _ = writeln!(io::stderr().lock(), "beacond: {error}");
}
