//! Client runtime for the Beacon control socket.
//!
//! [`run`] parses `<socket-path> <command>`, sends the command to a running
//! `beacond`, and prints the reply as `Response: "<reply>"`. Failures are
//! written to the error stream and the OS error code becomes the exit
//! status, so scripts can tell a missing socket (`ENOENT`) from a server
//! that is not listening (`ECONNREFUSED`).

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

mod cli;
mod errors;
mod transport;

use cli::Cli;
use errors::AppError;

/// Runs the client using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            // `--help` and `--version` are successful requests.
            let _ = write!(stdout, "{}", error.render());
            return ExitCode::SUCCESS;
        }
        Err(error) => return report(stderr, &AppError::CliUsage(error)),
    };

    match send_command(&cli).and_then(|reply| print_reply(stdout, &reply)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(stderr, &error),
    }
}

fn send_command(cli: &Cli) -> Result<String, AppError> {
    let mut stream = transport::connect(&cli.socket_path)?;
    transport::exchange(&mut stream, &cli.command)
}

fn print_reply<W: Write>(stdout: &mut W, reply: &str) -> Result<(), AppError> {
    writeln!(stdout, "Response: \"{reply}\"")
        .and_then(|()| stdout.flush())
        .map_err(AppError::Output)
}

fn report<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    let _ = writeln!(stderr, "beacon: {error}");
    error.exit_code()
}
