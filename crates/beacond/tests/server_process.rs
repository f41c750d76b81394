//! Drives the `beacond` binary over its socket and through signals.

use std::fs;
use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const BUILD_ID: &str = "9.9.9+integration";
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

struct SocketDir {
    _dir: TempDir,
    path: Utf8PathBuf,
}

#[fixture]
fn socket_dir() -> SocketDir {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
    SocketDir {
        path: root.join("beacond.sock"),
        _dir: dir,
    }
}

/// Running server process, killed on drop if a test bails out early.
struct Server {
    child: Option<Child>,
    path: Utf8PathBuf,
}

impl Server {
    fn spawn(path: &Utf8PathBuf) -> Self {
        let child = Command::new(env!("CARGO_BIN_EXE_beacond"))
            .arg(path.as_str())
            .args(["--build-id", BUILD_ID, "--log-filter", "off"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn beacond");
        let server = Self {
            child: Some(child),
            path: path.clone(),
        };
        server.wait_until_listening();
        server
    }

    fn wait_until_listening(&self) {
        let deadline = Instant::now() + STARTUP_TIMEOUT;
        while Instant::now() < deadline {
            if UnixStream::connect(&self.path).is_ok() {
                return;
            }
            thread::sleep(Duration::from_millis(20));
        }
        panic!("beacond never started listening on {}", self.path);
    }

    fn signal(&self, signal: Signal) {
        let child = self.child.as_ref().expect("server running");
        let pid = i32::try_from(child.id()).expect("pid fits in i32");
        kill(Pid::from_raw(pid), signal).expect("deliver signal");
    }

    fn wait(mut self) -> ExitStatus {
        let mut child = self.child.take().expect("server running");
        let deadline = Instant::now() + STARTUP_TIMEOUT;
        loop {
            if let Some(status) = child.try_wait().expect("poll server") {
                return status;
            }
            if Instant::now() >= deadline {
                drop(child.kill());
                panic!("beacond did not exit after a termination signal");
            }
            thread::sleep(Duration::from_millis(20));
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            drop(child.kill());
            drop(child.wait());
        }
    }
}

fn exchange(path: &Utf8PathBuf, request: &[u8]) -> String {
    let mut stream = UnixStream::connect(path).expect("connect to beacond");
    stream.write_all(request).expect("write request");
    let mut reply = String::new();
    stream.read_to_string(&mut reply).expect("read reply");
    reply
}

#[rstest]
fn answers_commands_over_sequential_connections(socket_dir: SocketDir) {
    let server = Server::spawn(&socket_dir.path);

    assert_eq!(exchange(&socket_dir.path, b"PING"), "PONG");
    assert_eq!(exchange(&socket_dir.path, b"ping"), "PONG");
    assert_eq!(exchange(&socket_dir.path, b"version"), BUILD_ID);
    assert_eq!(exchange(&socket_dir.path, b"bogus"), "REJECTED");
    assert_eq!(exchange(&socket_dir.path, b"PINGX"), "REJECTED");

    server.signal(Signal::SIGTERM);
    assert!(server.wait().success());
}

#[rstest]
fn survives_client_that_sends_nothing(socket_dir: SocketDir) {
    let server = Server::spawn(&socket_dir.path);

    drop(UnixStream::connect(&socket_dir.path).expect("connect silent client"));
    assert_eq!(exchange(&socket_dir.path, b"PING"), "PONG");

    server.signal(Signal::SIGINT);
    assert!(server.wait().success());
}

#[rstest]
#[case::term(Signal::SIGTERM)]
#[case::int(Signal::SIGINT)]
#[case::quit(Signal::SIGQUIT)]
#[case::hup(Signal::SIGHUP)]
fn termination_signal_removes_socket(socket_dir: SocketDir, #[case] signal: Signal) {
    let server = Server::spawn(&socket_dir.path);

    server.signal(signal);
    let status = server.wait();
    assert_eq!(status.code(), Some(0));
    assert!(!socket_dir.path.exists(), "socket file should be removed");
}

#[rstest]
fn repeated_signal_still_exits_cleanly(socket_dir: SocketDir) {
    let server = Server::spawn(&socket_dir.path);

    server.signal(Signal::SIGTERM);
    server.signal(Signal::SIGTERM);
    let status = server.wait();
    assert_eq!(status.code(), Some(0));
    assert!(!socket_dir.path.exists(), "socket file should be removed");
}

#[rstest]
fn signal_during_silent_connection_still_cleans_up(socket_dir: SocketDir) {
    let server = Server::spawn(&socket_dir.path);

    let _silent = UnixStream::connect(&socket_dir.path).expect("connect silent client");
    thread::sleep(Duration::from_millis(100));
    server.signal(Signal::SIGTERM);
    assert!(server.wait().success());
    assert!(!socket_dir.path.exists());
}

#[rstest]
fn restarts_over_stale_socket(socket_dir: SocketDir) {
    {
        let _stale = UnixListener::bind(&socket_dir.path).expect("bind stale socket");
    }
    let server = Server::spawn(&socket_dir.path);

    assert_eq!(exchange(&socket_dir.path, b"PING"), "PONG");
    server.signal(Signal::SIGTERM);
    assert!(server.wait().success());
}

fn run_to_completion(path: &Utf8PathBuf) -> ExitStatus {
    Command::new(env!("CARGO_BIN_EXE_beacond"))
        .arg(path.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("run beacond")
}

#[rstest]
fn refuses_regular_file_with_enotsock(socket_dir: SocketDir) {
    fs::write(&socket_dir.path, b"precious").expect("write regular file");

    let status = run_to_completion(&socket_dir.path);
    assert_eq!(status.code(), Some(Errno::ENOTSOCK as i32));
    assert_eq!(fs::read(&socket_dir.path).expect("read file"), b"precious");
}

#[rstest]
fn refuses_live_socket_with_eaddrinuse(socket_dir: SocketDir) {
    let server = Server::spawn(&socket_dir.path);

    let status = run_to_completion(&socket_dir.path);
    assert_eq!(status.code(), Some(Errno::EADDRINUSE as i32));
    assert_eq!(exchange(&socket_dir.path, b"PING"), "PONG");

    server.signal(Signal::SIGTERM);
    assert!(server.wait().success());
}
