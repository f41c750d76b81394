//! Build script: embed the build identifier answered for `VERSION`.

use std::env;
use std::path::Path;
use std::process::Command;

const UNKNOWN_COMMIT: &str = "unknown";

fn git_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let commit = String::from_utf8(output.stdout).ok()?;
    let trimmed = commit.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");
    // Cargo reruns the script on every build when a watched path is missing.
    for watched in ["../../.git/HEAD", "../../.git/refs"] {
        if Path::new(watched).exists() {
            println!("cargo:rerun-if-changed={watched}");
        }
    }

    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".into());
    let commit = git_commit().unwrap_or_else(|| UNKNOWN_COMMIT.into());
    println!("cargo:rustc-env=BEACON_GIT_COMMIT={commit}");
    println!("cargo:rustc-env=BEACON_BUILD_ID={version}+{commit}");
}
