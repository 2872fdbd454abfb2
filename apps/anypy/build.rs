//! Build script for the anypy CLI.
//!
//! Provides `ANYPY_GIT_COMMIT` and `ANYPY_BUILD_TARGET` for `anypy --version`.
//! Builds outside a checkout (source tarballs, vendored copies) can set
//! `ANYPY_GIT_COMMIT` themselves; otherwise it falls back to `unknown`.

use std::path::Path;
use std::process::Command;

const COMMIT_ENV: &str = "ANYPY_GIT_COMMIT";

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let manifest_dir = Path::new(&manifest_dir);

    println!("cargo:rerun-if-env-changed={COMMIT_ENV}");
    let commit = std::env::var(COMMIT_ENV)
        .ok()
        .filter(|c| !c.trim().is_empty())
        .or_else(|| git(manifest_dir, &["rev-parse", "--short", "HEAD"]))
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env={COMMIT_ENV}={commit}");

    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=ANYPY_BUILD_TARGET={target}");

    // HEAD moves on checkout; refs move on commit.
    if let Some(git_dir) = git(manifest_dir, &["rev-parse", "--absolute-git-dir"]) {
        println!("cargo:rerun-if-changed={git_dir}/HEAD");
        println!("cargo:rerun-if-changed={git_dir}/refs/heads");
    }
}

/// Runs git in `dir` and returns its trimmed stdout, if any.
fn git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let out = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!out.is_empty()).then_some(out)
}
