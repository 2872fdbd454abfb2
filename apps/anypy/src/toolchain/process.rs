//! External command execution.
//!
//! A thin wrapper over [`std::process::Command`] that runs a program to
//! completion and captures its output. Arguments are passed as an argv
//! vector; no shell is involved.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

/// Exit status and captured output of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// How the process exited.
    pub status: ExitStatus,
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns whether the process exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Runs `program` with `args` and waits for it to exit.
///
/// Standard input is inherited; standard output and error are captured.
///
/// # Errors
///
/// Returns an error if the process cannot be spawned (missing or
/// non-executable program). A non-zero exit is not an error here; inspect
/// [`CommandOutput::status`].
pub fn run_command<I, S>(program: &Path, args: I) -> std::io::Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    debug!(command = ?cmd, "running external command");

    let output = cmd
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    debug!(status = %output.status, "external command finished");

    Ok(CommandOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
