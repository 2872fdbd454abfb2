//! Virtual environment creation.
//!
//! The freshly installed interpreter builds the environment itself through
//! its `venv` module, inheriting the interpreter's site packages.

use anyhow::Result;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;

use super::paths::write_gitignore;
use super::process::run_command;
use crate::errors::AnypyError;

/// Creates a virtual environment at `venv_dir` using `interpreter`.
///
/// Runs `{interpreter} -m venv --system-site-packages {venv_dir}` and then
/// writes the `.gitignore` marker inside the new environment. An existing
/// environment at `venv_dir` is handed to `venv` unchanged.
///
/// # Errors
///
/// Returns [`AnypyError::EnvironmentCreationFailed`] if the interpreter
/// cannot be started or exits with a non-zero status, or an error if the
/// marker cannot be written.
pub fn create_venv(interpreter: &Path, venv_dir: &Path) -> Result<PathBuf> {
    info!(
        interpreter = %interpreter.display(),
        venv = %venv_dir.display(),
        "creating virtual environment"
    );

    let args: [&OsStr; 4] = [
        OsStr::new("-m"),
        OsStr::new("venv"),
        OsStr::new("--system-site-packages"),
        venv_dir.as_os_str(),
    ];

    let output = run_command(interpreter, args).map_err(|e| {
        AnypyError::environment_creation_failed(interpreter, format!("failed to start: {e}"))
    })?;

    if !output.stdout.is_empty() {
        print!("{}", output.stdout);
    }

    if !output.success() {
        let mut message = output.status.to_string();
        let stderr = output.stderr.trim();
        if !stderr.is_empty() {
            message.push('\n');
            message.push_str(stderr);
        }
        return Err(AnypyError::environment_creation_failed(interpreter, message).into());
    }

    write_gitignore(venv_dir)?;

    Ok(venv_dir.to_path_buf())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Writes an executable shell script standing in for an interpreter.
    fn fake_interpreter(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("python3");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn create_venv_passes_venv_arguments_and_marks_directory() {
        let temp = tempfile::tempdir().unwrap();
        let interpreter = fake_interpreter(
            temp.path(),
            r#"echo "$@" > "$(dirname "$0")/args.txt"; mkdir -p "$4/bin"; touch "$4/bin/activate""#,
        );
        let venv_dir = temp.path().join(".venv");

        let created = create_venv(&interpreter, &venv_dir).unwrap();

        assert_eq!(created, venv_dir);
        let args = std::fs::read_to_string(temp.path().join("args.txt")).unwrap();
        assert_eq!(
            args.trim(),
            format!("-m venv --system-site-packages {}", venv_dir.display())
        );
        assert!(venv_dir.join("bin").join("activate").is_file());
        assert_eq!(
            std::fs::read_to_string(venv_dir.join(".gitignore")).unwrap(),
            "*"
        );
    }

    #[test]
    fn non_zero_exit_is_environment_creation_failure() {
        let temp = tempfile::tempdir().unwrap();
        let interpreter = fake_interpreter(temp.path(), "echo 'No module named venv' >&2; exit 1");

        let err = create_venv(&interpreter, &temp.path().join(".venv")).unwrap_err();

        match err.downcast_ref::<AnypyError>() {
            Some(AnypyError::EnvironmentCreationFailed { message, .. }) => {
                assert!(message.contains("No module named venv"), "{message}");
            }
            other => panic!("expected EnvironmentCreationFailed, got {other:?}"),
        }
        assert!(!temp.path().join(".venv").join(".gitignore").exists());
    }

    #[test]
    fn missing_interpreter_is_environment_creation_failure() {
        let temp = tempfile::tempdir().unwrap();
        let interpreter = temp.path().join("python").join("bin").join("python3");

        let err = create_venv(&interpreter, &temp.path().join(".venv")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AnypyError>(),
            Some(AnypyError::EnvironmentCreationFailed { .. })
        ));
    }
}
