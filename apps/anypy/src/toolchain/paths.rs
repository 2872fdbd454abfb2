//! Path management for anypy.
//!
//! Two roots are involved: the per-user download cache and the per-project
//! location where interpreters and environments are materialised.
//!
//! ## Directory Structure
//!
//! ```text
//! ~/.cache/anypy/             # Download cache (or ANYPY_CACHE_DIR)
//!   cpython-3.12.7+20241016-x86_64_v3-unknown-linux-gnu-install_only.tar.gz
//!
//! {location}/
//!   .py-3.12.7/               # Install root, one per version
//!     .gitignore              # "*"
//!     python/bin/python3      # Interpreter, by convention
//!   .venv/                    # Virtual environment
//!     .gitignore              # "*"
//!     bin/activate
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable to override the download cache directory.
pub const CACHE_DIR_ENV: &str = "ANYPY_CACHE_DIR";

/// Name of the version-control exclusion marker.
pub const GITIGNORE_FILE: &str = ".gitignore";

/// Content of the exclusion marker: ignore everything below it.
pub const GITIGNORE_CONTENT: &str = "*";

/// Name of the virtual environment directory under a location.
pub const VENV_DIR: &str = ".venv";

/// Resolves the download cache directory.
///
/// The directory is determined by:
/// 1. The `ANYPY_CACHE_DIR` environment variable if set
/// 2. `~/.cache/anypy` in the user's home directory
///
/// The directory is not created here; see [`ensure_dir`].
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn cache_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CACHE_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    Ok(dirs::home_dir()
        .context("Cannot determine home directory. Set ANYPY_CACHE_DIR environment variable.")?
        .join(".cache")
        .join("anypy"))
}

/// Layout of everything anypy creates under a single location.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    /// Base directory for installs and the virtual environment.
    pub location: PathBuf,
}

impl ProjectPaths {
    /// Creates the layout for `location`, made absolute against the current
    /// directory so printed paths can be copied verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn new(location: &Path) -> Result<Self> {
        let location = std::path::absolute(location)
            .with_context(|| format!("Failed to resolve location: {}", location.display()))?;
        Ok(Self { location })
    }

    /// Returns the install root for a version (`{location}/.py-{version}`).
    #[must_use = "returns the path without side effects"]
    pub fn install_dir(&self, version: &str) -> PathBuf {
        self.location.join(format!(".py-{version}"))
    }

    /// Returns the virtual environment root (`{location}/.venv`).
    #[must_use = "returns the path without side effects"]
    pub fn venv_dir(&self) -> PathBuf {
        self.location.join(VENV_DIR)
    }

    /// Returns the activation script of the virtual environment.
    #[must_use = "returns the path without side effects"]
    pub fn activate_script(&self) -> PathBuf {
        self.venv_dir().join("bin").join("activate")
    }
}

/// Returns the conventional interpreter path inside an install root.
#[must_use]
pub fn interpreter_path(install_dir: &Path, major: u64) -> PathBuf {
    install_dir
        .join("python")
        .join("bin")
        .join(format!("python{major}"))
}

/// Creates a directory and its parents if missing.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

/// Writes the `.gitignore` marker that excludes `dir` from version control.
///
/// # Errors
///
/// Returns an error if the marker cannot be written.
pub fn write_gitignore(dir: &Path) -> Result<()> {
    let marker = dir.join(GITIGNORE_FILE);
    std::fs::write(&marker, GITIGNORE_CONTENT)
        .with_context(|| format!("Failed to write {}", marker.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn project_paths_follow_layout() {
        let paths = ProjectPaths::new(Path::new("/work/project")).unwrap();
        assert_eq!(
            paths.install_dir("3.12.7"),
            PathBuf::from("/work/project/.py-3.12.7")
        );
        assert_eq!(paths.venv_dir(), PathBuf::from("/work/project/.venv"));
        assert_eq!(
            paths.activate_script(),
            PathBuf::from("/work/project/.venv/bin/activate")
        );
    }

    #[test]
    fn project_paths_make_relative_location_absolute() {
        let paths = ProjectPaths::new(Path::new("some/dir")).unwrap();
        assert!(paths.location.is_absolute());
        assert!(paths.location.ends_with("some/dir"));
    }

    #[test]
    fn interpreter_path_uses_major_version() {
        assert_eq!(
            interpreter_path(Path::new("/p/.py-3.9.4"), 3),
            PathBuf::from("/p/.py-3.9.4/python/bin/python3")
        );
    }

    #[test]
    fn write_gitignore_writes_star() {
        let temp = tempfile::tempdir().unwrap();
        write_gitignore(temp.path()).unwrap();
        let content = std::fs::read_to_string(temp.path().join(".gitignore")).unwrap();
        assert_eq!(content, "*");
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    #[serial]
    fn cache_dir_honours_override() {
        // SAFETY: serialized with every other test that touches this variable.
        unsafe { std::env::set_var(CACHE_DIR_ENV, "/tmp/anypy-cache-test") };
        assert_eq!(cache_dir().unwrap(), PathBuf::from("/tmp/anypy-cache-test"));
        unsafe { std::env::remove_var(CACHE_DIR_ENV) };
    }

    #[test]
    #[serial]
    fn cache_dir_defaults_under_home() {
        // SAFETY: serialized with every other test that touches this variable.
        unsafe { std::env::remove_var(CACHE_DIR_ENV) };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(cache_dir().unwrap(), home.join(".cache").join("anypy"));
        }
    }
}
