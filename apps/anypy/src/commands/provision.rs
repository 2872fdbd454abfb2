//! Interpreter download and virtual environment creation.
//!
//! ## Usage
//!
//! ```bash
//! anypy 3.12.7                       # .py-3.12.7/ and .venv/ in the current directory
//! anypy 3.11.9 -l ~/work/project     # same, under another location
//! anypy 3.10.15 -py                  # interpreter only, no virtual environment
//! anypy 3.13.0 -a aarch64            # explicit architecture
//! ```

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::toolchain::download::Transport;
use crate::toolchain::paths::cache_dir;
use crate::toolchain::resolver::dist_server;
use crate::toolchain::{
    Architecture, Fetcher, HttpTransport, ProjectPaths, ResolvedRelease, create_venv, install,
    resolve_with_server,
};

/// Arguments for provisioning an interpreter.
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// The Python version (e.g. 3.12.7).
    #[clap(id = "python_version", value_name = "VERSION")]
    pub version: String,

    /// Where to create the virtual environment (default: current directory).
    #[clap(short, long, value_name = "DIR", allow_hyphen_values = true)]
    pub location: Option<PathBuf>,

    /// Only download the Python standalone executable, no venv.
    ///
    /// Also accepted as `-py`.
    #[clap(short = 'p', long = "python-only")]
    pub python_only: bool,

    /// Target architecture: x86_64_v3, aarch64 or armv7.
    ///
    /// Defaults to the architecture of this machine.
    #[clap(short, long, value_name = "ARCH", default_value = Architecture::default_name())]
    pub arch: String,
}

/// Executes the provisioning flow.
///
/// # Process
///
/// 1. Resolve the download URL (no I/O happens before this succeeds)
/// 2. Fetch the archive through the user cache
/// 3. Extract it into `{location}/.py-{version}`
/// 4. Unless `--python-only`, create `{location}/.venv` with the new interpreter
///
/// # Errors
///
/// Returns an error if:
/// - The version or architecture is not supported
/// - The download fails
/// - Extraction fails
/// - Virtual environment creation fails
pub async fn execute(args: &ProvisionArgs) -> Result<()> {
    let release = resolve_with_server(&dist_server(), &args.version, &args.arch)?;
    let major = release.entry.major()?;
    info!(version = release.entry.version, arch = %release.arch, "provisioning interpreter");

    let location = match &args.location {
        Some(location) => location.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let paths = ProjectPaths::new(&location)?;

    let fetcher = Fetcher::new(cache_dir()?, HttpTransport::new()?);
    let interpreter = download(&fetcher, &release, &paths, major).await?;

    if args.python_only {
        println!("Run python: {}", interpreter.display());
        return Ok(());
    }

    let venv_dir = paths.venv_dir();
    println!("Creating virtual environment at {}", venv_dir.display());
    create_venv(&interpreter, &venv_dir)?;

    println!("Run python: {}", interpreter.display());
    println!(
        "Activate virtual environment: . {}",
        paths.activate_script().display()
    );

    Ok(())
}

/// Fetches and installs the interpreter for `release`, returning its path.
async fn download<T: Transport>(
    fetcher: &Fetcher<T>,
    release: &ResolvedRelease,
    paths: &ProjectPaths,
    major: u64,
) -> Result<PathBuf> {
    let version = release.entry.version;
    let install_dir = paths.install_dir(version);
    println!(
        "Downloading standalone binary for python {version} at {}",
        install_dir.display()
    );

    let work = tempfile::tempdir().context("Failed to create temporary directory")?;
    let archive = work.path().join(release.filename());
    fetcher.fetch(&release.url, &archive).await?;

    install(&archive, &install_dir, major)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AnypyError;
    use crate::toolchain::resolver::DEFAULT_DIST_SERVER;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use serial_test::serial;
    use std::cell::Cell;
    use std::path::Path;

    /// Serves a prebuilt archive and counts retrievals.
    struct ArchiveTransport {
        archive: Vec<u8>,
        calls: Cell<usize>,
    }

    impl Transport for &ArchiveTransport {
        async fn retrieve(&self, _url: &str, dest: &Path) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            std::fs::write(dest, &self.archive)?;
            Ok(())
        }
    }

    fn is_install_root(path: &Path) -> bool {
        path.join(".gitignore").is_file() && path.join("python").is_dir()
    }

    fn minimal_archive() -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let data = b"#!/bin/sh\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, "python/bin/python3", &data[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[tokio::test]
    async fn download_installs_into_versioned_directory() {
        let temp = tempfile::tempdir().unwrap();
        let transport = ArchiveTransport {
            archive: minimal_archive(),
            calls: Cell::new(0),
        };
        let fetcher = Fetcher::new(temp.path().join("cache"), &transport);
        let paths = ProjectPaths::new(&temp.path().join("project")).unwrap();
        let release = resolve_with_server(DEFAULT_DIST_SERVER, "3.12.7", "x86_64_v3").unwrap();

        let interpreter = download(&fetcher, &release, &paths, 3).await.unwrap();

        let install_dir = temp.path().join("project").join(".py-3.12.7");
        assert_eq!(interpreter, install_dir.join("python/bin/python3"));
        assert!(interpreter.is_file());
        assert!(is_install_root(&install_dir));

        download(&fetcher, &release, &paths, 3).await.unwrap();
        assert_eq!(transport.calls.get(), 1);
    }

    #[tokio::test]
    #[serial]
    async fn unknown_version_fails_before_touching_location() {
        let temp = tempfile::tempdir().unwrap();
        let location = temp.path().join("project");
        let args = ProvisionArgs {
            version: "9.9.9".to_string(),
            location: Some(location.clone()),
            python_only: true,
            arch: "x86_64_v3".to_string(),
        };

        let err = execute(&args).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AnypyError>(),
            Some(AnypyError::UnknownVersion { .. })
        ));
        assert!(!location.exists());
    }

    #[tokio::test]
    #[serial]
    async fn unsupported_architecture_fails_before_touching_location() {
        let temp = tempfile::tempdir().unwrap();
        let location = temp.path().join("project");
        let args = ProvisionArgs {
            version: "3.12.7".to_string(),
            location: Some(location.clone()),
            python_only: false,
            arch: "sparc64".to_string(),
        };

        let err = execute(&args).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AnypyError>(),
            Some(AnypyError::UnsupportedArchitecture { .. })
        ));
        assert!(!location.exists());
    }
}
