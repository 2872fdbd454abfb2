//! Archive installation for standalone interpreter builds.
//!
//! `install_only` archives unpack to a single `python/` tree which is kept as
//! is: nothing is stripped, so the interpreter lands at
//! `{target}/python/bin/python{major}`.

use anyhow::Result;
use flate2::read::GzDecoder;
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::{debug, info};

use super::paths::{ensure_dir, interpreter_path, write_gitignore};
use crate::errors::AnypyError;

/// Extracts `archive_path` into `target_dir` and marks it ignored by version control.
///
/// Returns the conventional interpreter path. The path is derived from the
/// version and not checked against the extracted tree; a mismatch shows up
/// when the interpreter is first run.
///
/// # Errors
///
/// Returns an error if:
/// - `target_dir` cannot be created
/// - The archive cannot be opened, decoded or unpacked ([`AnypyError::ExtractionFailed`])
/// - The `.gitignore` marker cannot be written
pub fn install(archive_path: &Path, target_dir: &Path, major: u64) -> Result<PathBuf> {
    ensure_dir(target_dir)?;

    info!(
        archive = %archive_path.display(),
        target = %target_dir.display(),
        "extracting archive"
    );
    extract_tar_gz(archive_path, target_dir)?;

    // Written last so the marker wins over any .gitignore shipped in the archive.
    write_gitignore(target_dir)?;

    Ok(interpreter_path(target_dir, major))
}

/// Extracts a tar.gz archive into `dest_dir`, keeping its directory structure.
///
/// Hard links inside the archive are recreated as hard links within `dest_dir`.
///
/// # Errors
///
/// Returns [`AnypyError::ExtractionFailed`] if:
/// - The archive cannot be opened
/// - The archive is not a valid tar.gz file
/// - An entry has an absolute path or a parent directory reference
/// - An entry cannot be written
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let fail = |message: String, e: std::io::Error| {
        AnypyError::extraction_failed_with_source(archive_path, message, e)
    };

    std::fs::create_dir_all(dest_dir)
        .map_err(|e| fail(format!("failed to create directory {}", dest_dir.display()), e))?;

    let file = std::fs::File::open(archive_path)
        .map_err(|e| fail("failed to open archive".to_string(), e))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_preserve_permissions(true);
    archive.set_preserve_mtime(true);

    let entries = archive
        .entries()
        .map_err(|e| fail("failed to read tar entries".to_string(), e))?;

    let mut count = 0usize;
    for entry in entries {
        let mut entry = entry.map_err(|e| fail("failed to read tar entry".to_string(), e))?;

        let entry_path = entry
            .path()
            .map_err(|e| fail("failed to get entry path".to_string(), e))?
            .into_owned();

        // Reject paths that would escape dest_dir (e.g. "../../etc/passwd")
        if entry_path.is_absolute()
            || entry_path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(AnypyError::extraction_failed(
                archive_path,
                format!(
                    "refusing to extract path with parent directory or absolute reference: {}",
                    entry_path.display()
                ),
            )
            .into());
        }

        // A link from an earlier install would make hard_link fail with AlreadyExists.
        if entry.header().entry_type().is_hard_link() {
            let existing = dest_dir.join(&entry_path);
            if existing.is_file() {
                std::fs::remove_file(&existing).map_err(|e| {
                    fail(format!("failed to replace {}", existing.display()), e)
                })?;
            }
        }

        // Hard link targets resolve against dest_dir, not the working directory.
        let unpacked = entry.unpack_in(dest_dir).map_err(|e| {
            fail(
                format!("failed to extract {}", dest_dir.join(&entry_path).display()),
                e,
            )
        })?;
        if !unpacked {
            return Err(AnypyError::extraction_failed(
                archive_path,
                format!("refusing to extract {}", entry_path.display()),
            )
            .into());
        }
        count += 1;
    }

    debug!(entries = count, dest = %dest_dir.display(), "archive extracted");
    Ok(())
}
