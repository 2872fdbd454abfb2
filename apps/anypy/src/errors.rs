//! Error types for the anypy CLI.
//!
//! `AnypyError` names every stage that can fail while provisioning an
//! interpreter. Operations return `anyhow::Result` and wrap these variants so
//! callers can still `downcast_ref` to the specific failure.

use std::path::PathBuf;
use thiserror::Error;

/// Consolidated error type for anypy operations.
///
/// All variants are fatal to the invocation. Each one carries the input that
/// failed (version, architecture, URL or path) so the message identifies both
/// the stage and the culprit.
#[derive(Debug, Error)]
pub enum AnypyError {
    /// The requested version has no entry in the release registry.
    #[error("unknown Python version: {version} (run with --help to list supported versions)")]
    UnknownVersion {
        /// The version that was requested.
        version: String,
    },

    /// The requested architecture is not one of the published build targets.
    #[error("unsupported architecture: {arch} (expected one of: {supported})")]
    UnsupportedArchitecture {
        /// The architecture that was requested.
        arch: String,
        /// Comma-separated list of accepted architectures.
        supported: String,
    },

    /// Retrieving the interpreter archive failed.
    #[error("download failed: {url}: {message}")]
    DownloadFailed {
        /// The URL being fetched.
        url: String,
        /// What went wrong.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The archive could not be decoded or unpacked.
    #[error("extraction failed: {}: {message}", .archive.display())]
    ExtractionFailed {
        /// The archive being extracted.
        archive: PathBuf,
        /// What went wrong.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The interpreter could not create the virtual environment.
    #[error("environment creation failed with {}: {message}", .interpreter.display())]
    EnvironmentCreationFailed {
        /// The interpreter that was invoked.
        interpreter: PathBuf,
        /// Exit status or spawn failure, followed by captured stderr.
        message: String,
    },

    /// Filesystem error outside the named stages.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the operation that failed.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl AnypyError {
    /// Creates a new `UnknownVersion` error.
    #[must_use]
    pub fn unknown_version(version: impl Into<String>) -> Self {
        Self::UnknownVersion {
            version: version.into(),
        }
    }

    /// Creates a new `UnsupportedArchitecture` error.
    #[must_use]
    pub fn unsupported_architecture(arch: impl Into<String>, supported: &[&str]) -> Self {
        Self::UnsupportedArchitecture {
            arch: arch.into(),
            supported: supported.join(", "),
        }
    }

    /// Creates a new `DownloadFailed` error.
    #[must_use]
    pub fn download_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            url: url.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `DownloadFailed` error with a source error.
    #[must_use]
    pub fn download_failed_with_source(
        url: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::DownloadFailed {
            url: url.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a new `ExtractionFailed` error.
    #[must_use]
    pub fn extraction_failed(archive: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            archive: archive.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `ExtractionFailed` error with a source error.
    #[must_use]
    pub fn extraction_failed_with_source(
        archive: impl Into<PathBuf>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ExtractionFailed {
            archive: archive.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a new `EnvironmentCreationFailed` error.
    #[must_use]
    pub fn environment_creation_failed(
        interpreter: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::EnvironmentCreationFailed {
            interpreter: interpreter.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Io` error from an I/O error with context.
    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }
}
