//! Standalone interpreter provisioning.
//!
//! ## Module Structure
//!
//! - [`registry`] - Version to release identifier table
//! - [`platform`] - Supported build architectures
//! - [`resolver`] - Download URL construction
//! - [`paths`] - Cache and project directory layout
//! - [`download`] - Cache-aware HTTP download
//! - [`archive`] - tar.gz extraction into an install root
//! - [`process`] - External command execution
//! - [`venv`] - Virtual environment creation

pub mod archive;
pub mod download;
pub mod paths;
pub mod platform;
pub mod process;
pub mod registry;
pub mod resolver;
pub mod venv;

pub use archive::install;
pub use download::{Fetcher, HttpTransport};
pub use paths::ProjectPaths;
pub use platform::Architecture;
pub use resolver::{ResolvedRelease, resolve_with_server};
pub use venv::create_venv;
