//! Release registry for standalone CPython builds.
//!
//! Each supported interpreter version maps to the release identifier (a date
//! tag) under which its standalone build was published. Lookup is by exact
//! version string; there is no range matching.

use anyhow::Result;
use semver::Version;

use crate::errors::AnypyError;

/// A published interpreter version and the release that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionEntry {
    /// Interpreter version, e.g. `3.12.7`.
    pub version: &'static str,
    /// Release identifier, e.g. `20241016`.
    pub release: &'static str,
}

impl VersionEntry {
    /// Returns the major version component, used to name the interpreter binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the version is not a valid semantic version.
    pub fn major(&self) -> Result<u64> {
        let parsed = Version::parse(self.version)?;
        Ok(parsed.major)
    }
}

/// Version to release identifier, in ascending version order.
const RELEASES: &[(&str, &str)] = &[
    ("3.8.9", "20210415"),
    ("3.8.10", "20210506"),
    ("3.8.11", "20210724"),
    ("3.8.12", "20220227"),
    ("3.8.13", "20220802"),
    ("3.8.14", "20221002"),
    ("3.8.15", "20221106"),
    ("3.8.16", "20230726"),
    ("3.8.17", "20230826"),
    ("3.8.18", "20240224"),
    ("3.8.19", "20240814"),
    ("3.8.20", "20240909"),
    ("3.9.4", "20210415"),
    ("3.9.5", "20210506"),
    ("3.9.6", "20210724"),
    ("3.9.7", "20211017"),
    ("3.9.10", "20220227"),
    ("3.9.11", "20220318"),
    ("3.9.12", "20220502"),
    ("3.9.13", "20220802"),
    ("3.9.14", "20221002"),
    ("3.9.15", "20221106"),
    ("3.9.16", "20230507"),
    ("3.9.17", "20230726"),
    ("3.9.18", "20240224"),
    ("3.9.19", "20240814"),
    ("3.9.20", "20241016"),
    ("3.10.0", "20211017"),
    ("3.10.2", "20220227"),
    ("3.10.3", "20220318"),
    ("3.10.4", "20220528"),
    ("3.10.5", "20220630"),
    ("3.10.6", "20220802"),
    ("3.10.7", "20221002"),
    ("3.10.8", "20221106"),
    ("3.10.9", "20230116"),
    ("3.10.11", "20230507"),
    ("3.10.12", "20230726"),
    ("3.10.13", "20240224"),
    ("3.10.14", "20240814"),
    ("3.10.15", "20241016"),
    ("3.11.1", "20230116"),
    ("3.11.3", "20230507"),
    ("3.11.4", "20230726"),
    ("3.11.5", "20230826"),
    ("3.11.6", "20231002"),
    ("3.11.7", "20240107"),
    ("3.11.8", "20240224"),
    ("3.11.9", "20240814"),
    ("3.11.10", "20241016"),
    ("3.12.0", "20231002"),
    ("3.12.1", "20240107"),
    ("3.12.2", "20240224"),
    ("3.12.3", "20240415"),
    ("3.12.4", "20240726"),
    ("3.12.5", "20240814"),
    ("3.12.6", "20240909"),
    ("3.12.7", "20241016"),
    ("3.13.0", "20241016"),
];

/// Looks up the registry entry for an exact version string.
///
/// # Errors
///
/// Returns [`AnypyError::UnknownVersion`] if the version is not listed.
pub fn lookup(version: &str) -> Result<VersionEntry, AnypyError> {
    entries()
        .find(|entry| entry.version == version)
        .ok_or_else(|| AnypyError::unknown_version(version))
}

/// Returns all supported versions in registry order.
pub fn versions() -> impl Iterator<Item = &'static str> {
    RELEASES.iter().map(|(version, _)| *version)
}

/// Returns every registry entry.
pub fn entries() -> impl Iterator<Item = VersionEntry> {
    RELEASES
        .iter()
        .map(|&(version, release)| VersionEntry { version, release })
}
