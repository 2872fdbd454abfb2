//! Download link resolution for standalone interpreter builds.
//!
//! Resolution is pure: it validates the architecture and version against the
//! fixed tables and interpolates the artifact URL. Nothing is fetched here.
//!
//! ## URL Layout
//!
//! ```text
//! {server}/{release}/cpython-{version}+{release}-{arch}-unknown-linux-gnu-install_only.tar.gz
//! ```
//!
//! The server defaults to the public release host and can be overridden via
//! the `ANYPY_DIST_SERVER` environment variable for mirrors and testing.

use tracing::debug;

use super::platform::Architecture;
use super::registry::{self, VersionEntry};
use crate::errors::AnypyError;

/// Environment variable to override the release download base URL.
pub const DIST_SERVER_ENV: &str = "ANYPY_DIST_SERVER";

/// Default release download base URL.
pub const DEFAULT_DIST_SERVER: &str =
    "https://github.com/indygreg/python-build-standalone/releases/download";

/// A version/architecture pair resolved to its download URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelease {
    /// The registry entry for the requested version.
    pub entry: VersionEntry,
    /// The target architecture.
    pub arch: Architecture,
    /// Full download URL of the `install_only` archive.
    pub url: String,
}

impl ResolvedRelease {
    /// Extracts the artifact file name from the URL (last path segment).
    ///
    /// Example: `".../20241016/cpython-3.12.7+20241016-aarch64-unknown-linux-gnu-install_only.tar.gz"`
    /// -> `"cpython-3.12.7+20241016-aarch64-unknown-linux-gnu-install_only.tar.gz"`
    #[must_use]
    pub fn filename(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

/// Returns the configured download base URL without a trailing slash.
#[must_use]
pub fn dist_server() -> String {
    std::env::var(DIST_SERVER_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map_or_else(
            || DEFAULT_DIST_SERVER.to_string(),
            |s| s.trim().trim_end_matches('/').to_string(),
        )
}

/// Resolves `version` and `arch` to a download URL rooted at `server`.
///
/// The architecture is validated before the version is looked up.
///
/// # Errors
///
/// - [`AnypyError::UnsupportedArchitecture`] if `arch` is not allow-listed
/// - [`AnypyError::UnknownVersion`] if `version` is not in the registry
pub fn resolve_with_server(
    server: &str,
    version: &str,
    arch: &str,
) -> Result<ResolvedRelease, AnypyError> {
    let arch: Architecture = arch.parse()?;
    let entry = registry::lookup(version)?;

    let url = format!(
        "{server}/{release}/cpython-{version}+{release}-{arch}-unknown-linux-gnu-install_only.tar.gz",
        release = entry.release,
        version = entry.version,
    );
    debug!(%url, %arch, "resolved download link");

    Ok(ResolvedRelease { entry, arch, url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn resolve(version: &str, arch: &str) -> Result<ResolvedRelease, AnypyError> {
        resolve_with_server(DEFAULT_DIST_SERVER, version, arch)
    }

    #[test]
    fn resolve_builds_expected_url() {
        let release = resolve("3.12.7", "x86_64_v3").unwrap();
        assert_eq!(
            release.url,
            "https://github.com/indygreg/python-build-standalone/releases/download/20241016/\
             cpython-3.12.7+20241016-x86_64_v3-unknown-linux-gnu-install_only.tar.gz"
        );
        assert_eq!(
            release.filename(),
            "cpython-3.12.7+20241016-x86_64_v3-unknown-linux-gnu-install_only.tar.gz"
        );
        assert_eq!(release.arch, Architecture::X86_64V3);
        assert_eq!(release.entry.release, "20241016");
    }

    #[test]
    fn every_registry_version_and_arch_interpolates_cleanly() {
        for entry in registry::entries() {
            for arch in Architecture::names() {
                let release = resolve(entry.version, arch).unwrap();
                let url = &release.url;
                let filename = release.filename();

                assert_eq!(url.matches(entry.version).count(), 1, "{url}");
                assert_eq!(url.matches(arch).count(), 1, "{url}");
                assert_eq!(filename.matches(entry.release).count(), 1, "{url}");
                assert!(!url.contains('{') && !url.contains('}'), "{url}");
                assert!(filename.starts_with("cpython-"), "{url}");
                assert!(
                    filename.ends_with("-unknown-linux-gnu-install_only.tar.gz"),
                    "{url}"
                );
            }
        }
    }

    #[test]
    fn unknown_version_fails() {
        let err = resolve("9.9.9", "aarch64").unwrap_err();
        assert!(matches!(err, AnypyError::UnknownVersion { ref version } if version == "9.9.9"));
    }

    #[test]
    fn unsupported_architecture_fails() {
        let err = resolve("3.12.7", "x86_64").unwrap_err();
        assert!(matches!(err, AnypyError::UnsupportedArchitecture { ref arch, .. } if arch == "x86_64"));
    }

    #[test]
    fn architecture_is_checked_before_version() {
        let err = resolve("9.9.9", "mips").unwrap_err();
        assert!(matches!(err, AnypyError::UnsupportedArchitecture { .. }));
    }

    #[test]
    fn resolve_with_server_uses_custom_base() {
        let release = resolve_with_server("http://127.0.0.1:9000", "3.13.0", "armv7").unwrap();
        assert_eq!(
            release.url,
            "http://127.0.0.1:9000/20241016/cpython-3.13.0+20241016-armv7-unknown-linux-gnu-install_only.tar.gz"
        );
    }

    #[test]
    #[serial]
    fn dist_server_defaults_without_override() {
        // SAFETY: serialized with every other test that touches this variable.
        unsafe { std::env::remove_var(DIST_SERVER_ENV) };
        assert_eq!(dist_server(), DEFAULT_DIST_SERVER);
    }

    #[test]
    #[serial]
    fn dist_server_honours_override_and_trims_slash() {
        // SAFETY: serialized with every other test that touches this variable.
        unsafe { std::env::set_var(DIST_SERVER_ENV, "http://mirror.local/py/") };
        assert_eq!(dist_server(), "http://mirror.local/py");
        unsafe { std::env::remove_var(DIST_SERVER_ENV) };
    }
}
