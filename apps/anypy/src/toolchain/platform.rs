//! Architecture selection for standalone interpreter builds.
//!
//! The release host publishes Linux builds for a fixed set of CPU targets.
//! Names follow the release artifact naming convention.
//!
//! ## Supported Architectures
//!
//! - `x86_64_v3` - `x86_64` with AVX2 (x86-64-v3 microarchitecture level)
//! - `aarch64` - 64-bit ARM
//! - `armv7` - 32-bit ARM, hard float

use std::fmt;
use std::str::FromStr;

use crate::errors::AnypyError;

/// A CPU target with published standalone builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// `x86_64` at microarchitecture level v3
    X86_64V3,
    /// 64-bit ARM
    Aarch64,
    /// 32-bit ARMv7
    Armv7,
}

impl Architecture {
    /// Every supported architecture, in the order shown to users.
    pub const ALL: [Self; 3] = [Self::X86_64V3, Self::Aarch64, Self::Armv7];

    /// Returns the identifier used in release artifact names.
    #[must_use = "returns the architecture string without side effects"]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X86_64V3 => "x86_64_v3",
            Self::Aarch64 => "aarch64",
            Self::Armv7 => "armv7",
        }
    }

    /// Returns the identifiers of all supported architectures.
    #[must_use]
    pub fn names() -> [&'static str; 3] {
        Self::ALL.map(Self::as_str)
    }

    /// Returns the default `--arch` value for the machine this binary was built for.
    ///
    /// `x86_64` maps to `x86_64_v3`, `aarch64` to `aarch64` and `arm` to
    /// `armv7`. Any other machine name is returned unchanged so that
    /// resolution reports it as unsupported.
    #[must_use]
    pub fn default_name() -> &'static str {
        Self::from_machine(std::env::consts::ARCH).map_or(std::env::consts::ARCH, Self::as_str)
    }

    /// Maps a machine name as reported by the OS to a build target.
    #[must_use]
    pub fn from_machine(machine: &str) -> Option<Self> {
        match machine {
            "x86_64" | "amd64" => Some(Self::X86_64V3),
            "aarch64" | "arm64" => Some(Self::Aarch64),
            "arm" | "armv7" | "armv7l" => Some(Self::Armv7),
            _ => None,
        }
    }
}

impl FromStr for Architecture {
    type Err = AnypyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|arch| arch.as_str() == s)
            .ok_or_else(|| AnypyError::unsupported_architecture(s, &Self::names()))
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
