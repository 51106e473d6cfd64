//! Operating system and architecture normalisation.
//!
//! rclone publishes one archive per `<os>-<arch>` pair, spelled the way the
//! rclone release tooling spells them (`osx`, `amd64`, ...). Callers hand us
//! whatever the host or the build environment reports (`Darwin`, `x86_64`,
//! `macos`), so every raw value goes through a fixed alias table. A value
//! either maps or fails; there is no fallback guess.

use crate::error::{PlatformError, Result};
use std::fmt;
use std::str::FromStr;

/// Name of the wrapped tool, used for archive and executable names.
pub const TOOL_NAME: &str = "rclone";

/// Raw operating system spellings and their normalised value.
///
/// `macos` is what `std::env::consts::OS` reports on Apple hosts.
const OS_ALIASES: &[(&str, OperatingSystem)] = &[
    ("windows", OperatingSystem::Windows),
    ("linux", OperatingSystem::Linux),
    ("darwin", OperatingSystem::Osx),
    ("osx", OperatingSystem::Osx),
    ("macos", OperatingSystem::Osx),
];

/// Raw architecture spellings and their normalised value.
const ARCH_ALIASES: &[(&str, Architecture)] = &[
    ("x86_64", Architecture::Amd64),
    ("amd64", Architecture::Amd64),
    ("aarch64", Architecture::Arm64),
    ("arm64", Architecture::Arm64),
];

/// An operating system rclone publishes binaries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    /// Microsoft Windows.
    Windows,
    /// Linux.
    Linux,
    /// macOS, spelled `osx` in rclone release names.
    Osx,
}

impl OperatingSystem {
    /// Normalise a raw, case-insensitive operating system name.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnsupportedPlatform`] when `raw` is not a
    /// known spelling.
    ///
    /// # Examples
    ///
    /// ```
    /// use rclone_bin_common::OperatingSystem;
    ///
    /// let os = OperatingSystem::normalise("Darwin").expect("known alias");
    /// assert_eq!(os, OperatingSystem::Osx);
    /// ```
    pub fn normalise(raw: &str) -> Result<Self> {
        lookup(OS_ALIASES, raw, "operating system")
    }

    /// The spelling used in rclone release archive names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Osx => "osx",
        }
    }

    /// Whether this is the Windows target.
    #[must_use]
    pub const fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }

    /// Executable filename of the tool on this operating system.
    #[must_use]
    pub const fn binary_name(self) -> &'static str {
        if self.is_windows() {
            "rclone.exe"
        } else {
            TOOL_NAME
        }
    }
}

impl FromStr for OperatingSystem {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self> {
        Self::normalise(s)
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CPU architecture rclone publishes binaries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// 64-bit x86.
    Amd64,
    /// 64-bit ARM.
    Arm64,
}

impl Architecture {
    /// Normalise a raw, case-insensitive architecture name.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnsupportedPlatform`] when `raw` is not a
    /// known spelling.
    pub fn normalise(raw: &str) -> Result<Self> {
        lookup(ARCH_ALIASES, raw, "architecture")
    }

    /// The spelling used in rclone release archive names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

impl FromStr for Architecture {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self> {
        Self::normalise(s)
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalised `(operating system, architecture)` pair.
///
/// # Examples
///
/// ```
/// use rclone_bin_common::PlatformTarget;
///
/// let target = PlatformTarget::resolve("Linux", "X86_64").expect("supported");
/// assert_eq!(target.to_string(), "linux-amd64");
/// assert_eq!(target.binary_name(), "rclone");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformTarget {
    os: OperatingSystem,
    arch: Architecture,
}

impl PlatformTarget {
    /// Create a target from already-normalised parts.
    #[must_use]
    pub const fn new(os: OperatingSystem, arch: Architecture) -> Self {
        Self { os, arch }
    }

    /// Normalise raw operating system and architecture strings.
    ///
    /// The operating system is checked first, so an input with both halves
    /// unsupported reports the operating system.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnsupportedPlatform`] for either half.
    pub fn resolve(raw_os: &str, raw_arch: &str) -> Result<Self> {
        Ok(Self::new(
            OperatingSystem::normalise(raw_os)?,
            Architecture::normalise(raw_arch)?,
        ))
    }

    /// The operating system half.
    #[must_use]
    pub const fn os(&self) -> OperatingSystem {
        self.os
    }

    /// The architecture half.
    #[must_use]
    pub const fn arch(&self) -> Architecture {
        self.arch
    }

    /// Whether this target is Windows.
    #[must_use]
    pub const fn is_windows(&self) -> bool {
        self.os.is_windows()
    }

    /// Executable filename of the tool on this target.
    #[must_use]
    pub const fn binary_name(&self) -> &'static str {
        self.os.binary_name()
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Platform label attached to a packaged artefact.
///
/// The payload is a native executable, so the package is labelled with the
/// platform it was fetched for rather than the platform that built it. The
/// tag keeps the caller's raw spellings (lowercased), e.g. `linux_x86_64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformTag(String);

impl PlatformTag {
    /// Build a tag from raw operating system and architecture names.
    ///
    /// # Examples
    ///
    /// ```
    /// use rclone_bin_common::PlatformTag;
    ///
    /// let tag = PlatformTag::new("Linux", "X86_64");
    /// assert_eq!(tag.as_str(), "linux_x86_64");
    /// ```
    #[must_use]
    pub fn new(raw_os: &str, raw_arch: &str) -> Self {
        Self(format!(
            "{}_{}",
            raw_os.trim().to_ascii_lowercase(),
            raw_arch.trim().to_ascii_lowercase()
        ))
    }

    /// Return the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The running host's operating system, spelled as `uname -s` reports it
/// (lowercased), e.g. `darwin` rather than Rust's `macos`.
#[must_use]
pub fn host_system() -> &'static str {
    uname_spellings(std::env::consts::OS, std::env::consts::ARCH).0
}

/// The running host's CPU, spelled as the platform's own tooling reports
/// it, e.g. `arm64` on Apple silicon and `amd64` on 64-bit Windows.
#[must_use]
pub fn host_machine() -> &'static str {
    uname_spellings(std::env::consts::OS, std::env::consts::ARCH).1
}

/// Map Rust's target names onto the spellings host tooling reports.
fn uname_spellings(os: &'static str, arch: &'static str) -> (&'static str, &'static str) {
    let system = if os == "macos" { "darwin" } else { os };
    let machine = match (os, arch) {
        ("macos" | "windows", "aarch64") => "arm64",
        ("windows", "x86_64") => "amd64",
        (_, arch) => arch,
    };
    (system, machine)
}

/// Executable filename of the tool on the running host.
#[must_use]
pub const fn binary_name() -> &'static str {
    if cfg!(windows) { "rclone.exe" } else { TOOL_NAME }
}

fn lookup<T: Copy>(table: &[(&str, T)], raw: &str, component: &'static str) -> Result<T> {
    let key = raw.trim().to_ascii_lowercase();
    table
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, value)| *value)
        .ok_or_else(|| PlatformError::UnsupportedPlatform {
            component,
            value: raw.to_owned(),
            expected: table
                .iter()
                .map(|(alias, _)| *alias)
                .collect::<Vec<_>>()
                .join(", "),
        })
}
