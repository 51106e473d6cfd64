//! Release naming policy for rclone archives.
//!
//! rclone publishes every release under `<origin>/v<version>/` with one zip
//! per platform named `rclone-v<version>-<os>-<arch>.zip` and a plaintext
//! `SHA256SUMS` listing alongside them.

use super::version::ReleaseVersion;
use rclone_bin_common::{PlatformTarget, TOOL_NAME};
use std::fmt;

/// Distribution origin for official rclone releases.
pub const DEFAULT_ORIGIN: &str = "https://downloads.rclone.org";

/// Filename of the checksum manifest in each release directory.
pub const MANIFEST_FILENAME: &str = "SHA256SUMS";

/// The fixed file extension for release archives.
const ARCHIVE_EXTENSION: &str = ".zip";

/// A release archive for one version and platform.
///
/// # Examples
///
/// ```
/// use rclone_bin_common::PlatformTarget;
/// use rclone_bin_fetcher::artefact::naming::{DEFAULT_ORIGIN, ReleaseAsset};
/// use rclone_bin_fetcher::artefact::version::ReleaseVersion;
///
/// let version: ReleaseVersion = "1.72.1".try_into().expect("valid version");
/// let target = PlatformTarget::resolve("linux", "x86_64").expect("supported");
/// let asset = ReleaseAsset::new(version, target);
///
/// assert_eq!(asset.filename(), "rclone-v1.72.1-linux-amd64.zip");
/// assert_eq!(
///     asset.archive_url(DEFAULT_ORIGIN),
///     "https://downloads.rclone.org/v1.72.1/rclone-v1.72.1-linux-amd64.zip"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    version: ReleaseVersion,
    target: PlatformTarget,
}

impl ReleaseAsset {
    /// Create a release asset from validated components.
    #[must_use]
    pub const fn new(version: ReleaseVersion, target: PlatformTarget) -> Self {
        Self { version, target }
    }

    /// Return the version component.
    #[must_use]
    pub const fn version(&self) -> &ReleaseVersion {
        &self.version
    }

    /// Return the platform component.
    #[must_use]
    pub const fn target(&self) -> &PlatformTarget {
        &self.target
    }

    /// Return the archive filename.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }

    /// Return the executable name expected inside the archive.
    #[must_use]
    pub const fn binary_name(&self) -> &'static str {
        self.target.binary_name()
    }

    /// Return the release directory URL under `origin`, without a trailing
    /// slash.
    #[must_use]
    pub fn release_root(&self, origin: &str) -> String {
        format!("{}/v{}", origin.trim_end_matches('/'), self.version)
    }

    /// Return the archive download URL under `origin`.
    #[must_use]
    pub fn archive_url(&self, origin: &str) -> String {
        format!("{}/{self}", self.release_root(origin))
    }

    /// Return the checksum manifest URL under `origin`.
    #[must_use]
    pub fn manifest_url(&self, origin: &str) -> String {
        format!("{}/{MANIFEST_FILENAME}", self.release_root(origin))
    }
}

impl fmt::Display for ReleaseAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{TOOL_NAME}-v{}-{}-{}{ARCHIVE_EXTENSION}",
            self.version,
            self.target.os(),
            self.target.arch()
        )
    }
}
