//! Release version newtype.
//!
//! The version is interpolated into both the archive name and the release
//! directory of the download URL, so it must be a single non-empty path
//! segment. A leading `v` is tolerated and stripped because rclone tags
//! carry one while the archive naming adds its own.

use crate::error::{FetchError, Result};
use std::fmt;

/// Version fetched when the build environment does not override it.
pub const DEFAULT_VERSION: &str = "1.72.1";

/// A validated rclone release version, without the leading `v`.
///
/// # Examples
///
/// ```
/// use rclone_bin_fetcher::artefact::version::ReleaseVersion;
///
/// let version: ReleaseVersion = "v1.72.1".try_into().expect("valid version");
/// assert_eq!(version.as_str(), "1.72.1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseVersion(String);

impl ReleaseVersion {
    /// Return the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ReleaseVersion {
    fn default() -> Self {
        Self(DEFAULT_VERSION.to_owned())
    }
}

impl TryFrom<&str> for ReleaseVersion {
    type Error = FetchError;

    fn try_from(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let reason = if bare.is_empty() {
            Some("version is empty")
        } else if bare.chars().any(char::is_whitespace) {
            Some("version contains whitespace")
        } else if bare.contains(['/', '\\']) {
            Some("version contains a path separator")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(FetchError::InvalidVersion {
                value: value.to_owned(),
                reason: reason.to_owned(),
            }),
            None => Ok(Self(bare.to_owned())),
        }
    }
}

impl TryFrom<String> for ReleaseVersion {
    type Error = FetchError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
