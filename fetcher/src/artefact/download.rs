//! Release download logic.
//!
//! Provides a trait-based abstraction over the two GET requests a fetch
//! needs (the archive and its checksum manifest), enabling dependency
//! injection for testing.

use super::naming::{DEFAULT_ORIGIN, ReleaseAsset};
use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;

/// Network timeout for release downloads. Release archives are tens of
/// megabytes, so this is generous.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Trait for downloading release files.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
///
/// # Examples
///
/// ```
/// use rclone_bin_fetcher::artefact::download::HttpDownloader;
///
/// let downloader = HttpDownloader::default();
/// assert_eq!(downloader.origin(), "https://downloads.rclone.org");
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseDownloader {
    /// Download the archive bytes for `asset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is empty.
    fn download_archive(&self, asset: &ReleaseAsset) -> Result<Vec<u8>, DownloadError>;

    /// Download the `SHA256SUMS` text for the release containing `asset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is empty.
    fn download_manifest(&self, asset: &ReleaseAsset) -> Result<String, DownloadError>;
}

/// Errors arising from release download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested file was not found (HTTP 404).
    #[error("release file not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The server answered successfully with no content.
    #[error("empty response body from {url}")]
    EmptyBody {
        /// The URL that returned no bytes.
        url: String,
    },
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    origin: String,
}

impl HttpDownloader {
    /// Create a downloader rooted at a mirror of the release origin.
    #[must_use]
    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }

    /// Return the origin URLs are built from.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::with_origin(DEFAULT_ORIGIN)
    }
}

impl ReleaseDownloader for HttpDownloader {
    fn download_archive(&self, asset: &ReleaseAsset) -> Result<Vec<u8>, DownloadError> {
        download_bytes(&asset.archive_url(&self.origin))
    }

    fn download_manifest(&self, asset: &ReleaseAsset) -> Result<String, DownloadError> {
        let url = asset.manifest_url(&self.origin);
        let bytes = download_bytes(&url)?;
        String::from_utf8(bytes).map_err(|e| DownloadError::HttpError {
            url,
            reason: format!("manifest is not UTF-8: {e}"),
        })
    }
}

/// Download a URL into memory, rejecting an empty body.
fn download_bytes(url: &str) -> Result<Vec<u8>, DownloadError> {
    log::debug!("GET {url}");
    let response = http_agent()
        .get(url)
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;
    let mut bytes = Vec::new();
    response
        .into_body()
        .as_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| DownloadError::HttpError {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
    if bytes.is_empty() {
        return Err(DownloadError::EmptyBody {
            url: url.to_owned(),
        });
    }
    log::debug!("received {} bytes from {url}", bytes.len());
    Ok(bytes)
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
