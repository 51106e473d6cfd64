//! Error types for the rclone release fetcher.
//!
//! Every variant carries the context needed to act on it: the URL that
//! failed, the filename that was missing from the manifest, or the expected
//! and actual digests. None of these failures are retried internally.

use crate::artefact::download::DownloadError;
use crate::artefact::extraction::ExtractionError;
use crate::artefact::verification::IntegrityError;
use camino::Utf8PathBuf;
use rclone_bin_common::PlatformError;
use thiserror::Error;

/// Errors that can occur while fetching the rclone binary.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The requested operating system or architecture is not published.
    #[error(transparent)]
    UnsupportedPlatform(#[from] PlatformError),

    /// The release version string cannot be used in a release URL.
    #[error("invalid release version \"{value}\": {reason}")]
    InvalidVersion {
        /// The rejected version string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// The release archive could not be downloaded.
    #[error("archive download failed: {0}")]
    Download(#[from] DownloadError),

    /// The checksum manifest has no entry for the archive.
    #[error("{filename} not found in SHA256SUMS")]
    ManifestEntryMissing {
        /// The archive filename that was looked up.
        filename: String,
    },

    /// The archive failed integrity verification and was discarded.
    #[error("integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),

    /// The verified archive does not contain the expected executable.
    #[error("{binary} not found in archive {archive}")]
    BinaryNotFoundInArchive {
        /// The executable filename that was searched for.
        binary: String,
        /// The archive filename.
        archive: String,
    },

    /// The verified archive is not a readable zip container.
    #[error("cannot read archive {archive}: {reason}")]
    Archive {
        /// The archive filename.
        archive: String,
        /// Description of the container error.
        reason: String,
    },

    /// A filesystem operation on the output path failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being created, removed or written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Attach the archive filename to an extraction failure.
    #[must_use]
    pub fn from_extraction(err: ExtractionError, archive: &str) -> Self {
        match err {
            ExtractionError::BinaryNotFound { binary } => Self::BinaryNotFoundInArchive {
                binary,
                archive: archive.to_owned(),
            },
            ExtractionError::Archive(source) => Self::Archive {
                archive: archive.to_owned(),
                reason: source.to_string(),
            },
            ExtractionError::Io { path, source } => Self::Io { path, source },
        }
    }
}

/// Result type alias using [`FetchError`].
pub type Result<T> = std::result::Result<T, FetchError>;
