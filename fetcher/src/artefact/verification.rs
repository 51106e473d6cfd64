//! Archive integrity verification.
//!
//! A downloaded archive is only handed to extraction once its SHA-256 digest
//! matches the entry published for its exact filename in `SHA256SUMS`. Every
//! failure on this path is an integrity failure: the bytes are dropped and
//! nothing reaches the filesystem.

use super::download::DownloadError;
use super::manifest::ChecksumManifest;
use super::sha256_digest::Sha256Digest;
use crate::error::{FetchError, Result};
use sha2::{Digest, Sha256};

/// Reasons a downloaded archive was rejected.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    /// The computed digest differs from the published one.
    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The archive filename.
        filename: String,
        /// The digest published in the manifest.
        expected: String,
        /// The digest of the downloaded bytes.
        actual: String,
    },

    /// The manifest could not be fetched.
    #[error("checksum manifest unavailable: {0}")]
    ManifestUnavailable(#[source] DownloadError),

    /// The manifest entry for the archive is not a SHA-256 digest.
    #[error("malformed checksum for {filename}: {reason}")]
    MalformedDigest {
        /// The archive filename.
        filename: String,
        /// Description of the validation failure.
        reason: String,
    },
}

/// Compute the SHA-256 digest of an in-memory buffer.
///
/// # Examples
///
/// ```
/// use rclone_bin_fetcher::artefact::verification::compute_sha256;
///
/// let digest = compute_sha256(b"");
/// assert_eq!(
///     digest.as_str(),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn compute_sha256(bytes: &[u8]) -> Sha256Digest {
    Sha256Digest::from_bytes(&Sha256::digest(bytes))
}

/// Verify `archive` against the manifest entry for `filename`.
///
/// Returns the verified digest on success.
///
/// # Errors
///
/// Returns [`FetchError::ManifestEntryMissing`] when no line names
/// `filename` exactly, and [`FetchError::Integrity`] when the published
/// digest is malformed or does not match.
pub fn verify_archive(archive: &[u8], manifest_text: &str, filename: &str) -> Result<Sha256Digest> {
    let manifest = ChecksumManifest::parse(manifest_text);
    let entry = manifest
        .lookup(filename)
        .ok_or_else(|| FetchError::ManifestEntryMissing {
            filename: filename.to_owned(),
        })?;

    let expected =
        Sha256Digest::parse(&entry.digest).map_err(|reason| IntegrityError::MalformedDigest {
            filename: filename.to_owned(),
            reason,
        })?;
    let actual = compute_sha256(archive);

    if actual != expected {
        return Err(IntegrityError::ChecksumMismatch {
            filename: filename.to_owned(),
            expected: entry.digest.clone(),
            actual: actual.into_inner(),
        }
        .into());
    }
    Ok(actual)
}
