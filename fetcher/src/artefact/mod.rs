//! Release artefact naming, download, verification and extraction.
//!
//! # Sub-modules
//!
//! - [`download`] - Release download trait and HTTP implementation.
//! - [`extraction`] - Binary selection and atomic write from the zip archive.
//! - [`manifest`] - `SHA256SUMS` parsing (`ChecksumManifest`).
//! - [`naming`] - Archive and URL naming policy (`ReleaseAsset`).
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`verification`] - Digest computation and comparison.
//! - [`version`] - Release version newtype (`ReleaseVersion`).

pub mod download;
pub mod extraction;
pub mod manifest;
pub mod naming;
pub mod sha256_digest;
pub mod verification;
pub mod version;
