//! rclone binary fetch orchestrator.
//!
//! Runs the packaging-time pipeline: resolve the platform, download the
//! release archive and its `SHA256SUMS`, verify the digest, and only then
//! unpack the executable into the output directory. Platform and version
//! validation happen before any network access, and a failed verification
//! leaves the output directory untouched.

use camino::{Utf8Path, Utf8PathBuf};
use rclone_bin_common::{PlatformTag, PlatformTarget};
use std::io::Write;

use crate::artefact::download::{HttpDownloader, ReleaseDownloader};
use crate::artefact::extraction::{BinaryExtractor, ZipExtractor};
use crate::artefact::naming::ReleaseAsset;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::artefact::verification::{IntegrityError, verify_archive};
use crate::artefact::version::ReleaseVersion;
use crate::error::{FetchError, Result};
use crate::output::write_stderr_line;

/// Configuration for a fetch.
#[derive(Debug)]
pub struct FetchConfig<'a> {
    /// Raw operating system name (e.g. `Linux`, `darwin`, `macos`).
    pub raw_os: &'a str,
    /// Raw architecture name (e.g. `x86_64`, `AMD64`, `aarch64`).
    pub raw_arch: &'a str,
    /// rclone release version, with or without a leading `v`.
    pub version: &'a str,
    /// Directory the executable is written to; created if absent.
    pub output_dir: &'a Utf8Path,
    /// Base URL of the release origin.
    pub origin: &'a str,
    /// When true, an executable already at the output path is kept and no
    /// download happens.
    pub skip_existing: bool,
    /// When true, suppress progress output.
    pub quiet: bool,
}

/// The outcome of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Path of the executable.
    pub binary_path: Utf8PathBuf,
    /// The normalised platform the executable was fetched for.
    pub target: PlatformTarget,
    /// Platform label for the packaged artefact.
    pub platform_tag: PlatformTag,
    /// Digest of the verified archive; `None` when the fetch was skipped.
    pub digest: Option<Sha256Digest>,
    /// Whether an existing executable was kept instead of downloading.
    pub skipped: bool,
}

/// Fetch the executable using production HTTP and zip implementations.
///
/// # Errors
///
/// Returns the first [`FetchError`] encountered; nothing is retried.
pub fn fetch_binary(config: &FetchConfig<'_>, stderr: &mut dyn Write) -> Result<FetchReport> {
    let downloader = HttpDownloader::with_origin(config.origin);
    fetch_binary_with(config, &downloader, &ZipExtractor, stderr)
}

/// Testable inner function with injected dependencies.
///
/// The production entry point [`fetch_binary`] delegates here with real
/// implementations; tests inject mocks.
///
/// # Errors
///
/// Returns the first [`FetchError`] encountered; nothing is retried.
pub fn fetch_binary_with(
    config: &FetchConfig<'_>,
    downloader: &dyn ReleaseDownloader,
    extractor: &dyn BinaryExtractor,
    stderr: &mut dyn Write,
) -> Result<FetchReport> {
    // Step 1: Validate inputs before touching the network or disk.
    let target = PlatformTarget::resolve(config.raw_os, config.raw_arch)?;
    let version = ReleaseVersion::try_from(config.version)?;
    let asset = ReleaseAsset::new(version, target);
    log::debug!("fetching rclone {} for {}", asset.version(), asset.target());
    let filename = asset.filename();
    let platform_tag = PlatformTag::new(config.raw_os, config.raw_arch);

    std::fs::create_dir_all(config.output_dir).map_err(|source| FetchError::Io {
        path: config.output_dir.to_owned(),
        source,
    })?;

    let binary_path = config.output_dir.join(asset.binary_name());
    if config.skip_existing && binary_path.is_file() {
        log::info!("keeping existing {binary_path}");
        return Ok(FetchReport {
            binary_path,
            target,
            platform_tag,
            digest: None,
            skipped: true,
        });
    }

    // Step 2: Download the archive.
    if !config.quiet {
        write_stderr_line(stderr, format!("Downloading {filename}..."));
    }
    let archive = downloader.download_archive(&asset)?;

    // Step 3: Download the manifest and verify the archive against it.
    let manifest = downloader
        .download_manifest(&asset)
        .map_err(IntegrityError::ManifestUnavailable)?;
    let digest = verify_archive(&archive, &manifest, &filename)?;
    log::info!("verified {filename} (sha256 {digest})");
    if !config.quiet {
        write_stderr_line(stderr, "Download verified successfully.");
    }

    // Step 4: Unpack the executable.
    let binary_path = extractor
        .extract(
            &archive,
            asset.binary_name(),
            config.output_dir,
            !target.is_windows(),
        )
        .map_err(|e| FetchError::from_extraction(e, &filename))?;
    if !config.quiet {
        write_stderr_line(stderr, format!("Unpacked rclone to {binary_path}"));
    }

    Ok(FetchReport {
        binary_path,
        target,
        platform_tag,
        digest: Some(digest),
        skipped: false,
    })
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
