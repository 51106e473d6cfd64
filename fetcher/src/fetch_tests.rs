//! Unit tests for the fetch orchestrator.

use super::*;
use crate::artefact::download::{DownloadError, MockReleaseDownloader};
use crate::artefact::extraction::MockBinaryExtractor;
use crate::test_utils::{release_archive, sha256_hex, sums_text};
use rstest::{fixture, rstest};

const VERSION: &str = "1.72.1";
const ARCHIVE_NAME: &str = "rclone-v1.72.1-linux-amd64.zip";
const BINARY: &[u8] = b"#!/bin/sh\necho rclone v1.72.1\n";

struct Scratch {
    _temp: tempfile::TempDir,
    output_dir: Utf8PathBuf,
}

#[fixture]
fn scratch() -> Scratch {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    Scratch {
        _temp: temp,
        output_dir: root.join("pkg").join("bin"),
    }
}

fn config<'a>(output_dir: &'a Utf8Path, os: &'a str, arch: &'a str) -> FetchConfig<'a> {
    FetchConfig {
        raw_os: os,
        raw_arch: arch,
        version: VERSION,
        output_dir,
        origin: "http://mirror.invalid",
        skip_existing: false,
        quiet: true,
    }
}

fn linux_archive() -> Vec<u8> {
    release_archive("rclone-v1.72.1-linux-amd64", "rclone", BINARY)
}

/// A downloader serving `archive` with a manifest listing `manifest_digest`.
fn serving(archive: Vec<u8>, manifest_digest: String) -> MockReleaseDownloader {
    let mut downloader = MockReleaseDownloader::new();
    downloader
        .expect_download_archive()
        .times(1)
        .returning(move |_| Ok(archive.clone()));
    downloader
        .expect_download_manifest()
        .times(1)
        .returning(move |asset| {
            let filename = asset.filename();
            Ok(sums_text(&[(manifest_digest.as_str(), filename.as_str())]))
        });
    downloader
}

fn untouched_downloader() -> MockReleaseDownloader {
    let mut downloader = MockReleaseDownloader::new();
    downloader.expect_download_archive().never();
    downloader.expect_download_manifest().never();
    downloader
}

fn untouched_extractor() -> MockBinaryExtractor {
    let mut extractor = MockBinaryExtractor::new();
    extractor.expect_extract().never();
    extractor
}

#[rstest]
fn verified_archive_is_unpacked(scratch: Scratch) {
    let archive = linux_archive();
    let digest = sha256_hex(&archive);
    let downloader = serving(archive, digest.clone());

    let mut stderr = Vec::new();
    let report = fetch_binary_with(
        &config(&scratch.output_dir, "linux", "amd64"),
        &downloader,
        &ZipExtractor,
        &mut stderr,
    )
    .expect("fetch succeeds");

    assert_eq!(report.binary_path, scratch.output_dir.join("rclone"));
    assert!(report.binary_path.is_file());
    assert_eq!(std::fs::read(&report.binary_path).expect("read"), BINARY);
    assert_eq!(report.digest.map(Sha256Digest::into_inner), Some(digest));
    assert_eq!(report.platform_tag.as_str(), "linux_amd64");
    assert!(!report.skipped);
    assert!(stderr.is_empty(), "quiet run wrote progress");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&report.binary_path)
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[rstest]
fn tampered_archive_is_never_extracted(scratch: Scratch) {
    let archive = linux_archive();
    let digest = sha256_hex(&archive);
    let mut tampered = archive;
    if let Some(byte) = tampered.last_mut() {
        *byte ^= 0xFF;
    }
    let downloader = serving(tampered, digest);

    let err = fetch_binary_with(
        &config(&scratch.output_dir, "linux", "amd64"),
        &downloader,
        &untouched_extractor(),
        &mut Vec::new(),
    )
    .expect_err("tampered archive");

    assert!(matches!(
        err,
        FetchError::Integrity(IntegrityError::ChecksumMismatch { .. })
    ));
    assert!(!scratch.output_dir.join("rclone").exists());
}

#[rstest]
fn manifest_without_entry_fails(scratch: Scratch) {
    let archive = linux_archive();
    let digest = sha256_hex(&archive);
    let mut downloader = MockReleaseDownloader::new();
    downloader
        .expect_download_archive()
        .returning(move |_| Ok(archive.clone()));
    downloader.expect_download_manifest().returning(move |_| {
        Ok(sums_text(&[
            (digest.as_str(), "rclone-v1.72.1-linux-arm64.zip"),
            (digest.as_str(), "rclone-v1.72.1-osx-amd64.zip"),
        ]))
    });

    let err = fetch_binary_with(
        &config(&scratch.output_dir, "linux", "amd64"),
        &downloader,
        &untouched_extractor(),
        &mut Vec::new(),
    )
    .expect_err("entry missing");

    assert!(matches!(
        err,
        FetchError::ManifestEntryMissing { ref filename } if filename == ARCHIVE_NAME
    ));
}

#[rstest]
fn manifest_download_failure_is_integrity_error(scratch: Scratch) {
    let archive = linux_archive();
    let mut downloader = MockReleaseDownloader::new();
    downloader
        .expect_download_archive()
        .returning(move |_| Ok(archive.clone()));
    downloader.expect_download_manifest().returning(|_| {
        Err(DownloadError::HttpError {
            url: "http://mirror.invalid/v1.72.1/SHA256SUMS".to_owned(),
            reason: "connection reset".to_owned(),
        })
    });

    let err = fetch_binary_with(
        &config(&scratch.output_dir, "linux", "amd64"),
        &downloader,
        &untouched_extractor(),
        &mut Vec::new(),
    )
    .expect_err("manifest unavailable");

    assert!(matches!(
        err,
        FetchError::Integrity(IntegrityError::ManifestUnavailable(_))
    ));
    assert!(err.to_string().contains("connection reset"));
}

#[rstest]
fn archive_download_failure_stops_before_manifest(scratch: Scratch) {
    let mut downloader = MockReleaseDownloader::new();
    downloader.expect_download_archive().returning(|asset| {
        Err(DownloadError::NotFound {
            url: format!("http://mirror.invalid/{}", asset.filename()),
        })
    });
    downloader.expect_download_manifest().never();

    let err = fetch_binary_with(
        &config(&scratch.output_dir, "linux", "amd64"),
        &downloader,
        &untouched_extractor(),
        &mut Vec::new(),
    )
    .expect_err("archive missing");

    assert!(matches!(err, FetchError::Download(DownloadError::NotFound { .. })));
    assert!(err.to_string().contains(ARCHIVE_NAME));
}

#[rstest]
#[case::unknown_os("haiku", "amd64")]
#[case::unknown_arch("linux", "ppc64le")]
fn unsupported_platform_makes_no_requests(
    scratch: Scratch,
    #[case] os: &str,
    #[case] arch: &str,
) {
    let err = fetch_binary_with(
        &config(&scratch.output_dir, os, arch),
        &untouched_downloader(),
        &untouched_extractor(),
        &mut Vec::new(),
    )
    .expect_err("unsupported");

    assert!(matches!(err, FetchError::UnsupportedPlatform(_)));
    assert!(!scratch.output_dir.exists());
}

#[rstest]
fn invalid_version_makes_no_requests(scratch: Scratch) {
    let config = FetchConfig {
        version: "v",
        ..config(&scratch.output_dir, "linux", "amd64")
    };

    let err = fetch_binary_with(
        &config,
        &untouched_downloader(),
        &untouched_extractor(),
        &mut Vec::new(),
    )
    .expect_err("invalid version");

    assert!(matches!(err, FetchError::InvalidVersion { .. }));
}

#[rstest]
fn skip_existing_keeps_present_binary(scratch: Scratch) {
    std::fs::create_dir_all(&scratch.output_dir).expect("create output");
    std::fs::write(scratch.output_dir.join("rclone"), b"installed").expect("seed");
    let config = FetchConfig {
        skip_existing: true,
        ..config(&scratch.output_dir, "linux", "amd64")
    };

    let report = fetch_binary_with(
        &config,
        &untouched_downloader(),
        &untouched_extractor(),
        &mut Vec::new(),
    )
    .expect("skipped");

    assert!(report.skipped);
    assert!(report.digest.is_none());
    assert_eq!(
        std::fs::read(report.binary_path).expect("read"),
        b"installed"
    );
}

#[rstest]
fn skip_existing_downloads_when_absent(scratch: Scratch) {
    let archive = linux_archive();
    let digest = sha256_hex(&archive);
    let downloader = serving(archive, digest);
    let config = FetchConfig {
        skip_existing: true,
        ..config(&scratch.output_dir, "linux", "amd64")
    };

    let report = fetch_binary_with(&config, &downloader, &ZipExtractor, &mut Vec::new())
        .expect("fetched");

    assert!(!report.skipped);
    assert!(report.binary_path.is_file());
}

#[rstest]
fn rerun_overwrites_stale_binary(scratch: Scratch) {
    std::fs::create_dir_all(&scratch.output_dir).expect("create output");
    std::fs::write(scratch.output_dir.join("rclone"), b"stale build").expect("seed");
    let archive = linux_archive();
    let digest = sha256_hex(&archive);
    let downloader = serving(archive, digest);

    let report = fetch_binary_with(
        &config(&scratch.output_dir, "linux", "amd64"),
        &downloader,
        &ZipExtractor,
        &mut Vec::new(),
    )
    .expect("fetched");

    assert_eq!(std::fs::read(report.binary_path).expect("read"), BINARY);
}

#[rstest]
fn windows_target_extracts_exe_without_mode_change(scratch: Scratch) {
    let archive = release_archive("rclone-v1.72.1-windows-amd64", "rclone.exe", BINARY);
    let digest = sha256_hex(&archive);
    let downloader = serving(archive, digest);
    let expected_path = scratch.output_dir.join("rclone.exe");
    let returned_path = expected_path.clone();

    let mut extractor = MockBinaryExtractor::new();
    extractor
        .expect_extract()
        .withf(|_, name, _, executable| name == "rclone.exe" && !*executable)
        .times(1)
        .returning(move |_, _, _, _| Ok(returned_path.clone()));

    let report = fetch_binary_with(
        &config(&scratch.output_dir, "Windows", "AMD64"),
        &downloader,
        &extractor,
        &mut Vec::new(),
    )
    .expect("fetched");

    assert_eq!(report.binary_path, expected_path);
    assert_eq!(report.platform_tag.as_str(), "windows_amd64");
}

#[rstest]
fn archive_without_binary_names_archive(scratch: Scratch) {
    let archive = release_archive("rclone-v1.72.1-linux-amd64", "rclone.exe", BINARY);
    let digest = sha256_hex(&archive);
    let downloader = serving(archive, digest);

    let err = fetch_binary_with(
        &config(&scratch.output_dir, "linux", "amd64"),
        &downloader,
        &ZipExtractor,
        &mut Vec::new(),
    )
    .expect_err("binary missing");

    assert!(matches!(
        err,
        FetchError::BinaryNotFoundInArchive { ref binary, ref archive }
            if binary == "rclone" && archive == ARCHIVE_NAME
    ));
}

#[rstest]
fn progress_is_written_unless_quiet(scratch: Scratch) {
    let archive = linux_archive();
    let digest = sha256_hex(&archive);
    let downloader = serving(archive, digest);
    let config = FetchConfig {
        quiet: false,
        ..config(&scratch.output_dir, "linux", "amd64")
    };

    let mut stderr = Vec::new();
    fetch_binary_with(&config, &downloader, &ZipExtractor, &mut stderr).expect("fetched");

    let text = String::from_utf8(stderr).expect("UTF-8");
    assert!(text.contains(&format!("Downloading {ARCHIVE_NAME}...")));
    assert!(text.contains("Download verified successfully."));
}
