//! Shared test utilities for the fetcher crate.

use crate::artefact::verification::compute_sha256;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

/// Build an in-memory zip archive from `(member name, contents)` pairs, in
/// the given order. Names ending in `/` become directory entries.
///
/// # Panics
///
/// Panics if the zip writer fails, which only happens on invalid input.
#[must_use]
pub fn zip_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in members {
        if name.ends_with('/') {
            writer
                .add_directory(*name, SimpleFileOptions::default())
                .expect("add directory entry");
        } else {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start zip entry");
            writer.write_all(contents).expect("write zip entry");
        }
    }
    writer.finish().expect("finish zip").into_inner()
}

/// A release-shaped archive holding `contents` as the `rclone` executable
/// for the given archive directory name.
#[must_use]
pub fn release_archive(archive_dir: &str, binary_name: &str, contents: &[u8]) -> Vec<u8> {
    let dir = format!("{archive_dir}/");
    let readme = format!("{archive_dir}/README.txt");
    let binary = format!("{archive_dir}/{binary_name}");
    zip_archive(&[
        (dir.as_str(), b"".as_slice()),
        (readme.as_str(), b"rclone readme".as_slice()),
        (binary.as_str(), contents),
    ])
}

/// Return the lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    compute_sha256(bytes).into_inner()
}

/// Render `SHA256SUMS` text from `(digest, filename)` pairs, framed with
/// the clear-sign armour lines rclone publishes around the listing.
#[must_use]
pub fn sums_text(entries: &[(&str, &str)]) -> String {
    let mut text = String::from("-----BEGIN PGP SIGNED MESSAGE-----\nHash: SHA1\n\n");
    for (digest, filename) in entries {
        text.push_str(&format!("{digest}  {filename}\n"));
    }
    text.push_str("-----BEGIN PGP SIGNATURE-----\n\niQEzBAEBCAAdFiEE\n-----END PGP SIGNATURE-----\n");
    text
}
