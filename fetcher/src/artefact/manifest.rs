//! `SHA256SUMS` manifest parsing.
//!
//! The manifest is the plaintext listing rclone publishes next to each
//! release, one `<hex-digest>  <filename>` pair per line. The published file
//! is PGP clear-signed, so it also carries armour and signature lines; those
//! never have exactly two tokens with a matching filename and are skipped by
//! the same rule that skips blank lines.

/// One `(digest, filename)` line of the manifest, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// The checksum token exactly as published.
    pub digest: String,
    /// The filename token exactly as published.
    pub filename: String,
}

/// Ordered entries of a checksum manifest.
///
/// # Examples
///
/// ```
/// use rclone_bin_fetcher::artefact::manifest::ChecksumManifest;
///
/// let manifest = ChecksumManifest::parse("abc123  rclone-v1.72.1-linux-amd64.zip\n");
/// let entry = manifest
///     .lookup("rclone-v1.72.1-linux-amd64.zip")
///     .expect("entry present");
/// assert_eq!(entry.digest, "abc123");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: Vec<ManifestEntry>,
}

impl ChecksumManifest {
    /// Parse manifest text.
    ///
    /// Every non-empty line is split on whitespace. Only lines with exactly
    /// two tokens become entries; anything else is ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let mut tokens = line.split_whitespace();
                match (tokens.next(), tokens.next(), tokens.next()) {
                    (Some(digest), Some(filename), None) => Some(ManifestEntry {
                        digest: digest.to_owned(),
                        filename: filename.to_owned(),
                    }),
                    _ => None,
                }
            })
            .collect();
        Self { entries }
    }

    /// Return the first entry whose filename equals `filename` exactly.
    ///
    /// Duplicate entries for the same filename are not an error; the first
    /// one in file order wins.
    #[must_use]
    pub fn lookup(&self, filename: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|entry| entry.filename == filename)
    }

    /// Return all parsed entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }
}
