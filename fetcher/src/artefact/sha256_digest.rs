//! SHA-256 digest newtype for archive verification.
//!
//! Manifest digests are compared case-insensitively, so parsing accepts
//! either case and the stored form is always lowercase.

use std::fmt;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// A validated, lowercase hex-encoded SHA-256 digest.
///
/// # Examples
///
/// ```
/// use rclone_bin_fetcher::artefact::sha256_digest::Sha256Digest;
///
/// let hex = "AB".repeat(32);
/// let digest = Sha256Digest::parse(&hex).expect("valid digest");
/// assert_eq!(digest.as_str(), "ab".repeat(32));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Parse a hex digest of either case.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when `value` is not exactly 64
    /// hex characters.
    pub fn parse(value: &str) -> Result<Self, String> {
        if value.len() != DIGEST_HEX_LEN {
            return Err(format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                value.len()
            ));
        }
        if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(format!("non-hex character '{bad}'"));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    /// Wrap the finalised output of a hasher.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lowercase_digest() {
        let digest = Sha256Digest::parse(&"a".repeat(64));
        assert!(digest.is_ok());
    }

    #[test]
    fn uppercase_digest_is_stored_lowercase() {
        let digest = Sha256Digest::parse(&"F0".repeat(32)).expect("valid digest");
        assert_eq!(digest.as_str(), "f0".repeat(32));
    }

    #[test]
    fn rejects_wrong_length() {
        let err = Sha256Digest::parse("abcdef").expect_err("too short");
        assert!(err.contains("got 6"));
    }

    #[test]
    fn rejects_non_hex_characters() {
        let mut bad = "a".repeat(63);
        bad.push('g');
        let err = Sha256Digest::parse(&bad).expect_err("non-hex");
        assert!(err.contains("'g'"));
    }

    #[test]
    fn from_bytes_renders_lowercase_hex() {
        let digest = Sha256Digest::from_bytes(&[0xAB; 32]);
        assert_eq!(digest.as_str(), "ab".repeat(32));
    }
}
