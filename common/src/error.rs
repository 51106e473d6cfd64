//! Error types for platform normalisation.

use thiserror::Error;

/// Errors arising from unrecognised platform spellings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The operating system or architecture is not in the supported set.
    #[error("unsupported {component} \"{value}\"; expected one of: {expected}")]
    UnsupportedPlatform {
        /// Which half of the platform was rejected.
        component: &'static str,
        /// The raw value as supplied by the caller.
        value: String,
        /// Comma-separated list of accepted spellings.
        expected: String,
    },
}

/// Result type alias using [`PlatformError`].
pub type Result<T> = std::result::Result<T, PlatformError>;
