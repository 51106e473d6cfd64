//! rclone release fetcher library.
//!
//! This crate resolves the rclone release archive for a target platform,
//! downloads it together with the published `SHA256SUMS` manifest, verifies
//! the archive digest and unpacks the single `rclone` executable into an
//! output directory. It backs the `rclone-bin-fetch` CLI and can be driven
//! programmatically by packaging scripts.
//!
//! # Modules
//!
//! - [`artefact`] - Release naming, download, manifest parsing, digest
//!   verification and extraction
//! - [`cli`] - Command-line argument definitions
//! - [`error`] - Fetch error taxonomy
//! - [`fetch`] - Download, verify and extract pipeline orchestration
//! - [`output`] - Progress and report formatting

pub mod artefact;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod output;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
