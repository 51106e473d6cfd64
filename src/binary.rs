//! Locating the packaged rclone executable.
//!
//! The executable is produced at packaging time by `rclone-bin-fetch`, so
//! lookup happens when a client is built rather than when the crate loads.
//! Callers that ship the binary elsewhere set [`BINARY_ENV`] or pass an
//! explicit path to [`BinaryLocation::new`].

use crate::error::{ClientError, Result};
use rclone_bin_common::binary_name;
use std::path::{Path, PathBuf};

/// Environment variable naming the rclone executable to use.
pub const BINARY_ENV: &str = "RCLONE_BIN_CLIENT_BINARY";

/// Directory, relative to an anchor, that packaged binaries live in.
const BIN_DIR: &str = "bin";

/// Validated path to an existing rclone executable.
///
/// # Examples
///
/// ```no_run
/// use rclone_bin_client::BinaryLocation;
///
/// let location = BinaryLocation::locate()?;
/// println!("using {}", location.path().display());
/// # Ok::<(), rclone_bin_client::ClientError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryLocation {
    path: PathBuf,
}

impl BinaryLocation {
    /// Validate an explicit executable path.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BinaryMissing`] if `path` is not a file.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        locate_in(vec![path.into()])
    }

    /// Find the packaged executable.
    ///
    /// When [`BINARY_ENV`] is set it is the only candidate. Otherwise the
    /// `bin` directory beside the running executable is tried, then the
    /// `bin` directory of this crate, which is where the fetcher writes by
    /// default during development.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BinaryMissing`] listing every candidate when
    /// none is a file.
    pub fn locate() -> Result<Self> {
        locate_in(candidates())
    }

    /// The absolute path of the executable.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for BinaryLocation {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Candidate paths in lookup order.
#[must_use]
pub fn candidates() -> Vec<PathBuf> {
    if let Some(path) = std::env::var_os(BINARY_ENV).filter(|value| !value.is_empty()) {
        return vec![PathBuf::from(path)];
    }

    let mut paths = Vec::with_capacity(2);
    match std::env::current_exe() {
        Ok(exe) => {
            if let Some(dir) = exe.parent() {
                paths.push(dir.join(BIN_DIR).join(binary_name()));
            }
        }
        Err(err) => log::debug!("cannot resolve current executable: {err}"),
    }
    paths.push(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join(BIN_DIR)
            .join(binary_name()),
    );
    paths
}

fn locate_in(candidates: Vec<PathBuf>) -> Result<BinaryLocation> {
    for candidate in &candidates {
        if candidate.is_file() {
            let path = std::path::absolute(candidate)?;
            log::debug!("using rclone at {}", path.display());
            return Ok(BinaryLocation { path });
        }
        log::trace!("no rclone at {}", candidate.display());
    }
    Err(ClientError::BinaryMissing { candidates })
}
