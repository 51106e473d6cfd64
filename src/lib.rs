//! Run a packaged rclone binary as a remote-control subprocess.
//!
//! The executable is placed beside the crate at packaging time by
//! `rclone-bin-fetch`. This library finds it, launches `rclone rcd` on a
//! loopback port and talks to it over the RC HTTP interface.
//!
//! # Modules
//!
//! - [`binary`] - Locating the packaged executable
//! - [`control`] - RC calls over HTTP
//! - [`error`] - Client error taxonomy
//! - [`process`] - Subprocess lifecycle

pub mod binary;
pub mod control;
pub mod error;
pub mod process;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use binary::{BINARY_ENV, BinaryLocation};
pub use error::{ClientError, Result};
pub use process::{ClientOptions, ProcessState, RcloneProcess};
