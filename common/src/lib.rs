//! Shared platform vocabulary for the rclone-bin workspace.
//!
//! Both the build-time fetcher and the run-time client need to agree on how
//! an operating system and CPU architecture are spelled in rclone release
//! names and which executable filename a platform uses. Those rules live
//! here so neither side re-derives them.

pub mod error;
pub mod platform;

pub use error::{PlatformError, Result};
pub use platform::{
    Architecture, OperatingSystem, PlatformTag, PlatformTarget, TOOL_NAME, binary_name,
    host_machine, host_system,
};
