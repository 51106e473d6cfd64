//! Output formatting for the fetcher CLI.
//!
//! Progress goes to stderr so that stdout carries only the binary path,
//! which packaging scripts capture.

use crate::fetch::FetchReport;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort progress output; ignore write failures.
    }
}

/// Summary shown after a successful fetch.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use rclone_bin_common::{PlatformTag, PlatformTarget};
/// use rclone_bin_fetcher::fetch::FetchReport;
/// use rclone_bin_fetcher::output::success_message;
///
/// let report = FetchReport {
///     binary_path: Utf8PathBuf::from("bin/rclone"),
///     target: PlatformTarget::resolve("linux", "x86_64").expect("supported"),
///     platform_tag: PlatformTag::new("linux", "x86_64"),
///     digest: None,
///     skipped: true,
/// };
/// assert!(success_message(&report).contains("already present"));
/// ```
#[must_use]
pub fn success_message(report: &FetchReport) -> String {
    let action = if report.skipped {
        "already present at"
    } else {
        "unpacked to"
    };
    let mut message = format!(
        "rclone for {} {action} {}\nPlatform tag: {}",
        report.target, report.binary_path, report.platform_tag
    );
    if let Some(digest) = &report.digest {
        message.push_str("\nArchive SHA-256: ");
        message.push_str(digest.as_str());
    }
    message
}
