//! CLI argument definitions for the rclone fetcher.
//!
//! Every option has an environment fallback so packaging scripts can drive
//! the fetch through the same variables the release build uses.

use crate::artefact::naming::DEFAULT_ORIGIN;
use crate::artefact::version::DEFAULT_VERSION;
use camino::Utf8PathBuf;
use clap::Parser;
use rclone_bin_common::{host_machine, host_system};

/// Download, verify and unpack the rclone executable for a platform.
#[derive(Parser, Debug, Clone)]
#[command(name = "rclone-bin-fetch")]
#[command(version, about)]
#[command(long_about = concat!(
    "Download, verify and unpack the rclone executable for a platform.\n\n",
    "The release archive and its SHA256SUMS manifest are downloaded from the ",
    "release origin. The archive digest is checked before anything is written, ",
    "then the single rclone executable is unpacked into the output directory.\n\n",
    "The path of the executable is printed on stdout; progress goes to stderr.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Fetch rclone for the host into ./bin:\n",
    "    $ rclone-bin-fetch\n\n",
    "  Fetch a specific release for Windows on arm64:\n",
    "    $ rclone-bin-fetch --rclone-version 1.68.0 --system windows --arch arm64\n\n",
    "  Cross-package from a mirror:\n",
    "    $ RCLONE_DOWNLOAD_ORIGIN=https://mirror.example BUILD_SYSTEM=darwin rclone-bin-fetch",
))]
pub struct Cli {
    /// rclone release to fetch, with or without a leading `v`.
    #[arg(
        long = "rclone-version",
        value_name = "VERSION",
        env = "BUILD_RCLONE_VERSION",
        default_value = DEFAULT_VERSION
    )]
    pub rclone_version: String,

    /// Target operating system [default: host].
    #[arg(long, value_name = "OS", env = "BUILD_SYSTEM")]
    pub system: Option<String>,

    /// Target CPU architecture [default: host].
    #[arg(long, value_name = "ARCH", env = "BUILD_ARCH")]
    pub arch: Option<String>,

    /// Directory the executable is written to.
    #[arg(short, long, value_name = "DIR", default_value = "bin")]
    pub output_dir: Utf8PathBuf,

    /// Base URL releases are downloaded from.
    #[arg(
        long,
        value_name = "URL",
        env = "RCLONE_DOWNLOAD_ORIGIN",
        default_value = DEFAULT_ORIGIN
    )]
    pub origin: String,

    /// Keep an executable already present in the output directory.
    #[arg(long)]
    pub skip_existing: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// The requested operating system, falling back to the host's `uname`
    /// spelling.
    #[must_use]
    pub fn raw_system(&self) -> &str {
        self.system
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(host_system())
    }

    /// The requested architecture, falling back to the host's.
    #[must_use]
    pub fn raw_arch(&self) -> &str {
        self.arch
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(host_machine())
    }

    /// Log level implied by `-q` and `-v`.
    ///
    /// `RUST_LOG` still takes precedence when set.
    #[must_use]
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
