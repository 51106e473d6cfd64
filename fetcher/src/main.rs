//! rclone fetcher CLI entrypoint.
//!
//! Downloads and verifies the rclone release for the requested platform and
//! prints the path of the unpacked executable on stdout.

use camino::Utf8Path;
use clap::Parser;
use rclone_bin_fetcher::cli::Cli;
use rclone_bin_fetcher::error::{FetchError, Result};
use rclone_bin_fetcher::fetch::{FetchConfig, FetchReport, fetch_binary};
use rclone_bin_fetcher::output::{success_message, write_stderr_line};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut std::io::stdout(), &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<FetchReport> {
    let config = FetchConfig {
        raw_os: cli.raw_system(),
        raw_arch: cli.raw_arch(),
        version: &cli.rclone_version,
        output_dir: &cli.output_dir,
        origin: &cli.origin,
        skip_existing: cli.skip_existing,
        quiet: cli.quiet,
    };
    let report = fetch_binary(&config, stderr)?;
    ensure_present(&report.binary_path)?;

    if !cli.quiet {
        write_stderr_line(stderr, success_message(&report));
    }
    Ok(report)
}

/// Fail loudly if the executable did not end up on disk.
fn ensure_present(path: &Utf8Path) -> Result<()> {
    if path.is_file() {
        return Ok(());
    }
    Err(FetchError::Io {
        path: path.to_owned(),
        source: std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "executable missing after extraction",
        ),
    })
}

fn exit_code_for_run_result(
    result: Result<FetchReport>,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> i32 {
    match result {
        Ok(report) => {
            if writeln!(stdout, "{}", report.binary_path).is_err() {
                // stdout closed by the caller; the fetch itself succeeded.
            }
            0
        }
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
