//! Start the packaged rclone, print its version and shut it down.
//!
//! Set `RCLONE_BIN_CLIENT_BINARY` to use an executable outside the
//! packaged `bin` directory and `RUST_LOG=debug` to follow the lifecycle.

use rclone_bin_client::{ClientError, RcloneProcess, Result};
use std::io::Write;
use std::time::{Duration, Instant};

/// Interval between readiness probes.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Give up on a process that never becomes operational.
const STARTUP_DEADLINE: Duration = Duration::from_secs(30);

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let mut stderr = std::io::stderr();
    let result = run(&mut std::io::stdout());
    let exit_code = exit_code_for_run_result(result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(stdout: &mut dyn Write) -> Result<()> {
    let mut rclone = RcloneProcess::locate()?;
    log::debug!("using {}", rclone.binary().path().display());
    rclone.start()?;

    let started = Instant::now();
    while !rclone.operational() {
        if started.elapsed() > STARTUP_DEADLINE {
            rclone.stop()?;
            return Err(ClientError::Connection {
                command: "rc/noop".to_owned(),
                reason: format!("not ready after {STARTUP_DEADLINE:?}"),
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    let version = rclone.version()?;
    writeln!(stdout, "{version}")?;
    rclone.stop()
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            if writeln!(stderr, "error: {err}").is_err() {
                // Best-effort reporting; ignore write failures.
            }
            1
        }
    }
}
