//! Error types for the rclone process client.

use crate::process::ProcessState;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, supervising or talking to rclone.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No usable rclone executable was found.
    #[error("rclone binary missing; searched: {}", join_paths(.candidates))]
    BinaryMissing {
        /// Every path that was checked, in lookup order.
        candidates: Vec<PathBuf>,
    },

    /// The operating system refused to start the executable.
    #[error("failed to spawn {}: {source}", .binary.display())]
    ProcessSpawn {
        /// The executable that was launched.
        binary: PathBuf,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The operation is not valid in the current lifecycle state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// The state the process was in.
        state: ProcessState,
    },

    /// The operation needs a running process.
    #[error("cannot {operation}: rclone is not running ({state})")]
    NotRunning {
        /// The rejected operation.
        operation: &'static str,
        /// The state the process was in.
        state: ProcessState,
    },

    /// The control endpoint could not be reached.
    #[error("rc call {command} failed: {reason}")]
    Connection {
        /// The remote-control command, e.g. `core/version`.
        command: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The control endpoint answered with something other than expected.
    #[error("unexpected reply to {command}: {reason}")]
    UnexpectedResponse {
        /// The remote-control command, e.g. `core/version`.
        command: String,
        /// What was wrong with the reply.
        reason: String,
    },

    /// An I/O error while managing the child process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
