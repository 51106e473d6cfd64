//! Supervision of an `rclone rcd` subprocess.
//!
//! [`RcloneProcess`] is a small state machine:
//!
//! ```text
//! NotStarted --start--> Starting --operational--> Operational
//!      |                    |                          |
//!      +-------stop---------+----------stop------------+--> Stopped
//! ```
//!
//! `Stopped` is terminal. Readiness is polled by the caller through
//! [`RcloneProcess::operational`], which never blocks beyond one probe.
//! Dropping the handle stops the child.

use crate::binary::BinaryLocation;
use crate::control::{self, ControlEndpoint, HttpControlEndpoint};
use crate::error::{ClientError, Result};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;
use std::net::TcpListener;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Default loopback address the control endpoint binds to.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// How long [`RcloneProcess::stop`] waits for a graceful exit.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Upper bound on one readiness probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Lifecycle state of an [`RcloneProcess`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    /// Constructed; no child exists yet.
    NotStarted,
    /// Child spawned; the endpoint has not answered yet.
    Starting,
    /// The endpoint answered a readiness probe.
    Operational,
    /// The child has been stopped and reaped.
    Stopped,
}

impl ProcessState {
    /// Whether a child process is owned in this state.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Starting | Self::Operational)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotStarted => "not started",
            Self::Starting => "starting",
            Self::Operational => "operational",
            Self::Stopped => "stopped",
        })
    }
}

/// Launch settings for [`RcloneProcess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Address the control endpoint binds to.
    pub host: String,
    /// Control port; `None` picks a free ephemeral port at start.
    pub port: Option<u16>,
    /// How long to wait for a graceful exit before killing the child.
    pub grace_period: Duration,
    /// Extra arguments appended to the `rcd` command line.
    pub extra_args: Vec<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: None,
            grace_period: DEFAULT_GRACE_PERIOD,
            extra_args: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
struct VersionReply {
    version: String,
}

/// A supervised `rclone rcd` child process.
///
/// # Examples
///
/// ```no_run
/// use rclone_bin_client::{BinaryLocation, ClientOptions, RcloneProcess};
/// use std::time::Duration;
///
/// let binary = BinaryLocation::locate()?;
/// let mut rclone = RcloneProcess::new(binary, ClientOptions::default());
/// rclone.start()?;
/// while !rclone.operational() {
///     std::thread::sleep(Duration::from_millis(100));
/// }
/// println!("{}", rclone.version()?);
/// rclone.stop()?;
/// # Ok::<(), rclone_bin_client::ClientError>(())
/// ```
pub struct RcloneProcess {
    binary: BinaryLocation,
    options: ClientOptions,
    state: ProcessState,
    child: Option<Child>,
    control: Option<Box<dyn ControlEndpoint + Send>>,
    endpoint: Option<String>,
}

impl fmt::Debug for RcloneProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RcloneProcess")
            .field("binary", &self.binary)
            .field("state", &self.state)
            .field("endpoint", &self.endpoint)
            .field("pid", &self.pid())
            .finish_non_exhaustive()
    }
}

impl RcloneProcess {
    /// Prepare a process for `binary`; nothing is spawned until
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(binary: BinaryLocation, options: ClientOptions) -> Self {
        Self {
            binary,
            options,
            state: ProcessState::NotStarted,
            child: None,
            control: None,
            endpoint: None,
        }
    }

    /// Locate the packaged binary and prepare a process with default
    /// options.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BinaryMissing`] when no binary is found.
    pub fn locate() -> Result<Self> {
        Ok(Self::new(BinaryLocation::locate()?, ClientOptions::default()))
    }

    /// Spawn `rclone rcd` with an unauthenticated loopback control endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidState`] unless the process has never
    /// been started, [`ClientError::Io`] if no free port can be found and
    /// [`ClientError::ProcessSpawn`] if the executable cannot be run.
    pub fn start(&mut self) -> Result<()> {
        if self.state != ProcessState::NotStarted {
            return Err(ClientError::InvalidState {
                operation: "start",
                state: self.state,
            });
        }

        let host = self.options.host.as_str();
        let port = match self.options.port {
            Some(port) => port,
            None => free_port(host)?,
        };
        let child = Command::new(self.binary.path())
            .arg("rcd")
            .arg("--rc-addr")
            .arg(format!("{host}:{port}"))
            .arg("--rc-no-auth")
            .args(&self.options.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ClientError::ProcessSpawn {
                binary: self.binary.path().to_path_buf(),
                source,
            })?;

        let control = HttpControlEndpoint::new(host, port);
        log::info!(
            "started rclone (pid {}) with control endpoint {}",
            child.id(),
            control.base_url()
        );
        self.endpoint = Some(control.base_url().to_owned());
        self.control = Some(Box::new(control));
        self.child = Some(child);
        self.state = ProcessState::Starting;
        Ok(())
    }

    /// Probe the control endpoint once.
    ///
    /// Returns `true` when the endpoint answers, moving a starting process
    /// to [`ProcessState::Operational`]. Any failure, a probe left
    /// unanswered for two seconds, or a process that is not running yields
    /// `false`.
    pub fn operational(&mut self) -> bool {
        if !self.state.is_running() {
            return false;
        }
        let Some(control) = self.control.as_ref() else {
            return false;
        };

        match control.call_within(control::NOOP, &json!({}), PROBE_TIMEOUT) {
            Ok(_) => {
                if self.state == ProcessState::Starting {
                    log::debug!("rclone control endpoint is ready");
                    self.state = ProcessState::Operational;
                }
                true
            }
            Err(err) => {
                log::trace!("readiness probe failed: {err}");
                false
            }
        }
    }

    /// The version string rclone reports, e.g. `v1.72.1`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotRunning`] before start or after stop,
    /// [`ClientError::Connection`] when the endpoint is unreachable and
    /// [`ClientError::UnexpectedResponse`] when the reply has no version.
    pub fn version(&self) -> Result<String> {
        let reply = self.call_as("read version", control::VERSION, &json!({}))?;
        serde_json::from_value::<VersionReply>(reply)
            .map(|reply| reply.version)
            .map_err(|e| ClientError::UnexpectedResponse {
                command: control::VERSION.to_owned(),
                reason: e.to_string(),
            })
    }

    /// Send an arbitrary RC command and return rclone's JSON reply.
    ///
    /// # Errors
    ///
    /// As for [`version`](Self::version), minus payload validation.
    pub fn call(&self, command: &str, params: &Value) -> Result<Value> {
        self.call_as("send rc command", command, params)
    }

    fn call_as(&self, operation: &'static str, command: &str, params: &Value) -> Result<Value> {
        match (&self.control, self.state.is_running()) {
            (Some(control), true) => control.call(command, params),
            _ => Err(ClientError::NotRunning {
                operation,
                state: self.state,
            }),
        }
    }

    /// Stop the child, gracefully if possible.
    ///
    /// Sends `SIGTERM` on Unix, then `core/quit` when the endpoint is known
    /// to be up. Both requests share one grace period: once it runs out the
    /// child is killed and reaped, so a wedged endpoint cannot stall the
    /// shutdown. A process that never started, or was already stopped, is
    /// left alone. The state is [`ProcessState::Stopped`] afterwards even
    /// when an error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if waiting for or killing the child
    /// fails. The child has still been killed and reaped when waiting
    /// fails.
    pub fn stop(&mut self) -> Result<()> {
        if !self.state.is_running() {
            return Ok(());
        }
        let was_operational = self.state == ProcessState::Operational;
        let control = self.control.take();
        self.endpoint = None;
        self.state = ProcessState::Stopped;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let grace = self.options.grace_period;
        let started = Instant::now();
        let mut requested = terminate(&child);
        if let (true, Some(control)) = (was_operational, control) {
            match control.call_within(control::QUIT, &json!({}), grace) {
                Ok(_) => requested = true,
                Err(err) => log::debug!("core/quit failed: {err}"),
            }
        }

        let waited = if requested {
            child.wait_timeout(grace.saturating_sub(started.elapsed()))
        } else {
            Ok(None)
        };
        reap(&mut child, waited)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Base URL of the control endpoint while the child runs.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Operating system id of the child while it runs.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// The executable this process runs.
    #[must_use]
    pub fn binary(&self) -> &BinaryLocation {
        &self.binary
    }
}

impl Drop for RcloneProcess {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            log::warn!("failed to stop rclone: {err}");
        }
    }
}

/// Settle a child after the graceful wait.
///
/// An exited child is left as is. Otherwise it is killed and reaped, and a
/// failed wait is reported only after that.
fn reap(child: &mut Child, waited: std::io::Result<Option<ExitStatus>>) -> Result<()> {
    let waited = match waited {
        Ok(Some(status)) => {
            log::info!("rclone exited with {status}");
            return Ok(());
        }
        Ok(None) => {
            log::warn!("rclone is still running; killing it");
            Ok(())
        }
        Err(err) => {
            log::warn!("waiting for rclone failed: {err}; killing it");
            Err(err)
        }
    };

    if let Err(err) = child.kill() {
        // Already exited between the wait and the kill.
        log::debug!("kill failed: {err}");
    }
    let status = child.wait()?;
    log::info!("rclone exited with {status}");
    waited.map_err(ClientError::from)
}

/// Ask the OS for a free port on `host`.
fn free_port(host: &str) -> Result<u16> {
    let listener = TcpListener::bind((host, 0))?;
    Ok(listener.local_addr()?.port())
}

/// Send `SIGTERM`; returns whether the signal was delivered.
#[cfg(unix)]
fn terminate(child: &Child) -> bool {
    let Ok(pid) = libc::pid_t::try_from(child.id()) else {
        return false;
    };
    // SAFETY: `pid` names a child we own and have not reaped, so it cannot
    // have been recycled for another process.
    let delivered = unsafe { libc::kill(pid, libc::SIGTERM) } == 0;
    if !delivered {
        log::debug!("SIGTERM to {pid} failed: {}", std::io::Error::last_os_error());
    }
    delivered
}

#[cfg(not(unix))]
fn terminate(_child: &Child) -> bool {
    false
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
