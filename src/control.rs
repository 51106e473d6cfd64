//! Remote-control calls against a running `rclone rcd`.
//!
//! Every RC command is an HTTP POST of a JSON object to
//! `http://<host>:<port>/<command>`, answered with a JSON object. The reply
//! schema belongs to rclone; this module only moves JSON across the wire.

use crate::error::{ClientError, Result};
use serde_json::Value;
use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;

/// Readiness probe; echoes its parameters.
pub const NOOP: &str = "rc/noop";
/// Reports the rclone build version.
pub const VERSION: &str = "core/version";
/// Asks rclone to shut down.
pub const QUIT: &str = "core/quit";

/// Trait for issuing RC commands, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait ControlEndpoint {
    /// Send `command` with `params` as the JSON body and return the reply.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connection`] when the endpoint cannot be
    /// reached and [`ClientError::UnexpectedResponse`] when it answers with
    /// an error status or a body that is not JSON.
    fn call(&self, command: &str, params: &Value) -> Result<Value>;

    /// As [`call`](Self::call), but give up once `timeout` has elapsed.
    ///
    /// # Errors
    ///
    /// As for [`call`](Self::call); an expired timeout is a
    /// [`ClientError::Connection`].
    fn call_within(&self, command: &str, params: &Value, timeout: Duration) -> Result<Value>;
}

/// RC endpoint reached over loopback HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpControlEndpoint {
    base_url: String,
}

impl HttpControlEndpoint {
    /// Endpoint listening on `host:port`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rclone_bin_client::control::HttpControlEndpoint;
    ///
    /// let endpoint = HttpControlEndpoint::new("127.0.0.1", 5572);
    /// assert_eq!(endpoint.base_url(), "http://127.0.0.1:5572");
    /// ```
    #[must_use]
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            base_url: format!("http://{host}:{port}"),
        }
    }

    /// The `http://host:port` prefix commands are appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn command_url(&self, command: &str) -> String {
        format!("{}/{}", self.base_url, command.trim_start_matches('/'))
    }

    fn post(&self, agent: &ureq::Agent, command: &str, params: &Value) -> Result<Value> {
        let url = self.command_url(command);
        let body = serde_json::to_string(params).map_err(|e| ClientError::UnexpectedResponse {
            command: command.to_owned(),
            reason: format!("parameters are not serialisable: {e}"),
        })?;

        log::trace!("POST {url} {body}");
        let response = agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send(body.as_str())
            .map_err(|e| map_ureq_error(command, &e))?;

        let mut text = String::new();
        response
            .into_body()
            .as_reader()
            .read_to_string(&mut text)
            .map_err(|e| ClientError::Connection {
                command: command.to_owned(),
                reason: e.to_string(),
            })?;

        serde_json::from_str(&text).map_err(|e| ClientError::UnexpectedResponse {
            command: command.to_owned(),
            reason: format!("reply is not JSON: {e}"),
        })
    }
}

impl ControlEndpoint for HttpControlEndpoint {
    fn call(&self, command: &str, params: &Value) -> Result<Value> {
        self.post(control_agent(), command, params)
    }

    fn call_within(&self, command: &str, params: &Value, timeout: Duration) -> Result<Value> {
        self.post(&bounded_agent(timeout), command, params)
    }
}

/// Shared agent for control calls; no timeout, callers decide how long to
/// wait.
fn control_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| ureq::Agent::new_with_config(ureq::Agent::config_builder().build()))
}

/// One-off agent whose requests fail after `timeout`.
fn bounded_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    ureq::Agent::new_with_config(config)
}

fn map_ureq_error(command: &str, err: &ureq::Error) -> ClientError {
    match err {
        ureq::Error::StatusCode(status) => ClientError::UnexpectedResponse {
            command: command.to_owned(),
            reason: format!("HTTP status {status}"),
        },
        other => ClientError::Connection {
            command: command.to_owned(),
            reason: other.to_string(),
        },
    }
}
