//! Shared test utilities for the client crate.
//!
//! [`FakeRcServer`] answers the handful of RC commands the client sends, so
//! lifecycle tests can pair it with a stub executable that merely sleeps.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Version string reported by [`FakeRcServer`].
pub const FAKE_VERSION: &str = "v1.72.1";

/// Write an executable shell script that sleeps, standing in for rclone.
///
/// The script ignores its arguments, so it accepts the `rcd` command line
/// without listening anywhere.
///
/// # Panics
///
/// Panics if the script cannot be written.
#[cfg(unix)]
#[must_use]
pub fn stub_rclone(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("rclone");
    std::fs::write(&path, "#!/bin/sh\nexec sleep 30\n").expect("write stub rclone");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod stub rclone");
    path
}

/// Write a regular file named like rclone that cannot be executed.
///
/// # Panics
///
/// Panics if the file cannot be written.
#[must_use]
pub fn unexecutable_rclone(dir: &Path) -> PathBuf {
    let path = dir.join(rclone_bin_common::binary_name());
    std::fs::write(&path, b"not a program").expect("write unexecutable rclone");
    path
}

/// A loopback HTTP server imitating `rclone rcd --rc-no-auth`.
///
/// Each connection carries one request and is closed after the reply. The
/// server thread exits after answering `core/quit`, unless built with
/// [`stalling_on`](Self::stalling_on) for that command.
#[derive(Debug)]
pub struct FakeRcServer {
    port: u16,
    commands: Arc<Mutex<Vec<String>>>,
}

impl FakeRcServer {
    /// Bind an ephemeral loopback port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no loopback port can be bound.
    #[must_use]
    pub fn start() -> Self {
        Self::spawn(None)
    }

    /// Like [`start`](Self::start), but requests for `command` are recorded
    /// and then left unanswered with the connection held open.
    ///
    /// # Panics
    ///
    /// Panics if no loopback port can be bound.
    #[must_use]
    pub fn stalling_on(command: &'static str) -> Self {
        Self::spawn(Some(command))
    }

    fn spawn(stall: Option<&'static str>) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind loopback");
        let port = listener.local_addr().expect("local addr").port();
        let commands = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&commands);

        std::thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let command = serve(&stream, &seen, stall);
                if command.is_some() && command.as_deref() == stall {
                    held.push(stream);
                } else if command.as_deref() == Some("core/quit") {
                    break;
                }
            }
        });

        Self { port, commands }
    }

    /// The port the server listens on.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Commands received so far, in arrival order.
    ///
    /// # Panics
    ///
    /// Panics if the server thread panicked while holding the lock.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("lock").clone()
    }
}

/// Record and answer one request; returns the command it named.
///
/// A request for `stall` is recorded but not answered.
fn serve(
    stream: &TcpStream,
    seen: &Mutex<Vec<String>>,
    stall: Option<&str>,
) -> Option<String> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let path = request_line.split_whitespace().nth(1)?;
    let command = path.trim_start_matches('/').to_owned();

    let mut content_length = 0;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).ok()?;
    seen.lock().ok()?.push(command.clone());
    if stall == Some(command.as_str()) {
        return Some(command);
    }

    let (status, reply) = match command.as_str() {
        "rc/noop" => (
            "200 OK",
            String::from_utf8(body).unwrap_or_else(|_| "{}".to_owned()),
        ),
        "core/version" => (
            "200 OK",
            format!(r#"{{"version":"{FAKE_VERSION}","os":"linux","arch":"amd64","isGit":false}}"#),
        ),
        "core/quit" => ("200 OK", "{}".to_owned()),
        _ => (
            "404 Not Found",
            format!(r#"{{"error":"couldn't find method \"{command}\"","status":404}}"#),
        ),
    };

    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
        reply.len()
    )
    .ok()?;
    stream.flush().ok()?;
    Some(command)
}
