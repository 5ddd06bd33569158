// ── SSH device transport ──
//
// Interactive-shell sessions to IOS-style switches over libssh2. The
// command set is written to a PTY shell followed by `exit`; the device
// output is scanned for `%` lines carrying an error marker. IOS also uses
// `%` for notices (`% Applying VLAN changes may take few minutes`), and
// those do not fail the command set.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use ssh2::Session;
use tracing::{debug, warn};

use super::{DeviceSession, DeviceTransport};
use crate::error::TransportError;

/// Credentials and timeouts shared by every device session.
#[derive(Debug, Clone)]
pub struct SshConfig {
    pub username: String,
    pub password: SecretString,
    pub port: u16,
    pub timeout: Duration,
}

/// [`DeviceTransport`] over password-authenticated SSH.
#[derive(Debug, Clone)]
pub struct SshTransport {
    config: SshConfig,
}

impl SshTransport {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SshConfig {
        &self.config
    }

    fn connect_tcp(&self, address: &str) -> Result<TcpStream, TransportError> {
        let connect_err = |reason: String| TransportError::Connect {
            address: address.to_owned(),
            reason,
        };

        let socket = (address, self.config.port)
            .to_socket_addrs()
            .map_err(|e| connect_err(e.to_string()))?
            .next()
            .ok_or_else(|| connect_err("address did not resolve".into()))?;

        let stream = TcpStream::connect_timeout(&socket, self.config.timeout)
            .map_err(|e| connect_err(e.to_string()))?;
        stream
            .set_read_timeout(Some(self.config.timeout))
            .and_then(|()| stream.set_write_timeout(Some(self.config.timeout)))
            .map_err(|e| connect_err(e.to_string()))?;
        Ok(stream)
    }
}

impl DeviceTransport for SshTransport {
    type Session = SshSession;

    fn open(&self, address: &str) -> Result<SshSession, TransportError> {
        let stream = self.connect_tcp(address)?;

        let connect_err = |e: ssh2::Error| TransportError::Connect {
            address: address.to_owned(),
            reason: e.to_string(),
        };
        let mut session = Session::new().map_err(connect_err)?;
        session.set_tcp_stream(stream);
        session.set_timeout(u32::try_from(self.config.timeout.as_millis()).unwrap_or(u32::MAX));
        session.handshake().map_err(connect_err)?;

        session
            .userauth_password(&self.config.username, self.config.password.expose_secret())
            .map_err(|e| TransportError::Authentication {
                address: address.to_owned(),
                reason: e.to_string(),
            })?;
        if !session.authenticated() {
            return Err(TransportError::Authentication {
                address: address.to_owned(),
                reason: "server did not accept credentials".into(),
            });
        }

        debug!(%address, port = self.config.port, "SSH session established");
        Ok(SshSession {
            session,
            address: address.to_owned(),
        })
    }
}

/// One authenticated SSH connection. Disconnects on drop.
pub struct SshSession {
    session: Session,
    address: String,
}

impl SshSession {
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl DeviceSession for SshSession {
    fn send_config_set(&mut self, commands: &[String]) -> Result<String, TransportError> {
        let mut channel = self.session.channel_session().map_err(session_err)?;
        channel
            .request_pty("vt100", None, None)
            .map_err(session_err)?;
        channel.shell().map_err(session_err)?;

        let mut script = String::new();
        for command in commands {
            script.push_str(command);
            script.push('\n');
        }
        script.push_str("exit\n");

        channel
            .write_all(script.as_bytes())
            .map_err(session_err)?;
        channel.flush().map_err(session_err)?;
        channel.send_eof().map_err(session_err)?;

        let mut output = String::new();
        channel
            .read_to_string(&mut output)
            .map_err(session_err)?;
        if let Err(e) = channel.wait_close() {
            warn!(address = %self.address, error = %e, "channel did not close cleanly");
        }

        match rejection(&output) {
            Some(message) => Err(TransportError::CommandRejected { message }),
            None => Ok(output),
        }
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if let Err(e) = self.session.disconnect(None, "vlansync session closed", None) {
            debug!(address = %self.address, error = %e, "disconnect failed");
        }
    }
}

fn session_err(e: impl std::fmt::Display) -> TransportError {
    TransportError::Session(e.to_string())
}

/// Lower-case fragments that mark a `%` line as an error.
const ERROR_MARKERS: &[&str] = &[
    "invalid input",
    "incomplete command",
    "ambiguous command",
    "unrecognized command",
    "not found",
    "does not exist",
    "failed",
    "not allowed",
    "error",
];

/// First `%` error line of device output, e.g. `% Invalid input detected`.
fn rejection(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| is_error_line(line))
        .map(str::to_owned)
}

fn is_error_line(line: &str) -> bool {
    let Some(text) = line.strip_prefix('%') else {
        return false;
    };
    let text = text.to_ascii_lowercase();
    ERROR_MARKERS.iter().any(|marker| text.contains(marker))
}
