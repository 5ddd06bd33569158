//! CLI error types with miette diagnostics.
//!
//! Every failure that ends the process goes through [`CliError`], which
//! carries help text and a stable exit code.

use std::net::SocketAddr;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use vlansync_config::ConfigError;
use vlansync_core::{GateError, QueueError};

pub mod exit_code {
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const CONNECTION: i32 = 4;
    pub const REJECTED: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(vlansync::config),
        help(
            "Set the variables in the environment or in the TOML file named by\n\
             VLANSYNC_CONFIG (default /etc/vlansync/config.toml).\n\
             Run: vlansync check-config"
        )
    )]
    Config(#[from] ConfigError),

    #[error("cannot set up logging to {}: {reason}", path.display())]
    #[diagnostic(
        code(vlansync::logging),
        help("Check that LOG_FILE points into a writable directory.")
    )]
    Logging { path: PathBuf, reason: String },

    // ── Connections ──────────────────────────────────────────────────

    #[error("cannot reach the event queue at {url}")]
    #[diagnostic(
        code(vlansync::queue),
        help("Check REDIS_HOST, REDIS_PORT and REDIS_DB, and that Redis is running.")
    )]
    Queue {
        url: String,
        #[source]
        source: QueueError,
    },

    #[error("cannot build the NetBox client")]
    #[diagnostic(
        code(vlansync::netbox),
        help("Check NETBOX_URL, NETBOX_TOKEN and NETBOX_CA_CERT.")
    )]
    Netbox(#[source] vlansync_api::Error),

    #[error("webhook listener on {addr} failed")]
    #[diagnostic(
        code(vlansync::listen),
        help("Check WEBHOOK_HOST and WEBHOOK_PORT, and that nothing else holds the port.")
    )]
    Listen {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    // ── Ingestion ────────────────────────────────────────────────────

    #[error("payload rejected (HTTP {status})")]
    #[diagnostic(code(vlansync::rejected))]
    Rejected {
        status: u16,
        #[source]
        source: GateError,
    },

    // ── IO ───────────────────────────────────────────────────────────

    #[error("cannot read {}", path.display())]
    #[diagnostic(code(vlansync::io))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Logging { .. } => exit_code::CONFIG,
            Self::Queue { .. }
            | Self::Netbox(_)
            | Self::Listen { .. }
            | Self::Rejected {
                source: GateError::Queue(_),
                ..
            } => exit_code::CONNECTION,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Read { .. } => exit_code::USAGE,
        }
    }
}

impl From<GateError> for CliError {
    fn from(err: GateError) -> Self {
        Self::Rejected {
            status: err.status_code(),
            source: err,
        }
    }
}
