//! Configuration for the vlansync worker and ingestion gate.
//!
//! Layered with figment: built-in defaults, then an optional TOML file,
//! then the process environment. Every setting is read once at start
//! and validated into the typed configs consumed by `vlansync-core` and
//! `vlansync-api`. Missing required settings are reported together.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use vlansync_api::{TlsMode, TransportConfig};
use vlansync_core::{EmptyTagPolicy, ReconcilerConfig, SshConfig};

/// Environment variable naming the TOML file.
pub const CONFIG_PATH_ENV: &str = "VLANSYNC_CONFIG";

/// Used when [`CONFIG_PATH_ENV`] is unset. A missing file is not an error.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/vlansync/config.toml";

/// Environment variables read on top of the file, matching the TOML keys
/// in upper case.
pub const ENV_KEYS: &[&str] = &[
    "REDIS_HOST",
    "REDIS_PORT",
    "REDIS_DB",
    "REDIS_QUEUE",
    "NETBOX_URL",
    "NETBOX_TOKEN",
    "NETBOX_CERT_VERIFY",
    "NETBOX_CA_CERT",
    "NETBOX_TIMEOUT",
    "CISCO_USER",
    "CISCO_PASS",
    "CISCO_SSH_PORT",
    "SSH_TIMEOUT",
    "TASK_DELAY",
    "POP_TIMEOUT",
    "EMPTY_TAGS",
    "NETBOX_SECRET",
    "WEBHOOK_HOST",
    "WEBHOOK_PORT",
    "LOG_FILE",
    "LOG_LEVEL",
    "LOG_ROTATION",
    "LOG_BACKUP_COUNT",
    "LOG_MAX_SIZE",
    "LOG_FORMAT",
];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .vars.join(", "))]
    Missing { vars: Vec<&'static str> },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Raw settings ────────────────────────────────────────────────────

/// How often the log file rolls over. Rotation is by time only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogRotation {
    Never,
    Minutely,
    Hourly,
    #[default]
    Daily,
}

/// Output encoding of the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Every setting as read, before validation. Keys are the lower-cased
/// environment variable names.
///
/// Holds secrets in plain text until validated; no `Debug`.
#[derive(Deserialize)]
#[serde(default)]
pub struct Settings {
    pub redis_host: Option<String>,
    pub redis_port: Option<u16>,
    pub redis_db: Option<u32>,
    pub redis_queue: String,

    pub netbox_url: Option<String>,
    pub netbox_token: Option<String>,
    pub netbox_cert_verify: bool,
    pub netbox_ca_cert: Option<PathBuf>,
    /// Seconds.
    pub netbox_timeout: u64,

    pub cisco_user: Option<String>,
    pub cisco_pass: Option<String>,
    pub cisco_ssh_port: u16,
    /// Seconds.
    pub ssh_timeout: u64,

    /// Seconds between dequeuing an event and touching the inventory.
    pub task_delay: u64,
    /// Seconds per blocking queue pop.
    pub pop_timeout: u64,
    pub empty_tags: EmptyTagPolicy,

    pub netbox_secret: Option<String>,
    /// Address the webhook listener binds.
    pub webhook_host: String,
    pub webhook_port: u16,

    pub log_file: PathBuf,
    pub log_level: String,
    pub log_rotation: LogRotation,
    pub log_backup_count: usize,
    /// Accepted only to reject it: size-based rotation is not supported.
    pub log_max_size: Option<u64>,
    /// `text` or `json`.
    pub log_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            redis_host: None,
            redis_port: None,
            redis_db: None,
            redis_queue: "vlan_tasks".into(),
            netbox_url: None,
            netbox_token: None,
            netbox_cert_verify: true,
            netbox_ca_cert: None,
            netbox_timeout: 30,
            cisco_user: None,
            cisco_pass: None,
            cisco_ssh_port: 22,
            ssh_timeout: 30,
            task_delay: 15,
            pop_timeout: 1,
            empty_tags: EmptyTagPolicy::default(),
            netbox_secret: None,
            webhook_host: "0.0.0.0".into(),
            webhook_port: 5000,
            log_file: PathBuf::from("/var/log/vlansync/vlansync.log"),
            log_level: "info".into(),
            log_rotation: LogRotation::default(),
            log_backup_count: 5,
            log_max_size: None,
            log_format: LogFormat::default().to_string(),
        }
    }
}

// ── Loading ─────────────────────────────────────────────────────────

/// Resolve the TOML path from [`CONFIG_PATH_ENV`], else the default.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .filter(|p| !p.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// The provider stack: TOML file at `path`, then the environment.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::raw().only(ENV_KEYS))
}

/// Load settings from the default file location and the environment.
pub fn load() -> Result<Settings, ConfigError> {
    Settings::from_figment(&figment(&config_path()))
}

impl Settings {
    /// Extract settings from any provider stack; unset keys take defaults.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// Everything the reconciliation worker needs.
    pub fn worker_config(&self) -> Result<WorkerConfig, ConfigError> {
        let mut missing = Vec::new();
        let queue = self.queue_parts(&mut missing);
        let netbox_url = require(&mut missing, "NETBOX_URL", text(self.netbox_url.as_ref()));
        let netbox_token = require(&mut missing, "NETBOX_TOKEN", secret(self.netbox_token.as_ref()));
        let username = require(&mut missing, "CISCO_USER", text(self.cisco_user.as_ref()));
        let password = require(&mut missing, "CISCO_PASS", secret(self.cisco_pass.as_ref()));

        let (Some(queue), Some(netbox_url), Some(netbox_token), Some(username), Some(password)) =
            (queue, netbox_url, netbox_token, username, password)
        else {
            return Err(ConfigError::Missing { vars: missing });
        };
        let queue = self.queue_from(queue)?;

        let url = Url::parse(&netbox_url).map_err(|e| ConfigError::Validation {
            field: "NETBOX_URL".into(),
            reason: format!("{e}: {netbox_url}"),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "NETBOX_URL".into(),
                reason: format!("expected an http(s) URL, got {url}"),
            });
        }

        positive("NETBOX_TIMEOUT", self.netbox_timeout)?;
        positive("SSH_TIMEOUT", self.ssh_timeout)?;
        positive("POP_TIMEOUT", self.pop_timeout)?;
        if self.cisco_ssh_port == 0 {
            return Err(ConfigError::Validation {
                field: "CISCO_SSH_PORT".into(),
                reason: "port must be non-zero".into(),
            });
        }

        let tls = match (self.netbox_cert_verify, &self.netbox_ca_cert) {
            (false, _) => TlsMode::DangerAcceptInvalid,
            (true, Some(ca)) => TlsMode::CustomCa(ca.clone()),
            (true, None) => TlsMode::System,
        };

        Ok(WorkerConfig {
            queue,
            netbox: NetboxConfig {
                url,
                token: netbox_token,
                transport: TransportConfig {
                    tls,
                    timeout: Duration::from_secs(self.netbox_timeout),
                },
            },
            ssh: SshConfig {
                username,
                password,
                port: self.cisco_ssh_port,
                timeout: Duration::from_secs(self.ssh_timeout),
            },
            reconciler: ReconcilerConfig {
                throttle: Duration::from_secs(self.task_delay),
                pop_timeout: Duration::from_secs(self.pop_timeout),
                empty_tags: self.empty_tags,
            },
        })
    }

    /// Everything the ingestion gate needs.
    pub fn gate_config(&self) -> Result<GateConfig, ConfigError> {
        let mut missing = Vec::new();
        let queue = self.queue_parts(&mut missing);
        let secret = require(&mut missing, "NETBOX_SECRET", secret(self.netbox_secret.as_ref()));

        let (Some(queue), Some(secret)) = (queue, secret) else {
            return Err(ConfigError::Missing { vars: missing });
        };
        Ok(GateConfig {
            queue: self.queue_from(queue)?,
            secret,
        })
    }

    /// The ingestion gate plus the address its HTTP listener binds.
    pub fn serve_config(&self) -> Result<ServeConfig, ConfigError> {
        let gate = self.gate_config()?;
        let host = IpAddr::from_str(self.webhook_host.trim()).map_err(|e| {
            ConfigError::Validation {
                field: "WEBHOOK_HOST".into(),
                reason: format!("{e}: {:?}", self.webhook_host),
            }
        })?;
        Ok(ServeConfig {
            gate,
            listen: SocketAddr::new(host, self.webhook_port),
        })
    }

    /// The webhook signing secret alone.
    pub fn signing_secret(&self) -> Result<SecretString, ConfigError> {
        secret(self.netbox_secret.as_ref()).ok_or(ConfigError::Missing {
            vars: vec!["NETBOX_SECRET"],
        })
    }

    /// Queue connection only.
    pub fn queue_config(&self) -> Result<QueueConfig, ConfigError> {
        let mut missing = Vec::new();
        let Some(parts) = self.queue_parts(&mut missing) else {
            return Err(ConfigError::Missing { vars: missing });
        };
        self.queue_from(parts)
    }

    fn queue_parts(&self, missing: &mut Vec<&'static str>) -> Option<(String, u16, u32)> {
        let host = require(missing, "REDIS_HOST", text(self.redis_host.as_ref()));
        let port = require(missing, "REDIS_PORT", self.redis_port);
        let db = require(missing, "REDIS_DB", self.redis_db);
        Some((host?, port?, db?))
    }

    fn queue_from(&self, (host, port, db): (String, u16, u32)) -> Result<QueueConfig, ConfigError> {
        if self.redis_queue.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "REDIS_QUEUE".into(),
                reason: "queue key must not be empty".into(),
            });
        }
        Ok(QueueConfig {
            url: format!("redis://{host}:{port}/{db}"),
            key: self.redis_queue.clone(),
        })
    }

    /// Logging destination and policy. Never fails on missing values.
    pub fn log_config(&self) -> Result<LogConfig, ConfigError> {
        let level = normalize_level(&self.log_level).ok_or_else(|| ConfigError::Validation {
            field: "LOG_LEVEL".into(),
            reason: format!(
                "expected one of trace, debug, info, warning, error, critical; got {:?}",
                self.log_level
            ),
        })?;
        if let Some(size) = self.log_max_size {
            return Err(ConfigError::Validation {
                field: "LOG_MAX_SIZE".into(),
                reason: format!(
                    "size-based rotation is not supported (got {size}); \
                     unset it and choose LOG_ROTATION=never|minutely|hourly|daily"
                ),
            });
        }
        let format = LogFormat::from_str(self.log_format.trim()).map_err(|_| {
            ConfigError::Validation {
                field: "LOG_FORMAT".into(),
                reason: format!(
                    "expected text or json, got {:?}; format strings are not supported",
                    self.log_format
                ),
            }
        })?;
        if self.log_file.file_name().is_none() {
            return Err(ConfigError::Validation {
                field: "LOG_FILE".into(),
                reason: format!("not a file path: {}", self.log_file.display()),
            });
        }
        Ok(LogConfig {
            file: self.log_file.clone(),
            level: level.to_owned(),
            rotation: self.log_rotation,
            max_files: self.log_backup_count.max(1),
            format,
        })
    }
}

/// Record `name` as missing when `value` is absent.
fn require<T>(missing: &mut Vec<&'static str>, name: &'static str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        missing.push(name);
    }
    value
}

/// Non-blank, trimmed text.
fn text(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Non-empty secret, not trimmed.
fn secret(value: Option<&String>) -> Option<SecretString> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| SecretString::from(v.clone()))
}

fn positive(field: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(())
}

/// Map accepted level names onto tracing directives.
fn normalize_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" => Some("error"),
        _ => None,
    }
}

// ── Validated configs ───────────────────────────────────────────────

/// Redis list used as the event queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// `redis://host:port/db`
    pub url: String,
    pub key: String,
}

impl fmt::Display for QueueConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (list {})", self.url, self.key)
    }
}

#[derive(Debug, Clone)]
pub struct NetboxConfig {
    pub url: Url,
    pub token: SecretString,
    pub transport: TransportConfig,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub queue: QueueConfig,
    pub netbox: NetboxConfig,
    pub ssh: SshConfig,
    pub reconciler: ReconcilerConfig,
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub queue: QueueConfig,
    pub secret: SecretString,
}

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub gate: GateConfig,
    pub listen: SocketAddr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub file: PathBuf,
    /// A tracing level directive (`info`, `warn`, ...).
    pub level: String,
    pub rotation: LogRotation,
    pub max_files: usize,
    pub format: LogFormat,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(normalize_level("INFO"), Some("info"));
        assert_eq!(normalize_level("Warning"), Some("warn"));
        assert_eq!(normalize_level("CRITICAL"), Some("error"));
        assert_eq!(normalize_level("verbose"), None);
    }

    #[test]
    fn defaults_need_queue_settings() {
        let err = Settings::default().queue_config().unwrap_err();
        let ConfigError::Missing { vars } = err else {
            panic!("expected missing vars");
        };
        assert_eq!(vars, vec!["REDIS_HOST", "REDIS_PORT", "REDIS_DB"]);
    }

    #[test]
    fn missing_error_lists_every_variable() {
        let err = ConfigError::Missing {
            vars: vec!["REDIS_HOST", "NETBOX_TOKEN"],
        };
        assert_eq!(
            err.to_string(),
            "missing required configuration: REDIS_HOST, NETBOX_TOKEN"
        );
    }

    #[test]
    fn default_log_config_is_valid() {
        let log = Settings::default().log_config().unwrap();
        assert_eq!(log.level, "info");
        assert_eq!(log.rotation, LogRotation::Daily);
        assert_eq!(log.format, LogFormat::Text);
        assert_eq!(log.max_files, 5);
    }

    #[test]
    fn log_max_size_is_rejected_with_rotation_hint() {
        let settings = Settings {
            log_max_size: Some(10_485_760),
            ..Settings::default()
        };
        let err = settings.log_config().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, ref reason }
                if field == "LOG_MAX_SIZE" && reason.contains("LOG_ROTATION")),
            "{err:?}"
        );
    }

    #[test]
    fn log_format_string_is_rejected() {
        let settings = Settings {
            log_format: "%(asctime)s - %(levelname)s - %(message)s".into(),
            ..Settings::default()
        };
        let err = settings.log_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "LOG_FORMAT"));

        let settings = Settings {
            log_format: "JSON".into(),
            ..Settings::default()
        };
        assert_eq!(settings.log_config().unwrap().format, LogFormat::Json);
    }
}
