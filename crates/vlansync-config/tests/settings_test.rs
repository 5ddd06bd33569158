#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;

use vlansync_api::TlsMode;
use vlansync_config::{ConfigError, LogFormat, LogRotation, Settings, figment};
use vlansync_core::EmptyTagPolicy;

fn worker_env() -> Figment {
    Figment::new()
        .merge(Serialized::default("redis_host", "redis"))
        .merge(Serialized::default("redis_port", 6379))
        .merge(Serialized::default("redis_db", 0))
        .merge(Serialized::default("netbox_url", "https://netbox.example.com"))
        .merge(Serialized::default("netbox_token", "0123456789abcdef"))
        .merge(Serialized::default("cisco_user", "automation"))
        .merge(Serialized::default("cisco_pass", "s3cret"))
}

// ── Worker ──────────────────────────────────────────────────────────

#[test]
fn worker_config_from_minimal_settings() {
    let settings = Settings::from_figment(&worker_env()).unwrap();
    let worker = settings.worker_config().unwrap();

    assert_eq!(worker.queue.url, "redis://redis:6379/0");
    assert_eq!(worker.queue.key, "vlan_tasks");
    assert_eq!(worker.netbox.url.as_str(), "https://netbox.example.com/");
    assert_eq!(worker.netbox.token.expose_secret(), "0123456789abcdef");
    assert!(matches!(worker.netbox.transport.tls, TlsMode::System));
    assert_eq!(worker.netbox.transport.timeout, Duration::from_secs(30));

    assert_eq!(worker.ssh.username, "automation");
    assert_eq!(worker.ssh.port, 22);
    assert_eq!(worker.reconciler.throttle, Duration::from_secs(15));
    assert_eq!(worker.reconciler.pop_timeout, Duration::from_secs(1));
    assert_eq!(worker.reconciler.empty_tags, EmptyTagPolicy::Discard);
}

#[test]
fn all_missing_worker_settings_are_reported_together() {
    let settings = Settings::from_figment(&Figment::new()).unwrap();
    let Err(ConfigError::Missing { vars }) = settings.worker_config() else {
        panic!("expected missing settings");
    };
    assert_eq!(
        vars,
        vec![
            "REDIS_HOST",
            "REDIS_PORT",
            "REDIS_DB",
            "NETBOX_URL",
            "NETBOX_TOKEN",
            "CISCO_USER",
            "CISCO_PASS",
        ]
    );
}

#[test]
fn blank_values_count_as_missing() {
    let figment = worker_env()
        .merge(Serialized::default("cisco_user", "  "))
        .merge(Serialized::default("netbox_token", ""));
    let settings = Settings::from_figment(&figment).unwrap();
    let Err(ConfigError::Missing { vars }) = settings.worker_config() else {
        panic!("expected missing settings");
    };
    assert_eq!(vars, vec!["NETBOX_TOKEN", "CISCO_USER"]);
}

#[test]
fn cert_verification_can_be_disabled() {
    let figment = worker_env().merge(Serialized::default("netbox_cert_verify", false));
    let worker = Settings::from_figment(&figment).unwrap().worker_config().unwrap();
    assert!(matches!(worker.netbox.transport.tls, TlsMode::DangerAcceptInvalid));

    let figment = worker_env().merge(Serialized::default("netbox_ca_cert", "/etc/ssl/netbox.pem"));
    let worker = Settings::from_figment(&figment).unwrap().worker_config().unwrap();
    assert!(matches!(worker.netbox.transport.tls, TlsMode::CustomCa(ref p) if p.ends_with("netbox.pem")));
}

#[test]
fn rejects_bad_netbox_url() {
    let figment = worker_env().merge(Serialized::default("netbox_url", "ftp://netbox"));
    let err = Settings::from_figment(&figment).unwrap().worker_config().unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "NETBOX_URL"));
}

#[test]
fn rejects_zero_pop_timeout() {
    let figment = worker_env().merge(Serialized::default("pop_timeout", 0));
    let err = Settings::from_figment(&figment).unwrap().worker_config().unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "POP_TIMEOUT"));
}

#[test]
fn bad_port_type_is_a_load_error() {
    let figment = worker_env().merge(Serialized::default("redis_port", "not-a-port"));
    assert!(matches!(
        Settings::from_figment(&figment),
        Err(ConfigError::Figment(_))
    ));
}

// ── Gate ────────────────────────────────────────────────────────────

#[test]
fn gate_requires_secret_and_queue() {
    let settings = Settings::from_figment(&Figment::new()).unwrap();
    let Err(ConfigError::Missing { vars }) = settings.gate_config() else {
        panic!("expected missing settings");
    };
    assert_eq!(vars, vec!["REDIS_HOST", "REDIS_PORT", "REDIS_DB", "NETBOX_SECRET"]);

    let figment = worker_env().merge(Serialized::default("netbox_secret", "hook"));
    let gate = Settings::from_figment(&figment).unwrap().gate_config().unwrap();
    assert_eq!(gate.secret.expose_secret(), "hook");
    assert_eq!(gate.queue.url, "redis://redis:6379/0");
}

#[test]
fn serve_config_binds_webhook_address() {
    let figment = worker_env().merge(Serialized::default("netbox_secret", "hook"));
    let serve = Settings::from_figment(&figment).unwrap().serve_config().unwrap();
    assert_eq!(serve.listen.to_string(), "0.0.0.0:5000");
    assert_eq!(serve.gate.queue.key, "vlan_tasks");

    let figment = figment
        .merge(Serialized::default("webhook_host", "127.0.0.1"))
        .merge(Serialized::default("webhook_port", 8080));
    let serve = Settings::from_figment(&figment).unwrap().serve_config().unwrap();
    assert_eq!(serve.listen.to_string(), "127.0.0.1:8080");
}

#[test]
fn serve_config_rejects_hostnames() {
    let figment = worker_env()
        .merge(Serialized::default("netbox_secret", "hook"))
        .merge(Serialized::default("webhook_host", "netbox-hooks.local"));
    let err = Settings::from_figment(&figment).unwrap().serve_config().unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "WEBHOOK_HOST"));
}

// ── File layer ──────────────────────────────────────────────────────

#[test]
fn toml_file_supplies_settings() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
redis_host = "queue.internal"
redis_port = 6380
redis_db = 2
redis_queue = "vlan_events"
task_delay = 5
empty_tags = "keep"
log_rotation = "hourly"
log_format = "json"
log_level = "WARNING"
"#
    )
    .unwrap();

    let settings = Settings::from_figment(&Figment::new().merge(Toml::file(file.path()))).unwrap();
    let queue = settings.queue_config().unwrap();
    assert_eq!(queue.url, "redis://queue.internal:6380/2");
    assert_eq!(queue.key, "vlan_events");
    assert_eq!(settings.task_delay, 5);
    assert_eq!(settings.empty_tags, EmptyTagPolicy::Keep);

    let log = settings.log_config().unwrap();
    assert_eq!(log.rotation, LogRotation::Hourly);
    assert_eq!(log.format, LogFormat::Json);
    assert_eq!(log.level, "warn");
}

#[test]
fn missing_file_is_not_an_error() {
    let settings =
        Settings::from_figment(&figment(std::path::Path::new("/nonexistent/vlansync.toml")))
            .unwrap();
    assert_eq!(settings.redis_queue, "vlan_tasks");
}

#[test]
fn unknown_log_level_is_rejected() {
    let figment = Figment::new().merge(Serialized::default("log_level", "chatty"));
    let err = Settings::from_figment(&figment).unwrap().log_config().unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "LOG_LEVEL"));
}
