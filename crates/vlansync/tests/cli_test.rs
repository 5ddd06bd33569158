//! Integration tests for the `vlansync` binary.
//!
//! Cover argument parsing, startup validation, and the offline
//! subcommands. Nothing here needs Redis, NetBox, or a switch.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use secrecy::SecretString;

use vlansync_config::ENV_KEYS;

// ── Helpers ─────────────────────────────────────────────────────────

/// The binary with every configuration variable cleared and the config
/// file pointed at a path that does not exist.
fn vlansync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("vlansync");
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd.env("VLANSYNC_CONFIG", "/tmp/vlansync-cli-test-nonexistent/config.toml")
        .env_remove("RUST_LOG");
    cmd
}

fn with_worker_env(cmd: &mut assert_cmd::Command) -> &mut assert_cmd::Command {
    cmd.env("REDIS_HOST", "redis")
        .env("REDIS_PORT", "6379")
        .env("REDIS_DB", "0")
        .env("NETBOX_URL", "https://netbox.example.com")
        .env("NETBOX_TOKEN", "abcdef0123456789")
        .env("CISCO_USER", "automation")
        .env("CISCO_PASS", "hunter2-switch")
}

fn payload_file(body: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(body).unwrap();
    file
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    vlansync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("worker")
            .and(predicate::str::contains("serve"))
            .and(predicate::str::contains("enqueue"))
            .and(predicate::str::contains("sign"))
            .and(predicate::str::contains("check-config")),
    );
}

#[test]
fn test_version_flag() {
    vlansync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vlansync"));
}

#[test]
fn test_invalid_subcommand() {
    vlansync_cmd().arg("frobnicate").assert().failure().code(2);
}

// ── Startup validation ──────────────────────────────────────────────

#[test]
fn test_worker_without_config_lists_every_missing_variable() {
    vlansync_cmd().arg("worker").assert().failure().code(3).stderr(
        predicate::str::contains("REDIS_HOST")
            .and(predicate::str::contains("REDIS_DB"))
            .and(predicate::str::contains("NETBOX_URL"))
            .and(predicate::str::contains("NETBOX_TOKEN"))
            .and(predicate::str::contains("CISCO_PASS")),
    );
}

#[test]
fn test_default_command_is_worker() {
    vlansync_cmd()
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("missing required configuration"));
}

#[test]
fn test_invalid_netbox_url_is_rejected() {
    let mut cmd = vlansync_cmd();
    with_worker_env(&mut cmd)
        .env("NETBOX_URL", "not a url")
        .arg("worker")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("NETBOX_URL"));
}

#[test]
fn test_serve_requires_gate_config() {
    vlansync_cmd().arg("serve").assert().failure().code(3).stderr(
        predicate::str::contains("REDIS_HOST").and(predicate::str::contains("NETBOX_SECRET")),
    );
}

#[test]
fn test_serve_rejects_size_based_log_rotation() {
    let mut cmd = vlansync_cmd();
    with_worker_env(&mut cmd)
        .env("NETBOX_SECRET", "hook-secret")
        .env("LOG_MAX_SIZE", "10485760")
        .arg("serve")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("LOG_MAX_SIZE"));
}

// ── check-config ────────────────────────────────────────────────────

#[test]
fn test_check_config_prints_redacted_summary() {
    let mut cmd = vlansync_cmd();
    with_worker_env(&mut cmd)
        .env("TASK_DELAY", "5")
        .arg("check-config")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("redis://redis:6379/0")
                .and(predicate::str::contains("task delay 5s"))
                .and(predicate::str::contains("gate         not configured"))
                .and(predicate::str::contains("hook-secret").not())
                .and(predicate::str::contains("hunter2-switch").not())
                .and(predicate::str::contains("abcdef0123456789").not()),
        );
}

#[test]
fn test_check_config_shows_webhook_listener() {
    let mut cmd = vlansync_cmd();
    with_worker_env(&mut cmd)
        .env("NETBOX_SECRET", "hook-secret")
        .env("WEBHOOK_PORT", "8080")
        .arg("check-config")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("http://0.0.0.0:8080/webhook/vlan")
                .and(predicate::str::contains("hook-secret").not()),
        );
}

#[test]
fn test_check_config_reads_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "redis_host = \"queue.internal\"\nredis_port = 6380\nredis_db = 1").unwrap();

    let mut cmd = vlansync_cmd();
    with_worker_env(&mut cmd)
        .env_remove("REDIS_HOST")
        .env_remove("REDIS_PORT")
        .env_remove("REDIS_DB")
        .env("VLANSYNC_CONFIG", file.path())
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("redis://queue.internal:6380/1"));
}

// ── sign ────────────────────────────────────────────────────────────

#[test]
fn test_sign_matches_gate_signature() {
    let body = br#"{"model":"vlan","event":"created"}"#;
    let file = payload_file(body);
    let expected = vlansync_core::gate::sign(&SecretString::from("hook-secret"), body);

    vlansync_cmd()
        .env("NETBOX_SECRET", "hook-secret")
        .args(["sign", "--payload"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(format!("{expected}\n"));
}

#[test]
fn test_sign_requires_secret() {
    let file = payload_file(b"{}");
    vlansync_cmd()
        .args(["sign", "--payload"])
        .arg(file.path())
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("NETBOX_SECRET"));
}

#[test]
fn test_sign_reads_stdin() {
    let expected = vlansync_core::gate::sign(&SecretString::from("hook-secret"), b"payload");
    vlansync_cmd()
        .env("NETBOX_SECRET", "hook-secret")
        .args(["sign", "--payload", "-"])
        .write_stdin("payload")
        .assert()
        .success()
        .stdout(format!("{expected}\n"));
}

#[test]
fn test_sign_missing_file() {
    vlansync_cmd()
        .env("NETBOX_SECRET", "hook-secret")
        .args(["sign", "--payload", "/tmp/vlansync-cli-test-nonexistent/body.json"])
        .assert()
        .failure()
        .code(2);
}

// ── enqueue ─────────────────────────────────────────────────────────

#[test]
fn test_enqueue_requires_gate_config() {
    let file = payload_file(b"{}");
    vlansync_cmd()
        .args(["enqueue", "--payload"])
        .arg(file.path())
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("NETBOX_SECRET"));
}

#[test]
fn test_enqueue_signature_conflicts_with_sign() {
    vlansync_cmd()
        .args(["enqueue", "--payload", "-", "--signature", "00", "--sign"])
        .assert()
        .failure()
        .code(2);
}
