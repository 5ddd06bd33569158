use std::path::Path;

use vlansync_api::TlsMode;
use vlansync_config::Settings;

use crate::error::CliError;

const REDACTED: &str = "********";

/// Validate every section and print what the worker would run with.
/// Secrets are never printed. The gate section is optional.
pub fn handle(settings: &Settings, path: &Path) -> Result<(), CliError> {
    let file_state = if path.exists() { "found" } else { "not found, using environment only" };
    println!("config file  {} ({file_state})", path.display());

    let worker = settings.worker_config()?;
    let log = settings.log_config()?;

    println!("queue        {}", worker.queue);
    let tls = match &worker.netbox.transport.tls {
        TlsMode::System => "system roots".to_owned(),
        TlsMode::CustomCa(ca) => format!("CA {}", ca.display()),
        TlsMode::DangerAcceptInvalid => "verification disabled".to_owned(),
    };
    println!(
        "netbox       {} (token {REDACTED}, tls {tls}, timeout {}s)",
        worker.netbox.url,
        worker.netbox.transport.timeout.as_secs()
    );
    println!(
        "ssh          {}@*:{} (password {REDACTED}, timeout {}s)",
        worker.ssh.username,
        worker.ssh.port,
        worker.ssh.timeout.as_secs()
    );
    println!(
        "worker       task delay {}s, pop timeout {}s, empty tags {}",
        worker.reconciler.throttle.as_secs(),
        worker.reconciler.pop_timeout.as_secs(),
        worker.reconciler.empty_tags
    );
    if settings.signing_secret().is_ok() {
        let serve = settings.serve_config()?;
        println!(
            "gate         secret {REDACTED}, listening on http://{}{}",
            serve.listen,
            crate::server::WEBHOOK_PATH
        );
    } else {
        println!("gate         not configured (NETBOX_SECRET unset)");
    }
    println!(
        "logging      {} (level {}, rotation {}, keep {}, format {})",
        log.file.display(),
        log.level,
        log.rotation,
        log.max_files,
        log.format
    );
    Ok(())
}
