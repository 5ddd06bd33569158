use tracing::debug;

use vlansync_config::Settings;
use vlansync_core::gate::sign;
use vlansync_core::{IngestGate, RedisQueue};

use super::read_payload;
use crate::cli::EnqueueArgs;
use crate::error::CliError;

/// Apply the webhook checks locally and push the payload onto the queue.
pub async fn handle(args: &EnqueueArgs, settings: &Settings) -> Result<(), CliError> {
    let config = settings.gate_config()?;
    let body = read_payload(&args.payload)?;

    let signature = if args.sign {
        Some(sign(&config.secret, &body))
    } else {
        args.signature.clone()
    };

    debug!(queue = %config.queue, bytes = body.len(), "connecting to queue");
    let queue = RedisQueue::connect(&config.queue.url, config.queue.key.clone())
        .await
        .map_err(|source| CliError::Queue {
            url: config.queue.url.clone(),
            source,
        })?;

    let gate = IngestGate::new(config.secret, queue);
    let accepted = gate.accept(&body, signature.as_deref()).await?;

    println!(
        "queued {} event for VLAN {} ({} bytes, HTTP {})",
        accepted.event,
        accepted
            .vlan_id
            .map_or_else(|| "?".to_owned(), |id| id.to_string()),
        accepted.bytes,
        vlansync_core::Accepted::STATUS_CODE,
    );
    Ok(())
}
