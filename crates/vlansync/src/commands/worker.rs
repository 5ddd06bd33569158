use tokio_util::sync::CancellationToken;
use tracing::info;

use vlansync_api::NetboxClient;
use vlansync_config::WorkerConfig;
use vlansync_core::{Actuator, NetboxInventory, Reconciler, RedisQueue, SshTransport};

use super::cancel_on_signal;
use crate::error::CliError;

/// Wire the production collaborators together and run until a signal.
pub async fn run(config: WorkerConfig) -> Result<(), CliError> {
    let WorkerConfig {
        queue: queue_config,
        netbox,
        ssh,
        reconciler: reconciler_config,
    } = config;

    info!(
        queue = %queue_config,
        netbox = %netbox.url,
        ssh_port = ssh.port,
        "starting worker"
    );

    let queue = RedisQueue::connect(&queue_config.url, queue_config.key.clone())
        .await
        .map_err(|source| CliError::Queue {
            url: queue_config.url.clone(),
            source,
        })?;

    let client = NetboxClient::new(netbox.url, &netbox.token, &netbox.transport)
        .map_err(CliError::Netbox)?;
    let inventory = NetboxInventory::new(client, reconciler_config.empty_tags);
    let actuator = Actuator::new(SshTransport::new(ssh));
    let reconciler = Reconciler::new(queue, inventory, actuator, reconciler_config);

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let stats = reconciler.run(shutdown).await;
    info!(
        processed = stats.processed,
        rejected = stats.rejected,
        failed_events = stats.failed_events,
        device_failures = stats.device_failures,
        queue_errors = stats.queue_errors,
        "worker exited"
    );
    Ok(())
}
