use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use vlansync_config::ServeConfig;
use vlansync_core::{IngestGate, RedisQueue};

use super::cancel_on_signal;
use crate::error::CliError;
use crate::server;

/// Accept NetBox webhooks over HTTP until a signal arrives.
pub async fn run(config: ServeConfig) -> Result<(), CliError> {
    let ServeConfig { gate, listen } = config;

    let queue = RedisQueue::connect(&gate.queue.url, gate.queue.key.clone())
        .await
        .map_err(|source| CliError::Queue {
            url: gate.queue.url.clone(),
            source,
        })?;
    let listener = TcpListener::bind(listen)
        .await
        .map_err(|source| CliError::Listen { addr: listen, source })?;
    info!(
        %listen,
        path = server::WEBHOOK_PATH,
        queue = %gate.queue,
        "webhook listener ready"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let app = server::router(Arc::new(IngestGate::new(gate.secret, queue)));
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|source| CliError::Listen { addr: listen, source })?;

    info!("webhook listener stopped");
    Ok(())
}
