use std::time::Duration;

use redis::aio::MultiplexedConnection;
use tracing::debug;

use super::EventQueue;
use crate::error::QueueError;

/// Redis list queue: producers `RPUSH`, the worker `BLPOP`s.
#[derive(Clone)]
pub struct RedisQueue {
    connection: MultiplexedConnection,
    key: String,
}

impl RedisQueue {
    /// Connect to `url` (`redis://host:port/db`) and use the list at `key`.
    pub async fn connect(url: &str, key: impl Into<String>) -> Result<Self, QueueError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        let key = key.into();
        debug!(%key, "connected to redis queue");
        Ok(Self { connection, key })
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl EventQueue for RedisQueue {
    async fn pop(&self, timeout: Duration) -> Result<Option<Vec<u8>>, QueueError> {
        let mut connection = self.connection.clone();
        let popped: Option<(String, Vec<u8>)> = redis::cmd("BLPOP")
            .arg(&self.key)
            .arg(blpop_seconds(timeout))
            .query_async(&mut connection)
            .await?;
        Ok(popped.map(|(_, payload)| payload))
    }

    async fn push(&self, payload: &[u8]) -> Result<(), QueueError> {
        let mut connection = self.connection.clone();
        let _len: i64 = redis::cmd("RPUSH")
            .arg(&self.key)
            .arg(payload)
            .query_async(&mut connection)
            .await?;
        Ok(())
    }
}

/// BLPOP takes whole seconds and treats 0 as "block forever", so round up
/// and never go below one.
fn blpop_seconds(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis().div_ceil(1000))
        .unwrap_or(u64::MAX)
        .max(1)
}
