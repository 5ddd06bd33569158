// ── Event queue ──
//
// Durable FIFO of raw webhook payloads between the ingestion gate and
// the worker. Redis in production, in-memory for tests and dry runs.

pub mod memory;
pub mod redis;

use std::future::Future;
use std::time::Duration;

use crate::error::QueueError;

/// FIFO of opaque payloads.
pub trait EventQueue: Send + Sync {
    /// Wait up to `timeout` for the next payload. `Ok(None)` on timeout.
    fn pop(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, QueueError>> + Send;

    /// Append a payload to the tail.
    fn push(&self, payload: &[u8]) -> impl Future<Output = Result<(), QueueError>> + Send;
}
