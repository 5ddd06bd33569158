use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use super::EventQueue;
use crate::error::QueueError;

/// Process-local [`EventQueue`].
#[derive(Debug, Default)]
pub struct MemoryQueue {
    items: Mutex<VecDeque<Vec<u8>>>,
    notify: Notify,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Vec<u8>>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take(&self) -> Option<Vec<u8>> {
        self.lock().pop_front()
    }
}

impl EventQueue for MemoryQueue {
    async fn pop(&self, timeout: Duration) -> Result<Option<Vec<u8>>, QueueError> {
        let deadline = Instant::now() + timeout;
        loop {
            // Register interest before checking, so a push in between is not missed.
            let notified = self.notify.notified();
            if let Some(item) = self.take() {
                return Ok(Some(item));
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(self.take());
            }
        }
    }

    async fn push(&self, payload: &[u8]) -> Result<(), QueueError> {
        self.lock().push_back(payload.to_vec());
        self.notify.notify_one();
        Ok(())
    }
}
