// ── Reconciler runtime configuration ──
//
// Built by the config crate from file/env layers; the engine only sees
// this resolved form.

use std::time::Duration;

use crate::model::EmptyTagPolicy;

/// Tunables for the worker loop.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Pause between dequeuing an event and reading inventory, so that
    /// NetBox has committed related changes.
    pub throttle: Duration,
    /// Upper bound on one blocking queue pop; also the back-off after a
    /// queue error and the worst-case shutdown latency.
    pub pop_timeout: Duration,
    pub empty_tags: EmptyTagPolicy,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            throttle: Duration::from_secs(15),
            pop_timeout: Duration::from_secs(1),
            empty_tags: EmptyTagPolicy::default(),
        }
    }
}
