// ── Reconciliation loop ──
//
// Single worker: one event at a time, in queue order. Per-device
// failures are recorded and never stop sibling devices; per-event
// failures are logged and never stop the loop. The queue wait is the
// only point where shutdown is observed, so an event that has been
// popped always runs to completion.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::actuator::{Actuator, DeviceTransport};
use crate::config::ReconcilerConfig;
use crate::diff::diff;
use crate::error::{EventError, InventoryUnavailable};
use crate::model::{ChangeEvent, ConfigAction, Device, EventKind, EventReport, Outcome};
use crate::queue::EventQueue;
use crate::targeting::{Inventory, target_devices};

/// Counters for one [`Reconciler::run`], returned on shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Events that reached the diff/targeting stage.
    pub processed: u64,
    /// Payloads dropped as malformed.
    pub rejected: u64,
    /// Events abandoned because the inventory was unavailable.
    pub failed_events: u64,
    /// Individual device actions that failed.
    pub device_failures: u64,
    pub queue_errors: u64,
}

/// Worker wiring: queue in, inventory and devices out.
pub struct Reconciler<Q, I, T> {
    queue: Q,
    inventory: I,
    actuator: Actuator<T>,
    config: ReconcilerConfig,
}

impl<Q, I, T> Reconciler<Q, I, T>
where
    Q: EventQueue,
    I: Inventory,
    T: DeviceTransport,
{
    pub fn new(queue: Q, inventory: I, actuator: Actuator<T>, config: ReconcilerConfig) -> Self {
        Self {
            queue,
            inventory,
            actuator,
            config,
        }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    pub fn actuator(&self) -> &Actuator<T> {
        &self.actuator
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Process events until `shutdown` is cancelled.
    ///
    /// Cancellation is checked between events and while waiting on the
    /// queue; it never interrupts an event already popped.
    pub async fn run(&self, shutdown: CancellationToken) -> RunStats {
        let mut stats = RunStats::default();
        info!(
            throttle_secs = self.config.throttle.as_secs(),
            pop_timeout_ms = millis(self.config.pop_timeout),
            "worker started"
        );

        while !shutdown.is_cancelled() {
            let popped = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                popped = self.queue.pop(self.config.pop_timeout) => popped,
            };

            let payload = match popped {
                Ok(Some(payload)) => payload,
                Ok(None) => continue,
                Err(e) => {
                    stats.queue_errors += 1;
                    error!(error = %e, "queue pop failed");
                    backoff(&shutdown, self.config.pop_timeout).await;
                    continue;
                }
            };

            match self.process_payload(&payload).await {
                Ok(report) => {
                    stats.processed += 1;
                    stats.device_failures += u64::try_from(report.failed()).unwrap_or(u64::MAX);
                }
                Err(EventError::Malformed(_)) => stats.rejected += 1,
                Err(EventError::InventoryUnavailable(_)) => stats.failed_events += 1,
            }
        }

        info!(
            processed = stats.processed,
            rejected = stats.rejected,
            failed_events = stats.failed_events,
            device_failures = stats.device_failures,
            "worker stopped"
        );
        stats
    }

    /// Validate, throttle and reconcile one raw payload.
    pub async fn process_payload(&self, payload: &[u8]) -> Result<EventReport, EventError> {
        let event = match ChangeEvent::parse(payload, self.config.empty_tags) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, bytes = payload.len(), "dropping malformed event");
                return Err(e.into());
            }
        };

        info!(
            event_kind = %event.kind,
            site_id = %event.site_id,
            vlan_id = %event.vlan_id,
            vlan_name = %event.vlan_name,
            tags = %event.current_tags,
            "processing VLAN event"
        );

        if !self.config.throttle.is_zero() {
            debug!(delay_ms = millis(self.config.throttle), "throttling before inventory lookup");
            tokio::time::sleep(self.config.throttle).await;
        }

        match self.reconcile(&event).await {
            Ok(report) => {
                info!(
                    event_kind = %report.kind,
                    vlan_id = %report.vlan_id,
                    removed_tags = %report.removed_tags,
                    succeeded = report.succeeded(),
                    failed = report.failed(),
                    "VLAN event reconciled"
                );
                Ok(report)
            }
            Err(e) => {
                error!(
                    event_kind = %event.kind,
                    vlan_id = %event.vlan_id,
                    site_id = %e.site_id,
                    error = %e.source,
                    "inventory unavailable, dropping event"
                );
                Err(e.into())
            }
        }
    }

    /// Apply one validated event: removals for devices that lost their
    /// last matching tag, then adds for every device matching now.
    pub async fn reconcile(&self, event: &ChangeEvent) -> Result<EventReport, InventoryUnavailable> {
        let mut report = EventReport::new(event);
        let tag_diff = diff(event.kind, &event.current_tags, &event.previous_tags);
        report.removed_tags = tag_diff.removed.clone();

        if event.kind != EventKind::Created && !tag_diff.removed.is_empty() {
            info!(vlan_id = %event.vlan_id, removed = %tag_diff.removed, "tags removed from VLAN");
            let candidates =
                target_devices(&self.inventory, event.site_id, &tag_diff.removed).await?;
            let action = ConfigAction::remove(event.vlan_id);

            for device in &candidates {
                if device.tags.intersects(&tag_diff.current) {
                    debug!(device = %device.name, "device still matches current tags, keeping VLAN");
                    continue;
                }
                self.apply(event, device, &action, &mut report).await;
            }
        }

        if tag_diff.current.is_empty() {
            debug!(vlan_id = %event.vlan_id, "VLAN has no tags, nothing to apply");
            return Ok(report);
        }

        let targets = target_devices(&self.inventory, event.site_id, &tag_diff.current).await?;
        if targets.is_empty() {
            warn!(
                site_id = %event.site_id,
                vlan_id = %event.vlan_id,
                tags = %tag_diff.current,
                "no matching switches found"
            );
            report.no_targets = true;
            return Ok(report);
        }

        let action = ConfigAction::add(event.vlan_id, &event.vlan_name);
        for device in &targets {
            self.apply(event, device, &action, &mut report).await;
        }

        Ok(report)
    }

    async fn apply(
        &self,
        event: &ChangeEvent,
        device: &Device,
        action: &ConfigAction,
        report: &mut EventReport,
    ) {
        match self.actuator.apply(device, action).await {
            Ok(()) => {
                info!(device = %device.name, %action, "VLAN configured");
                report.record(device, action.clone(), Outcome::Success);
            }
            Err(e) => {
                error!(
                    device = %device.name,
                    device_id = device.id,
                    vlan_id = %event.vlan_id,
                    event_kind = %event.kind,
                    error = %e.cause,
                    "failed to {action}"
                );
                report.record(device, action.clone(), Outcome::Failure(e.cause.to_string()));
            }
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Sleep for `delay` unless shutdown arrives first.
async fn backoff(shutdown: &CancellationToken, delay: Duration) {
    tokio::select! {
        () = shutdown.cancelled() => {}
        () = tokio::time::sleep(delay) => {}
    }
}
