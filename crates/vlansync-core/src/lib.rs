//! VLAN reconciliation engine between NetBox and managed switches.
//!
//! When a VLAN's tags change in NetBox, every switch whose own tags
//! intersect the VLAN's tags must carry the VLAN, and switches that lost
//! their last matching tag must drop it. This crate owns that decision
//! logic and the plumbing traits it is driven through:
//!
//! - **[`ChangeEvent`]**: a validated VLAN change notification, parsed
//!   from the raw webhook payload with tags normalized into a [`TagSet`].
//!
//! - **[`diff()`]**: pure computation of removed vs. current tags.
//!
//! - **[`target_devices()`]**: selects active devices at a site whose tags
//!   intersect a tag set, through the [`Inventory`] trait
//!   ([`NetboxInventory`] in production).
//!
//! - **[`Actuator`]**: applies add/remove [`ConfigAction`]s over scoped
//!   sessions from a [`DeviceTransport`] ([`SshTransport`] in production).
//!
//! - **[`Reconciler`]**: the single-worker loop: pop from an
//!   [`EventQueue`], validate, throttle, diff, target, actuate, isolate
//!   failures per device and per event.
//!
//! - **[`IngestGate`]**: signature, model, and `Protected` checks that
//!   guard what reaches the queue.

pub mod actuator;
pub mod config;
pub mod diff;
pub mod error;
pub mod gate;
pub mod model;
pub mod queue;
pub mod reconcile;
pub mod targeting;

// ── Primary re-exports ──────────────────────────────────────────────
pub use actuator::ssh::{SshConfig, SshSession, SshTransport};
pub use actuator::{Actuator, DeviceSession, DeviceTransport};
pub use config::ReconcilerConfig;
pub use diff::{TagDiff, diff};
pub use error::{
    ActuatorCause, ActuatorError, EventError, InventoryError, InventoryUnavailable,
    MalformedEvent, QueueError, TransportError,
};
pub use gate::{Accepted, GateError, IngestGate};
pub use queue::memory::MemoryQueue;
pub use queue::redis::RedisQueue;
pub use queue::EventQueue;
pub use reconcile::{Reconciler, RunStats};
pub use targeting::{Inventory, NetboxInventory, target_devices};

pub use model::{
    ChangeEvent, ConfigAction, Device, DeviceResult, EmptyTagPolicy, EventKind, EventReport,
    Outcome, SiteId, Tag, TagSet, VlanId, extract_name, normalize_vlan_name,
};
