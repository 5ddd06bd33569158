// ── Domain model ──
//
// Canonical types the reconciliation engine works on. Raw webhook and
// inventory payloads are normalized into these once, at the boundary.

pub mod action;
pub mod device;
pub mod event;
pub mod tag;

pub use action::{ConfigAction, DeviceResult, EventReport, Outcome};
pub use device::Device;
pub use event::{ChangeEvent, EventKind, SiteId, VlanId};
pub use tag::{EmptyTagPolicy, Tag, TagSet, extract_name, normalize_vlan_name};
