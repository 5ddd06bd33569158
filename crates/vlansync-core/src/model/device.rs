// ── Device domain type ──

use std::fmt;

use super::event::SiteId;
use super::tag::TagSet;

/// A switch as seen by the reconciliation engine.
///
/// Owned by the inventory; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: u64,
    pub name: String,
    pub site_id: SiteId,
    pub tags: TagSet,
    /// Primary management address (host only, no prefix length).
    pub management_address: Option<String>,
    pub active: bool,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
