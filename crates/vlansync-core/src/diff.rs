// ── Change diff engine ──
//
// Pure: no I/O, deterministic, total over its inputs.

use crate::model::{EventKind, TagSet};

/// Tags that disappeared from a VLAN, and the tags it carries now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDiff {
    /// `previous − current`; always empty for a created VLAN.
    pub removed: TagSet,
    /// The current tags, unchanged.
    pub current: TagSet,
}

/// Compute which tags were removed by a change.
///
/// A created VLAN has no prior state, so `previous` is ignored for it.
pub fn diff(kind: EventKind, current: &TagSet, previous: &TagSet) -> TagDiff {
    let removed = match kind {
        EventKind::Created => TagSet::new(),
        EventKind::Updated | EventKind::Deleted | EventKind::Unknown => {
            previous.difference(current)
        }
    };

    TagDiff {
        removed,
        current: current.clone(),
    }
}
