// ── VLAN change event ──
//
// Parsing and validation of the queued webhook payload:
//
//   { "model": "vlan", "event": "created"|"updated"|"deleted",
//     "data": { "site": {"id": 5}, "vid": 100, "name": "Guest", "tags": [..] },
//     "snapshots": { "prechange": { "tags": [..] } } }
//
// Anything that fails here is a `MalformedEvent` and is never retried.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use super::tag::{EmptyTagPolicy, TagSet};
use crate::error::MalformedEvent;

/// Kind of change NetBox reported.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
    Unknown,
}

impl EventKind {
    /// Unrecognized event names map to [`Unknown`](Self::Unknown).
    pub fn parse(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Unknown)
    }
}

/// 802.1Q VLAN identifier, `1..=4094`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VlanId(u16);

impl VlanId {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 4094;

    pub fn new(raw: u64) -> Option<Self> {
        u16::try_from(raw)
            .ok()
            .filter(|id| (Self::MIN..=Self::MAX).contains(id))
            .map(Self)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inventory site identifier (NetBox site primary key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SiteId(u64);

impl SiteId {
    pub fn new(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated VLAN change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: EventKind,
    pub site_id: SiteId,
    pub vlan_id: VlanId,
    pub vlan_name: String,
    pub current_tags: TagSet,
    /// Empty for [`EventKind::Created`].
    pub previous_tags: TagSet,
}

impl ChangeEvent {
    /// Parse and validate a raw queue payload.
    pub fn parse(payload: &[u8], policy: EmptyTagPolicy) -> Result<Self, MalformedEvent> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| MalformedEvent::InvalidJson(e.to_string()))?;
        Self::from_value(&value, policy)
    }

    /// Validate an already-decoded payload.
    pub fn from_value(value: &Value, policy: EmptyTagPolicy) -> Result<Self, MalformedEvent> {
        let root = value.as_object().ok_or(MalformedEvent::NotAnObject)?;

        let data = root
            .get("data")
            .and_then(Value::as_object)
            .filter(|data| !data.is_empty())
            .ok_or(MalformedEvent::MissingData)?;

        let site = data
            .get("site")
            .and_then(Value::as_object)
            .filter(|site| !site.is_empty())
            .ok_or(MalformedEvent::MissingSite)?;

        let site_id = site
            .get("id")
            .and_then(as_id)
            .and_then(SiteId::new)
            .ok_or(MalformedEvent::MissingSiteId)?;

        let (vlan_id, vlan_name) = vlan_identity(data)?;

        let kind = root
            .get("event")
            .and_then(Value::as_str)
            .map_or(EventKind::Unknown, EventKind::parse);

        let current_tags = tag_list(data.get("tags"), "data.tags", policy)?;

        let previous_tags = if kind == EventKind::Created {
            TagSet::new()
        } else {
            let prechange = value.pointer("/snapshots/prechange/tags");
            tag_list(prechange, "snapshots.prechange.tags", policy)?
        };

        Ok(Self {
            kind,
            site_id,
            vlan_id,
            vlan_name: vlan_name.to_owned(),
            current_tags,
            previous_tags,
        })
    }
}

fn vlan_identity(data: &Map<String, Value>) -> Result<(VlanId, &str), MalformedEvent> {
    let vid = data.get("vid").filter(|v| !v.is_null());
    let name = data
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty());

    let (Some(vid), Some(name)) = (vid, name) else {
        return Err(MalformedEvent::MissingVlan {
            vid: vid.map_or_else(|| "none".into(), Value::to_string),
            name: name.unwrap_or("none").to_owned(),
        });
    };

    let vlan_id = as_id(vid)
        .and_then(VlanId::new)
        .ok_or_else(|| MalformedEvent::InvalidVlanId {
            value: vid.to_string(),
        })?;

    // Names are sent to devices verbatim apart from space folding.
    if name.chars().any(char::is_control) {
        return Err(MalformedEvent::InvalidVlanName {
            name: name.to_owned(),
        });
    }

    Ok((vlan_id, name))
}

/// Integer ids arrive as JSON numbers, occasionally as numeric strings.
fn as_id(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn tag_list(
    value: Option<&Value>,
    field: &'static str,
    policy: EmptyTagPolicy,
) -> Result<TagSet, MalformedEvent> {
    match value {
        None | Some(Value::Null) => Ok(TagSet::new()),
        Some(Value::Array(items)) => Ok(TagSet::from_values(items, policy)),
        Some(_) => Err(MalformedEvent::InvalidTags { field }),
    }
}
