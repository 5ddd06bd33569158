// ── Configuration actions and per-event reports ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::device::Device;
use super::event::{ChangeEvent, EventKind, SiteId, VlanId};
use super::tag::{TagSet, normalize_vlan_name};

/// One configuration change against one device. Built per pass, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ConfigAction {
    /// Create the VLAN, or rename it if it already exists.
    Add { vlan_id: VlanId, name: String },
    Remove { vlan_id: VlanId },
}

impl ConfigAction {
    /// Add action with the device-facing (space-folded) name.
    pub fn add(vlan_id: VlanId, vlan_name: &str) -> Self {
        Self::Add {
            vlan_id,
            name: normalize_vlan_name(vlan_name),
        }
    }

    pub fn remove(vlan_id: VlanId) -> Self {
        Self::Remove { vlan_id }
    }

    pub fn vlan_id(&self) -> VlanId {
        match self {
            Self::Add { vlan_id, .. } | Self::Remove { vlan_id } => *vlan_id,
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, Self::Remove { .. })
    }

    /// Line-oriented command set, bracketed by config-mode entry and exit.
    pub fn commands(&self) -> Vec<String> {
        match self {
            Self::Add { vlan_id, name } => vec![
                "configure terminal".into(),
                format!("vlan {vlan_id}"),
                format!("name {name}"),
                "end".into(),
            ],
            Self::Remove { vlan_id } => vec![
                "configure terminal".into(),
                format!("no vlan {vlan_id}"),
                "end".into(),
            ],
        }
    }
}

impl fmt::Display for ConfigAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add { vlan_id, name } => write!(f, "add VLAN {vlan_id} ({name})"),
            Self::Remove { vlan_id } => write!(f, "remove VLAN {vlan_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of one action on one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceResult {
    pub device_id: u64,
    pub device_name: String,
    pub action: ConfigAction,
    pub outcome: Outcome,
}

/// Everything one event did, for logging and tests. Not persisted.
#[derive(Debug, Clone, Serialize)]
pub struct EventReport {
    pub kind: EventKind,
    pub site_id: SiteId,
    pub vlan_id: VlanId,
    pub started_at: DateTime<Utc>,
    pub removed_tags: TagSet,
    pub results: Vec<DeviceResult>,
    /// The apply phase found no device to configure.
    pub no_targets: bool,
}

impl EventReport {
    pub fn new(event: &ChangeEvent) -> Self {
        Self {
            kind: event.kind,
            site_id: event.site_id,
            vlan_id: event.vlan_id,
            started_at: Utc::now(),
            removed_tags: TagSet::new(),
            results: Vec::new(),
            no_targets: false,
        }
    }

    pub fn record(&mut self, device: &Device, action: ConfigAction, outcome: Outcome) {
        self.results.push(DeviceResult {
            device_id: device.id,
            device_name: device.name.clone(),
            action,
            outcome,
        });
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// Results for one action kind, in application order.
    pub fn removals(&self) -> impl Iterator<Item = &DeviceResult> {
        self.results.iter().filter(|r| r.action.is_remove())
    }

    pub fn additions(&self) -> impl Iterator<Item = &DeviceResult> {
        self.results.iter().filter(|r| !r.action.is_remove())
    }
}
