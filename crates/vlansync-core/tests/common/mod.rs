// Shared fakes for the reconciliation tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use vlansync_core::{
    Device, DeviceSession, DeviceTransport, Inventory, InventoryError, SiteId, TagSet,
    TransportError,
};

// ── Devices ─────────────────────────────────────────────────────────

pub fn device(id: u64, site: u64, tags: &[&str]) -> Device {
    Device {
        id,
        name: format!("sw-{id}"),
        site_id: SiteId::new(site).unwrap(),
        tags: tags.iter().copied().collect::<TagSet>(),
        management_address: Some(format!("10.0.0.{id}")),
        active: true,
    }
}

// ── Inventory ───────────────────────────────────────────────────────

/// Returns the active devices of the queried site from a fixed list.
#[derive(Default)]
pub struct FakeInventory {
    devices: Vec<Device>,
    fail: bool,
    queries: AtomicUsize,
}

impl FakeInventory {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Inventory for FakeInventory {
    async fn query_active_devices(&self, site_id: SiteId) -> Result<Vec<Device>, InventoryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(InventoryError::Unreachable {
                message: "connection refused".into(),
            });
        }
        Ok(self
            .devices
            .iter()
            .filter(|d| d.site_id == site_id && d.active)
            .cloned()
            .collect())
    }
}

// ── Device transport ────────────────────────────────────────────────

#[derive(Default)]
pub struct TransportState {
    /// address -> (vlan id -> name)
    pub vlans: BTreeMap<String, BTreeMap<u16, String>>,
    pub unreachable: HashSet<String>,
    pub opened: usize,
    pub closed: usize,
    /// (address, command set) per session, in order.
    pub calls: Vec<(String, Vec<String>)>,
}

/// In-memory switches that interpret the IOS-style command sets.
#[derive(Clone, Default)]
pub struct FakeTransport {
    pub state: Arc<Mutex<TransportState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable(&self, address: &str) {
        self.state.lock().unwrap().unreachable.insert(address.to_owned());
    }

    pub fn seed_vlan(&self, address: &str, vlan: u16, name: &str) {
        self.state
            .lock()
            .unwrap()
            .vlans
            .entry(address.to_owned())
            .or_default()
            .insert(vlan, name.to_owned());
    }

    pub fn vlans(&self, address: &str) -> BTreeMap<u16, String> {
        self.state.lock().unwrap().vlans.get(address).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }

    /// Addresses that received a command set containing `command`.
    pub fn addresses_with(&self, command: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(_, commands)| commands.iter().any(|c| c == command))
            .map(|(address, _)| address)
            .collect()
    }
}

impl DeviceTransport for FakeTransport {
    type Session = FakeSession;

    fn open(&self, address: &str) -> Result<FakeSession, TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable.contains(address) {
            return Err(TransportError::Connect {
                address: address.to_owned(),
                reason: "no route to host".into(),
            });
        }
        state.opened += 1;
        Ok(FakeSession {
            state: Arc::clone(&self.state),
            address: address.to_owned(),
        })
    }
}

pub struct FakeSession {
    state: Arc<Mutex<TransportState>>,
    address: String,
}

impl DeviceSession for FakeSession {
    fn send_config_set(&mut self, commands: &[String]) -> Result<String, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((self.address.clone(), commands.to_vec()));

        let vlans = state.vlans.entry(self.address.clone()).or_default();
        let mut selected: Option<u16> = None;
        for command in commands {
            if let Some(id) = command.strip_prefix("no vlan ") {
                let id: u16 = id.parse().unwrap();
                if vlans.remove(&id).is_none() {
                    return Err(TransportError::CommandRejected {
                        message: format!("% VLAN {id} not found in current VLAN database"),
                    });
                }
            } else if let Some(id) = command.strip_prefix("vlan ") {
                let id: u16 = id.parse().unwrap();
                vlans.entry(id).or_default();
                selected = Some(id);
            } else if let Some(name) = command.strip_prefix("name ") {
                let id = selected.unwrap();
                vlans.insert(id, name.to_owned());
            }
        }
        Ok(String::new())
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.closed += 1;
        }
    }
}

// ── Payloads ────────────────────────────────────────────────────────

pub fn tag_objects(names: &[&str]) -> Value {
    Value::Array(names.iter().map(|n| json!({ "name": n })).collect())
}

pub fn payload(event: &str, vid: u64, name: &str, tags: &[&str], prechange: &[&str]) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "model": "vlan",
        "event": event,
        "data": {
            "site": { "id": 5 },
            "vid": vid,
            "name": name,
            "tags": tag_objects(tags),
        },
        "snapshots": { "prechange": { "tags": tag_objects(prechange) } }
    }))
    .unwrap()
}
