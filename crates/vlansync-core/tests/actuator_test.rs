// Actuator behavior against the in-memory switch fake.
#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use common::{FakeTransport, device};
use vlansync_core::{Actuator, ActuatorCause, TransportError, VlanId};

fn vlan(id: u64) -> VlanId {
    VlanId::new(id).unwrap()
}

fn actuator(transport: &FakeTransport) -> Actuator<FakeTransport> {
    Actuator::from_arc(Arc::new(transport.clone()))
}

// ── Add ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_is_idempotent() {
    let transport = FakeTransport::new();
    let actuator = actuator(&transport);
    let switch = device(1, 5, &["wifi"]);

    actuator.apply_add(&switch, vlan(100), "Guest Net").await.unwrap();
    let once = transport.vlans("10.0.0.1");
    actuator.apply_add(&switch, vlan(100), "Guest Net").await.unwrap();

    assert_eq!(transport.vlans("10.0.0.1"), once);
    assert_eq!(once.get(&100).map(String::as_str), Some("Guest_Net"));
}

#[tokio::test]
async fn add_renames_existing_vlan() {
    let transport = FakeTransport::new();
    transport.seed_vlan("10.0.0.1", 100, "Old_Name");
    let actuator = actuator(&transport);

    actuator
        .apply_add(&device(1, 5, &["wifi"]), vlan(100), "New Name")
        .await
        .unwrap();

    assert_eq!(
        transport.vlans("10.0.0.1").get(&100).map(String::as_str),
        Some("New_Name")
    );
}

// ── Remove ──────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_deletes_vlan() {
    let transport = FakeTransport::new();
    transport.seed_vlan("10.0.0.1", 30, "Voice");
    transport.seed_vlan("10.0.0.1", 40, "Data");
    let actuator = actuator(&transport);

    actuator.apply_remove(&device(1, 5, &[]), vlan(30)).await.unwrap();

    let remaining = transport.vlans("10.0.0.1");
    assert!(!remaining.contains_key(&30));
    assert!(remaining.contains_key(&40));
    assert_eq!(
        transport.calls()[0].1,
        vec!["configure terminal", "no vlan 30", "end"]
    );
}

#[tokio::test]
async fn removing_absent_vlan_counts_as_success() {
    let transport = FakeTransport::new();
    let actuator = actuator(&transport);

    actuator.apply_remove(&device(1, 5, &[]), vlan(30)).await.unwrap();

    assert_eq!(transport.addresses_with("no vlan 30"), vec!["10.0.0.1"]);
    assert_eq!(transport.closed(), 1);
}

// ── Session discipline ──────────────────────────────────────────────

#[tokio::test]
async fn every_session_is_closed() {
    let transport = FakeTransport::new();
    let actuator = actuator(&transport);
    let switch = device(1, 5, &[]);

    actuator.apply_add(&switch, vlan(10), "a").await.unwrap();
    actuator.apply_remove(&switch, vlan(10)).await.unwrap();
    actuator.apply_remove(&switch, vlan(10)).await.unwrap();

    assert_eq!(transport.opened(), 3);
    assert_eq!(transport.closed(), 3);
}

#[tokio::test]
async fn connect_failure_names_device_and_cause() {
    let transport = FakeTransport::new();
    transport.unreachable("10.0.0.7");
    let actuator = actuator(&transport);

    let err = actuator
        .apply_add(&device(7, 5, &[]), vlan(10), "a")
        .await
        .unwrap_err();

    assert_eq!(err.device_id, 7);
    assert_eq!(err.device, "sw-7");
    assert!(matches!(
        err.cause,
        ActuatorCause::Transport(TransportError::Connect { .. })
    ));
    assert_eq!(transport.opened(), 0);
}

#[tokio::test]
async fn device_without_address_is_not_contacted() {
    let transport = FakeTransport::new();
    let actuator = actuator(&transport);
    let mut switch = device(1, 5, &[]);
    switch.management_address = None;

    let err = actuator.apply_add(&switch, vlan(10), "a").await.unwrap_err();

    assert!(matches!(err.cause, ActuatorCause::NoManagementAddress));
    assert!(transport.calls().is_empty());
}
