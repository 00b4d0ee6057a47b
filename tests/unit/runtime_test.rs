//! Tests for the tokio spawner and API views

use std::sync::Arc;

use med_supply_dispatch::builders::build_dispatcher;
use med_supply_dispatch::config::DispatchConfig;
use med_supply_dispatch::core::{Spawn, StorageItem, StorageVehicle, VehiclePhase};
use med_supply_dispatch::infra::{InMemoryDeliverySink, InMemoryEventLog};
use med_supply_dispatch::runtime::{fleet_snapshot, health, TokioSpawner};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_spawner_outside_runtime() {
    assert!(TokioSpawner::current().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_fleet_snapshot_serializes() {
    let spawner = TokioSpawner::current().unwrap();
    let dispatcher = build_dispatcher(
        DispatchConfig::default(),
        &spawner,
        Arc::new(InMemoryEventLog::new(64)),
        Arc::new(InMemoryDeliverySink::new()),
    )
    .unwrap();
    dispatcher
        .add_vehicle(StorageVehicle::new("V1", "Courier_1").unwrap())
        .unwrap();
    dispatcher.set_battery("V1", 9).unwrap();
    dispatcher.add_item(StorageItem::new("SKU1", "Gauze", 12).unwrap());

    let snapshot = fleet_snapshot(&dispatcher);
    assert_eq!(snapshot.vehicles[0].phase, VehiclePhase::Charging);
    assert_eq!(
        snapshot.vehicles[0].assigned_station.as_deref(),
        Some("CHG-DEFAULT-1")
    );
    assert!(!snapshot.vehicles[0].free);
    assert_eq!(snapshot.unassigned[0].quantity, 12);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["vehicles"][0]["phase"], "CHARGING");
    assert_eq!(json["stations"][0]["occupied"], true);
    assert_eq!(json["stats"]["pool"]["worker_count"], 10);
}

#[test]
fn test_health() {
    assert!(health().ok);
}
