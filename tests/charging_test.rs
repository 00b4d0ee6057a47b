//! Integration tests for the charging state machine and station contention
//!
//! These tests validate:
//! - Battery validation with check-then-set atomicity
//! - Charge loops releasing stations at the charged threshold
//! - The bounded wait queue and its abandonment
//! - Station exclusivity under concurrent low-battery updates

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::time::Duration;

use med_supply_dispatch::builders::build_dispatcher;
use med_supply_dispatch::config::DispatchConfig;
use med_supply_dispatch::core::{
    ChargingStation, Dispatcher, SchedulerError, StationPool, StorageItem, StorageVehicle,
    Transition, VehiclePhase,
};
use med_supply_dispatch::infra::{InMemoryDeliverySink, InMemoryEventLog};
use med_supply_dispatch::runtime::TokioSpawner;
use med_supply_dispatch::util::init_test_tracing;
use rand::Rng;

// ============================================================================
// HELPERS
// ============================================================================

fn dispatcher_with_stations(stations: usize) -> (Dispatcher, Arc<InMemoryEventLog>) {
    init_test_tracing();
    let mut cfg = DispatchConfig::default();
    cfg.stations.truncate(stations);
    let spawner = TokioSpawner::current().unwrap();
    let events = Arc::new(InMemoryEventLog::new(4096));
    let dispatcher = build_dispatcher(
        cfg,
        &spawner,
        events.clone(),
        Arc::new(InMemoryDeliverySink::new()),
    )
    .unwrap();
    (dispatcher, events)
}

fn add_vehicles(dispatcher: &Dispatcher, ids: &[&str]) {
    for id in ids {
        dispatcher
            .add_vehicle(StorageVehicle::new(id, &format!("Courier_{id}")).unwrap())
            .unwrap();
    }
}

fn phase(dispatcher: &Dispatcher, id: &str) -> VehiclePhase {
    dispatcher.vehicle(id).unwrap().charge_state().phase()
}

/// Charging ⇒ assigned station, and no station held twice.
fn assert_station_invariants(dispatcher: &Dispatcher) {
    let mut held = HashSet::new();
    for v in dispatcher.vehicles() {
        assert_eq!(v.is_charging(), v.assigned_station().is_some(), "{}", v.id());
        if let Some(station) = v.assigned_station() {
            assert!(held.insert(station.to_ascii_lowercase()), "station {station} held twice");
        }
    }
    let occupied = dispatcher.stations().iter().filter(|s| s.is_occupied()).count();
    assert_eq!(occupied, held.len());
}

// ============================================================================
// BATTERY VALIDATION
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_battery_in_range_is_applied_and_out_of_range_rejected() {
    let (d, _) = dispatcher_with_stations(3);
    add_vehicles(&d, &["V1"]);
    let mut rng = rand::rng();

    for _ in 0..200 {
        let pct: i32 = rng.random_range(0..=100);
        d.set_battery("V1", pct).unwrap();
        assert_eq!(i32::from(d.vehicle("V1").unwrap().battery_pct()), pct);
    }

    let before = d.vehicle("V1").unwrap();
    for _ in 0..50 {
        let pct: i32 = if rng.random_bool(0.5) {
            rng.random_range(101..=1_000)
        } else {
            rng.random_range(-1_000..0)
        };
        let err = d.set_battery("V1", pct).unwrap_err();
        assert!(matches!(err, SchedulerError::Validation(_)));
    }
    let after = d.vehicle("V1").unwrap();
    assert_eq!(after.battery_pct(), before.battery_pct());
    assert_eq!(after.charge_state(), before.charge_state());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_vehicle_is_not_found() {
    let (d, _) = dispatcher_with_stations(1);
    assert!(matches!(
        d.set_battery("ghost", 10),
        Err(SchedulerError::NotFound { kind: "vehicle", .. })
    ));
}

// ============================================================================
// CHARGING
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_charge_episode_runs_to_threshold() {
    let (d, events) = dispatcher_with_stations(1);
    add_vehicles(&d, &["V1"]);

    let transition = d.set_battery("V1", 10).unwrap();
    assert!(matches!(transition, Transition::StartedCharging(ref lease) if lease.id == "CHG-DEFAULT-1"));
    assert!(d.stations()[0].is_occupied());
    assert_eq!(d.stats().active_episodes, 1);

    // 10% → 95% in 17 ticks of 20s.
    tokio::time::sleep(Duration::from_secs(16 * 20 + 1)).await;
    assert_eq!(d.vehicle("V1").unwrap().battery_pct(), 90);
    assert_eq!(phase(&d, "V1"), VehiclePhase::Charging);

    tokio::time::sleep(Duration::from_secs(20)).await;
    let v1 = d.vehicle("V1").unwrap();
    assert_eq!(v1.battery_pct(), 95);
    assert_eq!(phase(&d, "V1"), VehiclePhase::Idle);
    assert!(!d.stations()[0].is_occupied());
    assert_eq!(d.stats().active_episodes, 0);
    assert!(events
        .messages_for("V1")
        .iter()
        .any(|m| m.contains("released station CHG-DEFAULT-1")));
}

#[tokio::test(start_paused = true)]
async fn test_external_full_charge_finishes_episode() {
    let (d, _) = dispatcher_with_stations(1);
    add_vehicles(&d, &["V1"]);
    d.set_battery("V1", 12).unwrap();

    let transition = d.set_battery("V1", 97).unwrap();
    assert_eq!(
        transition,
        Transition::FinishedCharging {
            station_id: "CHG-DEFAULT-1".into()
        }
    );
    assert_eq!(phase(&d, "V1"), VehiclePhase::Idle);
    assert!(!d.finish_charging("V1").unwrap());

    // The cancelled loop never ticks again.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(d.vehicle("V1").unwrap().battery_pct(), 97);
}

// ============================================================================
// WAIT QUEUE
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_waiting_vehicle_leaves_queue_after_timeout() {
    let (d, events) = dispatcher_with_stations(0);
    add_vehicles(&d, &["V1"]);

    assert_eq!(d.set_battery("V1", 10).unwrap(), Transition::StartedWaiting);
    assert_eq!(phase(&d, "V1"), VehiclePhase::Waiting);

    // Timeout is 40s, checked on every 5s poll: still waiting at 40s.
    tokio::time::sleep(Duration::from_secs(42)).await;
    assert_eq!(phase(&d, "V1"), VehiclePhase::Waiting);

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(phase(&d, "V1"), VehiclePhase::LeftQueue);
    assert!(events
        .messages_for("V1")
        .iter()
        .any(|m| m.contains("left the charging queue")));

    // A station appearing later does not revive the episode.
    d.add_charging_station(ChargingStation::new("CHG-LATE", "Late_Station").unwrap())
        .unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(phase(&d, "V1"), VehiclePhase::LeftQueue);

    // Vehicles out of the queue are not free.
    d.add_item(StorageItem::new("SKU1", "Gauze", 5).unwrap());
    let report = d.auto_distribute("PASS-1").unwrap();
    assert!(report.batches.is_empty());

    // A fresh low reading opens a new episode.
    let transition = d.set_battery("V1", 8).unwrap();
    assert!(matches!(transition, Transition::StartedCharging(ref lease) if lease.id == "CHG-LATE"));
}

#[tokio::test(start_paused = true)]
async fn test_waiting_vehicle_takes_released_station() {
    let (d, _) = dispatcher_with_stations(1);
    add_vehicles(&d, &["V1", "V2"]);

    d.set_battery("V1", 10).unwrap();
    assert_eq!(d.set_battery("V2", 10).unwrap(), Transition::StartedWaiting);

    tokio::time::sleep(Duration::from_secs(12)).await;
    d.set_battery("V1", 95).unwrap();
    assert_eq!(phase(&d, "V2"), VehiclePhase::Waiting);

    // Next poll at 15s claims the freed station.
    tokio::time::sleep(Duration::from_secs(4)).await;
    let v2 = d.vehicle("V2").unwrap();
    assert_eq!(v2.assigned_station(), Some("CHG-DEFAULT-1"));
    assert_station_invariants(&d);
}

#[tokio::test(start_paused = true)]
async fn test_waiting_vehicle_ignores_full_battery_reading() {
    let (d, _) = dispatcher_with_stations(0);
    add_vehicles(&d, &["V1"]);
    d.set_battery("V1", 10).unwrap();

    assert_eq!(d.set_battery("V1", 99).unwrap(), Transition::Unchanged);
    assert_eq!(phase(&d, "V1"), VehiclePhase::Waiting);
}

// ============================================================================
// EXCLUSIVITY
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_low_battery_never_shares_a_station() {
    let (d, _) = dispatcher_with_stations(3);
    let ids: Vec<String> = (0..8).map(|i| format!("V{i}")).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    add_vehicles(&d, &id_refs);

    std::thread::scope(|scope| {
        for id in &ids {
            let d = d.clone();
            scope.spawn(move || {
                d.set_battery(id, 5).unwrap();
            });
        }
    });

    let charging = d.vehicles().iter().filter(|v| v.is_charging()).count();
    let waiting = d.vehicles().iter().filter(|v| v.is_waiting()).count();
    assert_eq!((charging, waiting), (3, 5));
    assert_station_invariants(&d);

    // Sample the invariants through waits, timeouts and full charges.
    for _ in 0..80 {
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_station_invariants(&d);
    }
    assert_eq!(d.stations().iter().filter(|s| s.is_occupied()).count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_finish_racing_low_battery_never_strands_a_station() {
    let (d, _) = dispatcher_with_stations(1);
    add_vehicles(&d, &["V1"]);

    for trial in 0..400 {
        d.set_battery("V1", 10).unwrap();
        assert!(d.vehicle("V1").unwrap().is_charging());

        let barrier = Barrier::new(2);
        std::thread::scope(|scope| {
            for pct in [96, 10] {
                let (d, barrier) = (&d, &barrier);
                scope.spawn(move || {
                    barrier.wait();
                    d.set_battery("V1", pct).unwrap();
                });
            }
        });

        // Charging always comes with a live charge loop to end it.
        let v1 = d.vehicle("V1").unwrap();
        let expected_units = usize::from(v1.is_charging());
        assert_eq!(d.stats().active_episodes, expected_units, "trial {trial}");
        assert_station_invariants(&d);

        d.set_battery("V1", 96).unwrap();
        assert_eq!(d.stats().active_episodes, 0, "trial {trial}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_dropping_dispatcher_stops_charge_loops() {
    let (d, events) = dispatcher_with_stations(1);
    add_vehicles(&d, &["V1"]);
    d.set_battery("V1", 10).unwrap();

    tokio::time::sleep(Duration::from_secs(41)).await;
    let ticks_before = events.messages_for("V1").len();
    drop(d);

    tokio::time::sleep(Duration::from_secs(200)).await;
    assert_eq!(events.messages_for("V1").len(), ticks_before);
}

// ============================================================================
// MANUAL OCCUPANCY
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_manual_occupancy_respects_charging_vehicles() {
    let (d, events) = dispatcher_with_stations(2);
    add_vehicles(&d, &["V1", "V2"]);

    d.set_station_occupancy("CHG-DEFAULT-1", true).unwrap();
    d.set_battery("V1", 10).unwrap();
    assert_eq!(
        d.vehicle("V1").unwrap().assigned_station(),
        Some("CHG-DEFAULT-2")
    );

    assert!(matches!(
        d.set_station_occupancy("chg-default-2", false),
        Err(SchedulerError::Validation(_))
    ));
    assert!(d.stations()[1].is_occupied());
    assert!(matches!(
        d.set_station_occupancy("CHG-MISSING", true),
        Err(SchedulerError::NotFound { kind: "station", .. })
    ));

    // Freeing the manual hold lets the next low vehicle charge there.
    d.set_station_occupancy("CHG-DEFAULT-1", false).unwrap();
    assert!(events
        .messages_for("CHG-DEFAULT-1")
        .iter()
        .any(|m| m.contains("marked free")));
    d.set_battery("V2", 10).unwrap();
    assert_eq!(
        d.vehicle("V2").unwrap().assigned_station(),
        Some("CHG-DEFAULT-1")
    );
    assert_station_invariants(&d);
}

#[test]
fn test_parallel_allocate_hands_out_each_station_once() {
    let pool = Arc::new(StationPool::new());
    for i in 0..4 {
        pool.add(ChargingStation::new(&format!("S{i}"), &format!("Station_{i}")).unwrap())
            .unwrap();
    }

    let leases: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let pool = Arc::clone(&pool);
                scope.spawn(move || pool.allocate())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let granted: Vec<_> = leases.into_iter().flatten().collect();
    assert_eq!(granted.len(), 4);
    let unique: HashSet<_> = granted.iter().map(|l| l.id.clone()).collect();
    assert_eq!(unique.len(), 4);
    assert_eq!(pool.free_count(), 0);
}
