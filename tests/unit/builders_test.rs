//! Tests for the dispatcher builder

use std::sync::Arc;

use med_supply_dispatch::builders::{build_dispatcher, build_dispatcher_with};
use med_supply_dispatch::config::{DispatchConfig, ItemSeed, StationSeed};
use med_supply_dispatch::core::{Collaborators, SchedulerError};
use med_supply_dispatch::infra::{InMemoryDeliverySink, TracingEventLog};
use med_supply_dispatch::runtime::TokioSpawner;
use med_supply_dispatch::util::TokioClock;

#[tokio::test]
async fn test_build_seeds_default_stations() {
    let spawner = TokioSpawner::current().unwrap();
    let dispatcher = build_dispatcher(
        DispatchConfig::default(),
        &spawner,
        Arc::new(TracingEventLog),
        Arc::new(InMemoryDeliverySink::new()),
    )
    .unwrap();

    let stations = dispatcher.stations();
    let ids: Vec<&str> = stations.iter().map(|s| s.id()).collect();
    assert_eq!(ids, vec!["CHG-DEFAULT-1", "CHG-DEFAULT-2", "CHG-DEFAULT-3"]);
    assert_eq!(stations[2].name(), "Default_Station_3");
    assert!(stations.iter().all(|s| !s.is_occupied()));
    assert!(dispatcher.unassigned_items().is_empty());
}

#[tokio::test]
async fn test_build_loads_seed_items() {
    let mut cfg = DispatchConfig::default();
    cfg.seed_items = vec![
        ItemSeed {
            sku: "SKU1".into(),
            name: "Gauze".into(),
            quantity: 40,
        },
        ItemSeed {
            sku: "SKU1".into(),
            name: "Gauze".into(),
            quantity: 2,
        },
    ];
    let spawner = TokioSpawner::current().unwrap();
    let collaborators = Collaborators::new(
        Arc::new(TracingEventLog),
        Arc::new(InMemoryDeliverySink::new()),
    )
    .with_clock(Arc::new(TokioClock));
    let dispatcher = build_dispatcher_with(cfg, &spawner, collaborators).unwrap();

    let pooled = dispatcher.unassigned_items();
    assert_eq!(pooled.len(), 1);
    assert_eq!(pooled[0].quantity(), 42);
}

#[tokio::test]
async fn test_build_rejects_invalid_config() {
    let mut cfg = DispatchConfig::default();
    cfg.charging.charge_step_pct = 0;
    let spawner = TokioSpawner::current().unwrap();
    let result = build_dispatcher(
        cfg,
        &spawner,
        Arc::new(TracingEventLog),
        Arc::new(InMemoryDeliverySink::new()),
    );
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_build_rejects_bad_seed_station() {
    let mut cfg = DispatchConfig::default();
    cfg.stations.push(StationSeed {
        id: "CHG-DEFAULT-1".into(),
        name: "Duplicate".into(),
    });
    let spawner = TokioSpawner::current().unwrap();
    let result = build_dispatcher(
        cfg,
        &spawner,
        Arc::new(TracingEventLog),
        Arc::new(InMemoryDeliverySink::new()),
    );
    assert!(matches!(result, Err(SchedulerError::Validation(_))));
}
