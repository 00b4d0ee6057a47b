//! Tests for configuration validation and loading

use std::time::Duration;

use med_supply_dispatch::config::{ChargingPolicy, DispatchConfig, WorkerPoolConfig};

#[test]
fn test_default_config_is_valid() {
    let cfg = DispatchConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.pool.worker_count, 10);
    assert_eq!(cfg.batch_cap, 50);
    assert_eq!(cfg.charging.charge_tick(), Duration::from_secs(20));
    assert_eq!(cfg.charging.wait_poll(), Duration::from_secs(5));
    assert_eq!(cfg.charging.wait_timeout(), Duration::from_secs(40));
}

#[test]
fn test_pool_config_invalid_width() {
    let pool = WorkerPoolConfig::new().with_worker_count(0);
    assert!(pool.validate().is_err());
    let pool = WorkerPoolConfig::new().with_max_queue_depth(0);
    assert!(pool.validate().is_err());
}

#[test]
fn test_thresholds_must_be_ordered() {
    let policy = ChargingPolicy {
        low_battery_pct: 95,
        ..ChargingPolicy::default()
    };
    assert!(policy.validate().is_err());

    let policy = ChargingPolicy {
        charged_pct: 120,
        ..ChargingPolicy::default()
    };
    assert!(policy.validate().is_err());
}

#[test]
fn test_zero_durations_rejected() {
    let mut cfg = DispatchConfig::default();
    cfg.charging.wait_poll_ms = 0;
    assert!(cfg.validate().unwrap_err().contains("charging"));

    let mut cfg = DispatchConfig::default();
    cfg.transit_ms = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = DispatchConfig::default();
    cfg.batch_cap = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_partial_json_keeps_defaults() {
    let cfg = DispatchConfig::from_json_str(
        r#"{
            "pool": { "worker_count": 4 },
            "transit_ms": 1000,
            "stations": [{ "id": "CHG-A", "name": "Ward_A" }],
            "seed_items": [{ "sku": "SKU1", "name": "Gauze", "quantity": 120 }]
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.pool.worker_count, 4);
    assert_eq!(cfg.pool.max_queue_depth, 4096);
    assert_eq!(cfg.transit(), Duration::from_secs(1));
    assert_eq!(cfg.charging, ChargingPolicy::default());
    assert_eq!(cfg.stations.len(), 1);
    assert_eq!(cfg.seed_items[0].quantity, 120);
}

#[test]
fn test_json_rejects_invalid_values() {
    assert!(DispatchConfig::from_json_str("{ not json").is_err());
    assert!(DispatchConfig::from_json_str(r#"{ "pool": { "worker_count": 0 } }"#).is_err());
}

#[test]
fn test_from_json_file() {
    let path = std::env::temp_dir().join(format!("medsupply-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, r#"{ "batch_cap": 25 }"#).unwrap();

    let cfg = DispatchConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.batch_cap, 25);
    std::fs::remove_file(&path).unwrap();

    let err = DispatchConfig::from_json_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("reading config file"));
}
