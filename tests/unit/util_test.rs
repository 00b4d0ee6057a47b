//! Tests for utility functions

use std::time::Duration;

use med_supply_dispatch::core::SchedulerError;
use med_supply_dispatch::util::{
    is_valid_equipment_name, require_equipment_name, require_non_blank, Clock, TokioClock,
};

#[test]
fn test_require_non_blank_trims() {
    assert_eq!(require_non_blank("  V1 ", "vehicle id").unwrap(), "V1");
    assert!(matches!(
        require_non_blank(" \t", "vehicle id"),
        Err(SchedulerError::Validation(_))
    ));
}

#[test]
fn test_equipment_names() {
    assert!(is_valid_equipment_name("AGV-01"));
    assert!(is_valid_equipment_name("Default_Station_1"));
    assert!(!is_valid_equipment_name("A"));
    assert!(!is_valid_equipment_name("has space"));
    assert!(!is_valid_equipment_name(&"x".repeat(41)));
    assert!(require_equipment_name("Bad/Name", "station").is_err());
}

#[tokio::test(start_paused = true)]
async fn test_tokio_clock_sleep_advances_virtual_time() {
    let clock = TokioClock;
    let start = clock.now();
    clock.sleep(Duration::from_secs(3600)).await;
    assert_eq!(clock.now() - start, Duration::from_secs(3600));
}

#[test]
fn test_init_tracing_is_repeatable() {
    med_supply_dispatch::util::init_tracing();
    med_supply_dispatch::util::init_tracing();
    tracing::info!("subscriber installed");
}
