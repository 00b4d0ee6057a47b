//! Tests for error types

use med_supply_dispatch::core::{PoolError, SchedulerError};

#[test]
fn test_validation_error() {
    let err = SchedulerError::Validation("task id must not be blank".to_string());
    assert_eq!(format!("{err}"), "validation failed: task id must not be blank");
}

#[test]
fn test_not_found_error() {
    let err = SchedulerError::not_found("vehicle", "V9");
    assert_eq!(format!("{err}"), "vehicle not found: V9");
}

#[test]
fn test_collaborator_error() {
    let err = SchedulerError::Collaborator("disk full".to_string());
    assert_eq!(format!("{err}"), "collaborator error: disk full");
}

#[test]
fn test_pool_errors_convert() {
    assert!(matches!(
        SchedulerError::from(PoolError::QueueFull),
        SchedulerError::QueueFull
    ));
    assert!(matches!(
        SchedulerError::from(PoolError::PoolShutdown),
        SchedulerError::PoolShutdown
    ));
    let err = SchedulerError::from(PoolError::InvalidConfig("worker_count".into()));
    assert_eq!(format!("{err}"), "invalid configuration: worker_count");
}
