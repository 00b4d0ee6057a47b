//! Tests for the event log and delivery sinks

use med_supply_dispatch::core::{
    report_delivery, report_event, DeliverySink, EventCategory, EventLog, SchedulerError,
};
use med_supply_dispatch::infra::{CsvDeliverySink, InMemoryDeliverySink, InMemoryEventLog};

struct BrokenSink;

impl DeliverySink for BrokenSink {
    fn record_delivery(&self, _: &str, _: &str, _: u32) -> Result<(), SchedulerError> {
        Err(SchedulerError::Collaborator("sink offline".into()))
    }
}

#[test]
fn test_in_memory_event_log() {
    let log = InMemoryEventLog::new(10);
    log.log_event(EventCategory::Vehicle, "V1", "battery set to 10%")
        .unwrap();
    log.log_event(EventCategory::Charging, "V1", "charging started")
        .unwrap();

    let events = log.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].category, EventCategory::Vehicle);
    assert_eq!(events[1].category.to_string(), "CHARGING");
    assert_eq!(log.messages_for("V1").len(), 2);
}

#[test]
fn test_event_log_overflow() {
    let log = InMemoryEventLog::new(2);
    for msg in ["one", "two", "three"] {
        report_event(&log, EventCategory::System, "system", msg);
    }
    assert_eq!(log.messages_for("system"), vec!["two", "three"]);
}

#[test]
fn test_delivery_failure_is_swallowed() {
    report_delivery(&BrokenSink, "Courier_1", "Gauze", 10);
}

#[test]
fn test_in_memory_delivery_sink_totals() {
    let sink = InMemoryDeliverySink::new();
    sink.record_delivery("Courier_1", "Gauze", 50).unwrap();
    sink.record_delivery("Courier_2", "Gauze", 20).unwrap();
    sink.record_delivery("Courier_2", "Saline", 5).unwrap();
    assert_eq!(sink.delivered_quantity("Gauze"), 70);
    assert_eq!(sink.records().len(), 3);
}

#[test]
fn test_csv_sink_creates_parent_directories() {
    let dir = std::env::temp_dir().join(format!("medsupply-audit-{}", uuid::Uuid::new_v4()));
    let path = dir.join("nested").join("deliveries.csv");

    let sink = CsvDeliverySink::open(&path).unwrap();
    report_delivery(&sink, "Courier_1", "Gauze", 10);

    let contents = std::fs::read_to_string(sink.path()).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "timestamp,vehicle,item,quantity");
    assert!(lines[1].ends_with(",Courier_1,Gauze,10"));

    std::fs::remove_dir_all(dir).unwrap();
}
