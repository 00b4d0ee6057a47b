//! Collaborator seams: the event log and the delivery sink.
//!
//! Both are append-only and best-effort. The scheduler calls them through
//! [`report_event`] / [`report_delivery`], which turn failures into a
//! `tracing::warn!` instead of aborting the scheduling step that triggered them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::SchedulerError;
use crate::util::clock::now_ms;

/// Log stream an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Fleet-wide events: registrations, tasks, distribution passes.
    System,
    /// Per-vehicle events.
    Vehicle,
    /// Station and charging-episode events.
    Charging,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "SYSTEM",
            Self::Vehicle => "VEHICLE",
            Self::Charging => "CHARGING",
        })
    }
}

/// One logged event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Stream.
    pub category: EventCategory,
    /// Vehicle id, task id, station id or `system`.
    pub subject_id: String,
    /// Human readable message.
    pub message: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Delivering vehicle.
    pub vehicle_name: String,
    /// Delivered item.
    pub item_name: String,
    /// Units delivered.
    pub quantity: u32,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Append-only event log.
pub trait EventLog: Send + Sync {
    /// Append one event.
    ///
    /// # Errors
    ///
    /// `SchedulerError::Collaborator` when the write fails.
    fn log_event(
        &self,
        category: EventCategory,
        subject_id: &str,
        message: &str,
    ) -> Result<(), SchedulerError>;
}

/// Append-only delivery audit.
pub trait DeliverySink: Send + Sync {
    /// Append one delivery.
    ///
    /// # Errors
    ///
    /// `SchedulerError::Collaborator` when the write fails.
    fn record_delivery(
        &self,
        vehicle_name: &str,
        item_name: &str,
        quantity: u32,
    ) -> Result<(), SchedulerError>;
}

/// Log an event, reporting but swallowing failures.
pub fn report_event(log: &dyn EventLog, category: EventCategory, subject_id: &str, message: &str) {
    if let Err(e) = log.log_event(category, subject_id, message) {
        tracing::warn!(%category, subject_id, error = %e, "event log write failed");
    }
}

/// Record a delivery, reporting but swallowing failures.
pub fn report_delivery(sink: &dyn DeliverySink, vehicle_name: &str, item_name: &str, quantity: u32) {
    if let Err(e) = sink.record_delivery(vehicle_name, item_name, quantity) {
        tracing::error!(vehicle = vehicle_name, item = item_name, quantity, error = %e, "delivery sink write failed");
    }
}

/// Helper to build an event record stamped with the current time.
pub fn build_event(
    category: EventCategory,
    subject_id: impl Into<String>,
    message: impl Into<String>,
) -> EventRecord {
    EventRecord {
        category,
        subject_id: subject_id.into(),
        message: message.into(),
        created_at_ms: now_ms(),
    }
}

/// Helper to build a delivery record stamped with the current time.
pub fn build_delivery(
    vehicle_name: impl Into<String>,
    item_name: impl Into<String>,
    quantity: u32,
) -> DeliveryRecord {
    DeliveryRecord {
        vehicle_name: vehicle_name.into(),
        item_name: item_name.into(),
        quantity,
        created_at_ms: now_ms(),
    }
}
