//! Event log that forwards into `tracing`.

use crate::core::{EventCategory, EventLog, SchedulerError};

/// Default event log: each event becomes an `info` span-less tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventLog;

impl EventLog for TracingEventLog {
    fn log_event(
        &self,
        category: EventCategory,
        subject_id: &str,
        message: &str,
    ) -> Result<(), SchedulerError> {
        tracing::info!(target: "med_supply_dispatch::events", %category, subject_id, "{message}");
        Ok(())
    }
}
