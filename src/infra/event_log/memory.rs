//! In-memory event log for testing and dev.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::core::{build_event, EventCategory, EventLog, EventRecord, SchedulerError};

/// Bounded in-memory event log; the oldest events are dropped first.
pub struct InMemoryEventLog {
    events: Mutex<VecDeque<EventRecord>>,
    max_events: usize,
}

impl InMemoryEventLog {
    /// Create a log holding at most `max_events`.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Snapshot of stored events.
    pub fn events(&self) -> Vec<EventRecord> {
        self.events.lock().iter().cloned().collect()
    }

    /// Messages logged for one subject, oldest first.
    pub fn messages_for(&self, subject_id: &str) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.subject_id == subject_id)
            .map(|e| e.message.clone())
            .collect()
    }
}

impl EventLog for InMemoryEventLog {
    fn log_event(
        &self,
        category: EventCategory,
        subject_id: &str,
        message: &str,
    ) -> Result<(), SchedulerError> {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(build_event(category, subject_id, message));
        Ok(())
    }
}
