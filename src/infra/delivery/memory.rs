//! In-memory delivery sink for testing and dev.

use parking_lot::Mutex;

use crate::core::{build_delivery, DeliveryRecord, DeliverySink, SchedulerError};

/// Keeps every delivery in memory.
#[derive(Default)]
pub struct InMemoryDeliverySink {
    records: Mutex<Vec<DeliveryRecord>>,
}

impl InMemoryDeliverySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded deliveries.
    pub fn records(&self) -> Vec<DeliveryRecord> {
        self.records.lock().clone()
    }

    /// Sum of delivered units of `item_name`.
    pub fn delivered_quantity(&self, item_name: &str) -> u64 {
        self.records
            .lock()
            .iter()
            .filter(|r| r.item_name == item_name)
            .map(|r| u64::from(r.quantity))
            .sum()
    }
}

impl DeliverySink for InMemoryDeliverySink {
    fn record_delivery(
        &self,
        vehicle_name: &str,
        item_name: &str,
        quantity: u32,
    ) -> Result<(), SchedulerError> {
        self.records
            .lock()
            .push(build_delivery(vehicle_name, item_name, quantity));
        Ok(())
    }
}
