//! Per-vehicle scheduled units for charge and wait-queue loops.
//!
//! Each vehicle owns at most one running unit. Scheduling a new unit for a
//! vehicle aborts the previous one, and a finished unit removes its own entry
//! only if it has not been replaced meanwhile.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::debug;

struct Unit {
    generation: u64,
    abort: AbortHandle,
}

/// Cancellable timer units keyed by vehicle id.
pub struct EpisodeTimers {
    handle: Handle,
    units: Arc<Mutex<HashMap<String, Unit>>>,
    next_generation: AtomicU64,
}

impl EpisodeTimers {
    /// Spawn units on `handle`.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            units: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Run `fut` as the unit for `vehicle_id`, aborting any unit it replaces.
    pub fn schedule<F>(&self, vehicle_id: &str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let key = vehicle_id.to_string();
        let units = Arc::clone(&self.units);

        // Spawn and insert under one lock so the unit cannot finish and look
        // for its entry before the entry exists.
        let mut guard = self.units.lock();
        let task = self.handle.spawn({
            let key = key.clone();
            async move {
                fut.await;
                let mut units = units.lock();
                if units.get(&key).is_some_and(|u| u.generation == generation) {
                    units.remove(&key);
                }
            }
        });

        let unit = Unit {
            generation,
            abort: task.abort_handle(),
        };
        if let Some(previous) = guard.insert(key, unit) {
            debug!(vehicle_id, "replacing episode unit");
            previous.abort.abort();
        }
    }

    /// Abort the unit for `vehicle_id`. Returns whether one was running.
    pub fn cancel(&self, vehicle_id: &str) -> bool {
        let removed = self.units.lock().remove(vehicle_id);
        removed.is_some_and(|unit| {
            unit.abort.abort();
            true
        })
    }

    /// True while a unit is registered for `vehicle_id`.
    pub fn is_active(&self, vehicle_id: &str) -> bool {
        self.units.lock().contains_key(vehicle_id)
    }

    /// Number of running units.
    pub fn active(&self) -> usize {
        self.units.lock().len()
    }

    /// Abort every unit.
    pub fn cancel_all(&self) {
        for (_, unit) in self.units.lock().drain() {
            unit.abort.abort();
        }
    }
}

impl Drop for EpisodeTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
