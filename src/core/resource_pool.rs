//! Charging-station pool with exclusive allocate/release.
//!
//! Stations are scanned in registration order. The scan and the claim happen
//! under a single `parking_lot::Mutex` acquisition, so two concurrent
//! [`StationPool::allocate`] calls can never return the same station. The
//! pool also remembers which stations are leased to a charging vehicle, and
//! manual occupancy changes never free a leased station.

use parking_lot::Mutex;

use crate::core::{ChargingStation, SchedulerError};

/// Station handed out by [`StationPool::allocate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationLease {
    /// Claimed station id.
    pub id: String,
    /// Claimed station name, for log lines.
    pub name: String,
}

struct Slot {
    station: ChargingStation,
    leased: bool,
}

/// Fixed-but-extendable set of charging stations.
#[derive(Default)]
pub struct StationPool {
    slots: Mutex<Vec<Slot>>,
}

impl StationPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a station.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Validation` if a station with the same id
    /// (ignoring case) is already registered.
    pub fn add(&self, station: ChargingStation) -> Result<(), SchedulerError> {
        let mut slots = self.slots.lock();
        if slots.iter().any(|s| s.station == station) {
            return Err(SchedulerError::Validation(format!(
                "charging station '{}' already exists",
                station.id()
            )));
        }
        tracing::debug!(station_id = %station.id(), "charging station registered");
        slots.push(Slot {
            station,
            leased: false,
        });
        Ok(())
    }

    /// Claim the first free station, or `None` if all are occupied.
    pub fn allocate(&self) -> Option<StationLease> {
        let mut slots = self.slots.lock();
        let slot = slots.iter_mut().find(|s| !s.station.is_occupied())?;
        slot.station.set_occupied(true);
        slot.leased = true;
        Some(StationLease {
            id: slot.station.id().to_string(),
            name: slot.station.name().to_string(),
        })
    }

    /// Return a leased station. Returns false if no station has that id.
    pub fn release(&self, id: &str) -> bool {
        let mut slots = self.slots.lock();
        match slots.iter_mut().find(|s| s.station.has_id(id)) {
            Some(slot) => {
                slot.station.set_occupied(false);
                slot.leased = false;
                true
            }
            None => {
                tracing::warn!(station_id = %id, "release of unknown charging station");
                false
            }
        }
    }

    /// Manually force a station's occupancy.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::NotFound` for an unknown id
    /// - `SchedulerError::Validation` when freeing a station leased to a
    ///   charging vehicle
    pub fn set_occupied(&self, id: &str, occupied: bool) -> Result<(), SchedulerError> {
        let mut slots = self.slots.lock();
        let slot = slots
            .iter_mut()
            .find(|s| s.station.has_id(id))
            .ok_or_else(|| SchedulerError::not_found("station", id))?;
        if !occupied && slot.leased {
            return Err(SchedulerError::Validation(format!(
                "station '{}' is held by a charging vehicle",
                slot.station.id()
            )));
        }
        slot.station.set_occupied(occupied);
        Ok(())
    }

    /// Name of the station with `id`.
    pub fn name_of(&self, id: &str) -> Option<String> {
        self.slots
            .lock()
            .iter()
            .find(|s| s.station.has_id(id))
            .map(|s| s.station.name().to_string())
    }

    /// Copy of every station in scan order.
    pub fn snapshot(&self) -> Vec<ChargingStation> {
        self.slots.lock().iter().map(|s| s.station.clone()).collect()
    }

    /// Number of unoccupied stations.
    pub fn free_count(&self) -> usize {
        self.slots
            .lock()
            .iter()
            .filter(|s| !s.station.is_occupied())
            .count()
    }

    /// Number of registered stations.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// True when no station is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}
