//! Serializable views of fleet state for listings and health checks.

use serde::{Deserialize, Serialize};

use crate::core::{
    ChargingStation, DispatchStats, Dispatcher, StorageItem, StorageVehicle, Task, VehiclePhase,
};

/// One loaded or pooled item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Stock keeping unit.
    pub sku: String,
    /// Item name.
    pub name: String,
    /// Units.
    pub quantity: u32,
}

impl From<&StorageItem> for ItemSnapshot {
    fn from(item: &StorageItem) -> Self {
        Self {
            sku: item.sku().to_string(),
            name: item.name().to_string(),
            quantity: item.quantity(),
        }
    }
}

/// Vehicle listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    /// Vehicle id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Battery level in percent.
    pub battery_pct: u8,
    /// Charging episode phase.
    pub phase: VehiclePhase,
    /// Station held while charging.
    pub assigned_station: Option<String>,
    /// True when the vehicle can take a distribution batch.
    pub free: bool,
    /// Loaded items.
    pub inventory: Vec<ItemSnapshot>,
}

impl From<&StorageVehicle> for VehicleSnapshot {
    fn from(vehicle: &StorageVehicle) -> Self {
        Self {
            id: vehicle.id().to_string(),
            name: vehicle.name().to_string(),
            battery_pct: vehicle.battery_pct(),
            phase: vehicle.charge_state().phase(),
            assigned_station: vehicle.assigned_station().map(str::to_string),
            free: vehicle.is_free(),
            inventory: vehicle.inventory().iter().map(ItemSnapshot::from).collect(),
        }
    }
}

/// Station listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSnapshot {
    /// Station id.
    pub id: String,
    /// Station name.
    pub name: String,
    /// Occupied flag.
    pub occupied: bool,
}

impl From<&ChargingStation> for StationSnapshot {
    fn from(station: &ChargingStation) -> Self {
        Self {
            id: station.id().to_string(),
            name: station.name().to_string(),
            occupied: station.is_occupied(),
        }
    }
}

/// Whole-fleet view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Vehicles in registration order.
    pub vehicles: Vec<VehicleSnapshot>,
    /// Stations in registration order.
    pub stations: Vec<StationSnapshot>,
    /// Tasks in creation order.
    pub tasks: Vec<Task>,
    /// Unassigned stock in distribution order.
    pub unassigned: Vec<ItemSnapshot>,
    /// Dispatcher counters.
    pub stats: DispatchStats,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Capture every registry of `dispatcher`. Each list is consistent on its
/// own; the lists are not captured atomically together.
#[must_use]
pub fn fleet_snapshot(dispatcher: &Dispatcher) -> FleetSnapshot {
    FleetSnapshot {
        vehicles: dispatcher.vehicles().iter().map(VehicleSnapshot::from).collect(),
        stations: dispatcher.stations().iter().map(StationSnapshot::from).collect(),
        tasks: dispatcher.tasks(),
        unassigned: dispatcher
            .unassigned_items()
            .iter()
            .map(ItemSnapshot::from)
            .collect(),
        stats: dispatcher.stats(),
    }
}

/// Return a health payload.
#[must_use]
pub const fn health() -> Health {
    Health { ok: true }
}
