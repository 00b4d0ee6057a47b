//! Fleet data model: stations, items, vehicles and tasks.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::core::SchedulerError;
use crate::util::validate::require_non_blank;

/// Starting charge of a freshly registered vehicle.
pub const INITIAL_BATTERY_PCT: u8 = 20;

/// A charging station. Identity is the id, compared ignoring ASCII case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingStation {
    id: String,
    name: String,
    occupied: bool,
}

impl ChargingStation {
    /// Create a free station.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Validation` if `id` or `name` is blank.
    pub fn new(id: &str, name: &str) -> Result<Self, SchedulerError> {
        Ok(Self {
            id: require_non_blank(id, "station id")?,
            name: require_non_blank(name, "station name")?,
            occupied: false,
        })
    }

    /// Station id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a vehicle currently holds this station.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Case-insensitive id match.
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id.trim())
    }

    pub(crate) fn set_occupied(&mut self, occupied: bool) {
        self.occupied = occupied;
    }
}

impl PartialEq for ChargingStation {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq_ignore_ascii_case(&other.id)
    }
}

impl Eq for ChargingStation {}

impl Hash for ChargingStation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.to_ascii_lowercase().hash(state);
    }
}

/// A quantity of one SKU, either pooled or loaded on a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageItem {
    sku: String,
    name: String,
    quantity: u32,
}

impl StorageItem {
    /// Create an item.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Validation` for a blank sku or name, or a
    /// quantity outside `0..=u32::MAX`.
    pub fn new(sku: &str, name: &str, quantity: i64) -> Result<Self, SchedulerError> {
        let sku = require_non_blank(sku, "sku")?;
        let name = require_non_blank(name, "item name")?;
        Ok(Self {
            sku,
            name,
            quantity: checked_quantity(quantity)?,
        })
    }

    /// Stock keeping unit.
    #[must_use]
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Item name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units on hand.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Overwrite the quantity.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Validation` for a negative quantity; the item
    /// is left unchanged.
    pub fn set_quantity(&mut self, quantity: i64) -> Result<(), SchedulerError> {
        self.quantity = checked_quantity(quantity)?;
        Ok(())
    }

    /// Copy of this item carrying `quantity` units.
    pub(crate) fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            sku: self.sku.clone(),
            name: self.name.clone(),
            quantity,
        }
    }

    pub(crate) fn add_quantity(&mut self, quantity: u32) {
        self.quantity = self.quantity.saturating_add(quantity);
    }

    /// Remove up to `max` units and return how many were taken.
    pub(crate) fn take_up_to(&mut self, max: u32) -> u32 {
        let taken = self.quantity.min(max);
        self.quantity -= taken;
        taken
    }
}

fn checked_quantity(quantity: i64) -> Result<u32, SchedulerError> {
    u32::try_from(quantity)
        .map_err(|_| SchedulerError::Validation(format!("quantity must be non-negative, got {quantity}")))
}

/// Insertion-ordered sku → item mapping carried by a vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<StorageItem>,
}

impl Inventory {
    /// Number of distinct SKUs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no SKU is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by sku.
    #[must_use]
    pub fn get(&self, sku: &str) -> Option<&StorageItem> {
        self.items.iter().find(|it| it.sku == sku)
    }

    /// Items in load order.
    pub fn iter(&self) -> impl Iterator<Item = &StorageItem> {
        self.items.iter()
    }

    /// Merge `item` into the inventory, summing quantities for a known sku.
    pub(crate) fn merge(&mut self, item: StorageItem) {
        match self.items.iter_mut().find(|it| it.sku == item.sku) {
            Some(existing) => existing.add_quantity(item.quantity),
            None => self.items.push(item),
        }
    }

    /// Remove an item entirely.
    pub(crate) fn remove(&mut self, sku: &str) -> Option<StorageItem> {
        let idx = self.items.iter().position(|it| it.sku == sku)?;
        Some(self.items.remove(idx))
    }

    /// Take up to `cap` units from the first item with stock, dropping the item
    /// once it is empty. Returns the item name and units taken.
    pub(crate) fn deliver_first(&mut self, cap: u32) -> Option<(String, u32)> {
        let idx = self.items.iter().position(|it| it.quantity > 0)?;
        let item = &mut self.items[idx];
        let delivered = item.take_up_to(cap);
        let name = item.name.clone();
        if item.quantity == 0 {
            self.items.remove(idx);
        }
        Some((name, delivered))
    }
}

/// Charging episode state of a vehicle.
///
/// Charging and waiting are exclusive, and a station is assigned exactly while
/// charging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeState {
    /// Not charging and not queued.
    Idle,
    /// Holding `station_id` and gaining charge.
    Charging {
        /// Station currently held.
        station_id: String,
    },
    /// Queued for a station since the given instant.
    Waiting {
        /// Start of the wait.
        since: Instant,
    },
    /// Gave up waiting; terminal for the episode.
    LeftQueue,
}

impl ChargeState {
    /// Serializable phase without episode details.
    #[must_use]
    pub const fn phase(&self) -> VehiclePhase {
        match self {
            Self::Idle => VehiclePhase::Idle,
            Self::Charging { .. } => VehiclePhase::Charging,
            Self::Waiting { .. } => VehiclePhase::Waiting,
            Self::LeftQueue => VehiclePhase::LeftQueue,
        }
    }
}

/// Coarse vehicle phase for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehiclePhase {
    /// See [`ChargeState::Idle`].
    Idle,
    /// See [`ChargeState::Charging`].
    Charging,
    /// See [`ChargeState::Waiting`].
    Waiting,
    /// See [`ChargeState::LeftQueue`].
    LeftQueue,
}

/// An automated storage vehicle.
#[derive(Debug, Clone)]
pub struct StorageVehicle {
    id: String,
    name: String,
    battery_pct: u8,
    charge: ChargeState,
    inventory: Inventory,
}

impl StorageVehicle {
    /// Create an idle, empty vehicle at [`INITIAL_BATTERY_PCT`].
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Validation` if `id` or `name` is blank.
    pub fn new(id: &str, name: &str) -> Result<Self, SchedulerError> {
        Ok(Self {
            id: require_non_blank(id, "vehicle id")?,
            name: require_non_blank(name, "vehicle name")?,
            battery_pct: INITIAL_BATTERY_PCT,
            charge: ChargeState::Idle,
            inventory: Inventory::default(),
        })
    }

    /// Vehicle id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Battery level in percent.
    #[must_use]
    pub const fn battery_pct(&self) -> u8 {
        self.battery_pct
    }

    /// Current episode state.
    #[must_use]
    pub const fn charge_state(&self) -> &ChargeState {
        &self.charge
    }

    /// Loaded items.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// True while holding a station.
    #[must_use]
    pub const fn is_charging(&self) -> bool {
        matches!(self.charge, ChargeState::Charging { .. })
    }

    /// True while queued for a station.
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        matches!(self.charge, ChargeState::Waiting { .. })
    }

    /// True once the vehicle abandoned the wait queue in this episode.
    #[must_use]
    pub const fn has_left_queue(&self) -> bool {
        matches!(self.charge, ChargeState::LeftQueue)
    }

    /// Station held while charging.
    #[must_use]
    pub fn assigned_station(&self) -> Option<&str> {
        match &self.charge {
            ChargeState::Charging { station_id } => Some(station_id),
            _ => None,
        }
    }

    /// Empty inventory, not charging, not waiting, not out of the queue.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.inventory.is_empty() && matches!(self.charge, ChargeState::Idle)
    }

    pub(crate) fn set_battery_unchecked(&mut self, pct: u8) {
        self.battery_pct = pct.min(100);
    }

    pub(crate) fn set_charge_state(&mut self, charge: ChargeState) {
        self.charge = charge;
    }

    pub(crate) fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Created, not started.
    Pending,
    /// Being delivered.
    InProgress,
    /// Delivered.
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        };
        f.write_str(s)
    }
}

impl FromStr for TaskStatus {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "DONE" => Ok(Self::Done),
            other => Err(SchedulerError::Validation(format!("invalid task status: {other}"))),
        }
    }
}

/// A delivery task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task id.
    pub id: String,
    /// Free-form description.
    pub description: String,
    /// Vehicle responsible for the task, if any.
    pub assignee_vehicle_id: Option<String>,
    /// Current status.
    pub status: TaskStatus,
}

impl Task {
    /// Create a pending task. Validation happens when the task is registered.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        assignee_vehicle_id: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            assignee_vehicle_id: assignee_vehicle_id.map(|v| v.trim().to_string()),
            status: TaskStatus::Pending,
        }
    }
}
