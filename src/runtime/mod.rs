//! Runtime adapters and API surface.

pub mod api;
pub mod tokio_spawner;

pub use api::{fleet_snapshot, health, FleetSnapshot, Health, StationSnapshot, VehicleSnapshot};
pub use tokio_spawner::TokioSpawner;
