//! Build a [`Dispatcher`] and register its bootstrap stations and stock.

use std::sync::Arc;

use tracing::info;

use crate::config::DispatchConfig;
use crate::core::{
    ChargingStation, Collaborators, DeliverySink, Dispatcher, EventLog, SchedulerError, StorageItem,
};
use crate::runtime::TokioSpawner;

/// Build a dispatcher on the tokio clock from configuration.
///
/// # Errors
///
/// - `SchedulerError::InvalidConfig` if `cfg` fails validation
/// - `SchedulerError::Validation` if a seeded station or item is malformed
pub fn build_dispatcher(
    cfg: DispatchConfig,
    spawner: &TokioSpawner,
    event_log: Arc<dyn EventLog>,
    delivery_sink: Arc<dyn DeliverySink>,
) -> Result<Dispatcher, SchedulerError> {
    build_dispatcher_with(cfg, spawner, Collaborators::new(event_log, delivery_sink))
}

/// Build a dispatcher with explicit collaborators, e.g. a custom clock.
///
/// # Errors
///
/// Same as [`build_dispatcher`].
pub fn build_dispatcher_with(
    cfg: DispatchConfig,
    spawner: &TokioSpawner,
    collaborators: Collaborators,
) -> Result<Dispatcher, SchedulerError> {
    cfg.validate()
        .map_err(|e| SchedulerError::InvalidConfig(format!("config invalid: {e}")))?;

    let stations = cfg.stations.clone();
    let seed_items = cfg.seed_items.clone();
    let dispatcher = Dispatcher::new(cfg, spawner, collaborators)?;

    for seed in &stations {
        dispatcher.add_charging_station(ChargingStation::new(&seed.id, &seed.name)?)?;
    }
    for seed in &seed_items {
        dispatcher.add_item(StorageItem::new(&seed.sku, &seed.name, seed.quantity)?);
    }

    info!(
        stations = stations.len(),
        seed_items = seed_items.len(),
        "dispatcher bootstrapped"
    );
    Ok(dispatcher)
}
