//! Core scheduling: fleet model, station pool, charging state machine,
//! delivery worker pool and the distribution dispatcher.

pub mod audit;
pub mod charging;
pub mod delivery;
pub mod dispatcher;
pub mod episodes;
pub mod error;
pub mod executor;
pub mod inventory;
pub mod model;
pub mod registry;
pub mod resource_pool;
pub mod task_store;
pub mod worker_pool;

pub use audit::{
    build_delivery, build_event, report_delivery, report_event, DeliveryRecord, DeliverySink,
    EventCategory, EventLog, EventRecord,
};
pub use charging::{ChargeCoordinator, Transition, VehicleHandle};
pub use delivery::{DeliveryExecutor, DeliveryJob, DeliveryKind, DeliveryOrder, ResumeGuard};
pub use dispatcher::{BatchAssignment, Collaborators, DispatchStats, Dispatcher, DistributionReport};
pub use episodes::EpisodeTimers;
pub use error::{AppResult, SchedulerError};
pub use executor::{JobId, JobMetadata, Spawn, WorkerExecutor};
pub use inventory::UnassignedPool;
pub use model::{
    ChargeState, ChargingStation, Inventory, StorageItem, StorageVehicle, Task, TaskStatus,
    VehiclePhase, INITIAL_BATTERY_PCT,
};
pub use registry::Registry;
pub use resource_pool::{StationLease, StationPool};
pub use task_store::TaskStore;
pub use worker_pool::{PoolError, PoolStats, WorkerPool};
