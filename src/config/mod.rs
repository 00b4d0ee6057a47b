//! Configuration models for the worker pool, timings and bootstrap data.

pub mod dispatch;
pub mod pool;

pub use dispatch::{ChargingPolicy, DispatchConfig, ItemSeed, StationSeed};
pub use pool::WorkerPoolConfig;
