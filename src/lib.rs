//! # Medical Supply Dispatch
//!
//! Charging-station contention and delivery distribution for a fleet of
//! automated medical supply vehicles.
//!
//! The crate schedules three kinds of concurrent work over shared fleet state:
//!
//! - **Charging episodes**: a battery update at or below the low threshold
//!   claims a free charging station, or queues the vehicle and polls until a
//!   station frees up or the wait times out
//! - **Deliveries**: simulated transit jobs on a bounded worker pool that
//!   unload a vehicle and complete its task
//! - **Distribution passes**: batch unassigned stock across free vehicles,
//!   resumed opportunistically by a single-flight scan whenever vehicles,
//!   stations or stock arrive and whenever a delivery completes
//!
//! ## Key Features
//!
//! - **Exclusive stations**: allocation scans and claims under one lock, so a
//!   station is never handed to two vehicles
//! - **Bounded wait queue**: a waiting vehicle gives up after a fixed timeout
//! - **Bounded concurrency**: at most `worker_count` deliveries run at once;
//!   submission never blocks
//! - **Injectable time**: every suspension goes through [`util::Clock`], so
//!   tests run whole charge episodes under tokio's paused clock
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use med_supply_dispatch::builders::build_dispatcher;
//! use med_supply_dispatch::config::DispatchConfig;
//! use med_supply_dispatch::core::{StorageItem, StorageVehicle, Task, TaskStatus};
//! use med_supply_dispatch::infra::{InMemoryDeliverySink, TracingEventLog};
//! use med_supply_dispatch::runtime::TokioSpawner;
//!
//! let spawner = TokioSpawner::current()?;
//! let dispatcher = build_dispatcher(
//!     DispatchConfig::default(),
//!     &spawner,
//!     Arc::new(TracingEventLog),
//!     Arc::new(InMemoryDeliverySink::new()),
//! )?;
//!
//! dispatcher.add_vehicle(StorageVehicle::new("V1", "Courier_1")?)?;
//! dispatcher.add_item(StorageItem::new("SKU1", "Gauze", 10)?);
//! dispatcher.create_task(Task::new("T1", "Ward 4 restock", Some("V1")))?;
//! dispatcher.update_status("T1", TaskStatus::InProgress)?;
//! ```
//!
//! For complete scenarios, see:
//! - `tests/task_lifecycle_test.rs` - manual task flow end to end
//! - `tests/distribution_test.rs` - batching and single-flight resumption
//! - `tests/charging_test.rs` - station contention and the wait queue

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Configuration models for timings, thresholds and bootstrap data.
pub mod config;
/// Fleet model, charging state machine, worker pool and dispatcher.
pub mod core;
/// Builders to construct a dispatcher from configuration.
pub mod builders;
/// Event log and delivery sink adapters.
pub mod infra;
/// Runtime adapters and serializable views of fleet state.
pub mod runtime;
/// Shared utilities.
pub mod util;
