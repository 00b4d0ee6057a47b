//! Fleet dispatcher: registration, task lifecycle and distribution passes.
//!
//! The dispatcher owns every shared registry and the bounded delivery worker
//! pool. Delivery jobs and resume scans are submitted without waiting; their
//! completion mutates vehicle and task state and may schedule further passes.
//!
//! # Locking
//!
//! Registries are read-write locked façades and are never held while a
//! vehicle is locked. A vehicle lock may be held while touching the station
//! pool, the unassigned pool or the episode timers, never across an await and
//! never while calling the event log or the delivery sink.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::DispatchConfig;
use crate::core::audit::{report_delivery, report_event, DeliverySink, EventCategory, EventLog};
use crate::core::charging::{ChargeCoordinator, Transition, VehicleHandle};
use crate::core::delivery::{DeliveryExecutor, DeliveryJob, DeliveryKind, DeliveryOrder, ResumeGuard};
use crate::core::episodes::EpisodeTimers;
use crate::core::executor::JobId;
use crate::core::inventory::UnassignedPool;
use crate::core::resource_pool::StationPool;
use crate::core::task_store::TaskStore;
use crate::core::worker_pool::{PoolStats, WorkerPool};
use crate::core::{
    ChargingStation, Registry, SchedulerError, StorageItem, StorageVehicle, Task, TaskStatus,
};
use crate::runtime::TokioSpawner;
use crate::util::clock::{Clock, TokioClock};
use crate::util::validate::{require_equipment_name, require_non_blank};

/// External collaborators consumed by the dispatcher.
#[derive(Clone)]
pub struct Collaborators {
    /// Append-only event log.
    pub event_log: Arc<dyn EventLog>,
    /// Append-only delivery audit.
    pub delivery_sink: Arc<dyn DeliverySink>,
    /// Time source for transit, charge ticks and wait polls.
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Collaborators on the tokio clock.
    pub fn new(event_log: Arc<dyn EventLog>, delivery_sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            event_log,
            delivery_sink,
            clock: Arc::new(TokioClock),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// One batch created by a distribution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAssignment {
    /// Generated task id (`Task N`).
    pub task_id: String,
    /// Vehicle loaded with the batch.
    pub vehicle_id: String,
    /// Item sku.
    pub sku: String,
    /// Item name.
    pub item_name: String,
    /// Units loaded.
    pub quantity: u32,
}

/// Outcome of [`Dispatcher::auto_distribute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReport {
    /// Pass id supplied by the caller or generated for a resume scan.
    pub pass_id: String,
    /// Batches in creation order.
    pub batches: Vec<BatchAssignment>,
    /// Pooled stock left after the pass.
    pub leftovers: Vec<StorageItem>,
}

impl DistributionReport {
    fn empty(pass_id: &str) -> Self {
        Self {
            pass_id: pass_id.to_string(),
            batches: Vec::new(),
            leftovers: Vec::new(),
        }
    }
}

/// Dispatcher counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    /// Distribution passes started, manual and resumed.
    pub distribution_passes: u64,
    /// Resume scans executed.
    pub resume_scans: u64,
    /// Deliveries that reached a task.
    pub deliveries_completed: u64,
    /// Vehicles with a running charge or wait loop.
    pub active_episodes: usize,
    /// Delivery worker pool.
    pub pool: PoolStats,
}

#[derive(Debug, Default)]
struct DispatchCounters {
    passes: AtomicU64,
    scans: AtomicU64,
    deliveries: AtomicU64,
}

enum BatchOutcome {
    Assigned(BatchAssignment),
    VehicleBusy,
    ItemDepleted,
    Rejected(SchedulerError),
}

pub(crate) struct DispatcherInner {
    config: DispatchConfig,
    stations: Arc<StationPool>,
    vehicles: Registry<VehicleHandle>,
    unassigned: UnassignedPool,
    tasks: TaskStore,
    charging: ChargeCoordinator,
    timers: Arc<EpisodeTimers>,
    event_log: Arc<dyn EventLog>,
    delivery_sink: Arc<dyn DeliverySink>,
    clock: Arc<dyn Clock>,
    workers: OnceLock<WorkerPool<DeliveryJob, DeliveryExecutor>>,
    auto_enabled: AtomicBool,
    resume_running: Arc<AtomicBool>,
    counters: DispatchCounters,
}

impl Drop for DispatcherInner {
    fn drop(&mut self) {
        // Running units keep the timers alive through their coordinator clone.
        self.timers.cancel_all();
    }
}

/// Cheaply cloneable handle to the fleet scheduler.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    /// Create an empty dispatcher and start its delivery workers on `spawner`.
    ///
    /// Stations and seed items from `config` are not registered here; see
    /// [`build_dispatcher`](crate::builders::build_dispatcher).
    ///
    /// # Errors
    ///
    /// `SchedulerError::InvalidConfig` if `config` fails validation.
    pub fn new(
        config: DispatchConfig,
        spawner: &TokioSpawner,
        collaborators: Collaborators,
    ) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;

        let Collaborators {
            event_log,
            delivery_sink,
            clock,
        } = collaborators;
        let stations = Arc::new(StationPool::new());
        let timers = Arc::new(EpisodeTimers::new(spawner.handle().clone()));
        let charging = ChargeCoordinator::new(
            Arc::clone(&stations),
            Arc::clone(&timers),
            Arc::clone(&event_log),
            Arc::clone(&clock),
            config.charging,
        );

        let inner = Arc::new(DispatcherInner {
            config,
            stations,
            vehicles: Registry::new(),
            unassigned: UnassignedPool::new(),
            tasks: TaskStore::new(),
            charging,
            timers,
            event_log,
            delivery_sink,
            clock,
            workers: OnceLock::new(),
            auto_enabled: AtomicBool::new(false),
            resume_running: Arc::new(AtomicBool::new(false)),
            counters: DispatchCounters::default(),
        });

        let executor = DeliveryExecutor::new(Arc::downgrade(&inner));
        let workers = WorkerPool::new(inner.config.pool.clone(), executor, spawner)?;
        if inner.workers.set(workers).is_err() {
            return Err(SchedulerError::InvalidConfig("worker pool already installed".into()));
        }

        info!(
            worker_count = inner.config.pool.worker_count,
            batch_cap = inner.config.batch_cap,
            "dispatcher started"
        );
        Ok(Self { inner })
    }

    pub(crate) const fn from_inner(inner: Arc<DispatcherInner>) -> Self {
        Self { inner }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.inner.config
    }

    // ----- registration -------------------------------------------------

    /// Register a vehicle and, if it is free, check for pending distribution.
    ///
    /// # Errors
    ///
    /// `SchedulerError::Validation` for a malformed name or a duplicate id.
    pub fn add_vehicle(&self, vehicle: StorageVehicle) -> Result<(), SchedulerError> {
        require_equipment_name(vehicle.name(), "vehicle")?;
        let id = vehicle.id().to_string();
        let name = vehicle.name().to_string();
        let free = vehicle.is_free();

        self.inner
            .vehicles
            .insert_new(&id, Arc::new(Mutex::new(vehicle)))
            .map_err(|_| SchedulerError::Validation(format!("vehicle '{id}' already exists")))?;

        info!(vehicle_id = %id, "vehicle registered");
        self.log(EventCategory::Vehicle, &id, &format!("registered vehicle {name}"));
        if free {
            self.try_resume_auto_distribute();
        }
        Ok(())
    }

    /// Register a charging station and check for pending distribution.
    ///
    /// # Errors
    ///
    /// `SchedulerError::Validation` for a malformed name or a duplicate id.
    pub fn add_charging_station(&self, station: ChargingStation) -> Result<(), SchedulerError> {
        require_equipment_name(station.name(), "station")?;
        let id = station.id().to_string();
        let name = station.name().to_string();
        self.inner.stations.add(station)?;

        info!(station_id = %id, "charging station registered");
        self.log(EventCategory::Charging, &id, &format!("registered charging station {name}"));
        self.try_resume_auto_distribute();
        Ok(())
    }

    /// Add stock to the unassigned pool and check for pending distribution.
    pub fn add_item(&self, item: StorageItem) {
        let sku = item.sku().to_string();
        let message = format!("added {} x {} to the unassigned pool", item.quantity(), item.name());
        self.inner.unassigned.add(item);

        debug!(sku = %sku, "item pooled");
        self.log(EventCategory::System, &sku, &message);
        self.try_resume_auto_distribute();
    }

    // ----- manual tasks -------------------------------------------------

    /// Register a task. An assigned vehicle is loaded with the first pooled item.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::Validation` for a blank or duplicate id
    /// - `SchedulerError::NotFound` for an unknown assignee
    pub fn create_task(&self, mut task: Task) -> Result<Task, SchedulerError> {
        task.id = require_non_blank(&task.id, "task id")?;
        task.assignee_vehicle_id = task
            .assignee_vehicle_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        let assignee = task
            .assignee_vehicle_id
            .as_deref()
            .map(|id| self.vehicle_handle(id))
            .transpose()?;
        let task = self.inner.tasks.insert(task)?;

        info!(task_id = %task.id, assignee = ?task.assignee_vehicle_id, "task created");
        self.log(
            EventCategory::System,
            &task.id,
            &format!("created task: {}", task.description),
        );

        if let Some(vehicle) = assignee {
            self.load_first_pooled_item(&task, &vehicle);
        }
        Ok(task)
    }

    /// Set a task's status and drain the assignee's battery. Moving a task to
    /// `IN_PROGRESS` submits its delivery.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::NotFound` for an unknown task
    /// - `SchedulerError::PoolShutdown` / `QueueFull` if the delivery could
    ///   not be submitted; the status change stays applied
    pub fn update_status(&self, task_id: &str, status: TaskStatus) -> Result<Task, SchedulerError> {
        let task = self.inner.tasks.set_status(task_id.trim(), status)?;
        info!(task_id = %task.id, %status, "task status updated");
        self.log(EventCategory::System, &task.id, &format!("status set to {status}"));

        let vehicle_id = task.assignee_vehicle_id.clone();
        if let Some(vehicle) = vehicle_id.as_deref().and_then(|id| self.inner.vehicles.get(id)) {
            self.inner
                .charging
                .drain(&vehicle, self.inner.config.status_drain_pct);
        }

        if status == TaskStatus::InProgress {
            match vehicle_id {
                Some(vehicle_id) => {
                    let order = DeliveryOrder {
                        task_id: task.id.clone(),
                        vehicle_id,
                        kind: DeliveryKind::Manual,
                    };
                    self.submit(DeliveryJob::Deliver(order), format!("delivery {}", task.id))?;
                }
                None => {
                    debug!(task_id = %task.id, "task has no assignee, nothing to deliver");
                }
            }
        }
        Ok(task)
    }

    fn load_first_pooled_item(&self, task: &Task, vehicle: &VehicleHandle) {
        let capacity = self.inner.config.vehicle_capacity;
        let (vehicle_id, outcome) = {
            let mut v = vehicle.lock();
            let outcome = self.inner.unassigned.take_first_fitting(|item| {
                let inventory = v.inventory();
                inventory.len() < capacity || inventory.get(item.sku()).is_some()
            });
            if let Ok(Some(item)) = &outcome {
                v.inventory_mut().merge(item.clone());
            }
            (v.id().to_string(), outcome)
        };

        match outcome {
            Ok(Some(item)) => self.log(
                EventCategory::Vehicle,
                &vehicle_id,
                &format!(
                    "loaded {} x {} for task {}",
                    item.quantity(),
                    item.name(),
                    task.id
                ),
            ),
            Ok(None) => debug!(task_id = %task.id, "no pooled stock to load"),
            Err(item) => {
                warn!(vehicle_id = %vehicle_id, sku = item.sku(), "vehicle at capacity, item left pooled");
                self.log(
                    EventCategory::Vehicle,
                    &vehicle_id,
                    &format!("at capacity, {} left in the unassigned pool", item.name()),
                );
            }
        }
    }

    // ----- distribution -------------------------------------------------

    /// Spread pooled stock over free vehicles in batches of at most
    /// `batch_cap`, one delivery task per batch. Enables automatic resumption.
    ///
    /// # Errors
    ///
    /// `SchedulerError::PoolShutdown` if the worker pool no longer accepts
    /// jobs; nothing is distributed.
    pub fn auto_distribute(&self, pass_id: &str) -> Result<DistributionReport, SchedulerError> {
        let inner = &self.inner;
        inner.auto_enabled.store(true, Ordering::SeqCst);
        if self.workers()?.is_shutdown() {
            return Err(SchedulerError::PoolShutdown);
        }
        inner.counters.passes.fetch_add(1, Ordering::Relaxed);

        let mut report = DistributionReport::empty(pass_id);
        if inner.unassigned.is_empty() {
            self.log(EventCategory::System, pass_id, "no unassigned items to distribute");
            return Ok(report);
        }

        let mut free: VecDeque<VehicleHandle> = inner
            .vehicles
            .values()
            .into_iter()
            .filter(|v| v.lock().is_free())
            .collect();
        if free.is_empty() {
            self.log(EventCategory::System, pass_id, "no free vehicles available");
            return Ok(report);
        }

        info!(
            pass_id,
            items = inner.unassigned.len(),
            free_vehicles = free.len(),
            "distribution pass started"
        );

        'items: for item in inner.unassigned.snapshot() {
            while inner
                .unassigned
                .get(item.sku())
                .is_some_and(|pooled| pooled.quantity() > 0)
            {
                let Some(vehicle) = free.pop_front() else {
                    break 'items;
                };
                match self.assign_batch(pass_id, &vehicle, item.sku()) {
                    BatchOutcome::Assigned(batch) => report.batches.push(batch),
                    BatchOutcome::VehicleBusy => {}
                    BatchOutcome::ItemDepleted => {
                        free.push_front(vehicle);
                        break;
                    }
                    BatchOutcome::Rejected(err) => {
                        error!(pass_id, error = %err, "batch submission rejected, stopping pass");
                        break 'items;
                    }
                }
            }
        }

        let purged = inner.unassigned.purge_depleted();
        report.leftovers = inner.unassigned.snapshot();
        for leftover in &report.leftovers {
            self.log(
                EventCategory::System,
                pass_id,
                &format!(
                    "{} x {} ({}) left in the pool, no free vehicle",
                    leftover.quantity(),
                    leftover.name(),
                    leftover.sku()
                ),
            );
        }

        info!(
            pass_id,
            batches = report.batches.len(),
            purged,
            leftovers = report.leftovers.len(),
            "distribution pass finished"
        );
        Ok(report)
    }

    fn assign_batch(&self, pass_id: &str, vehicle: &VehicleHandle, sku: &str) -> BatchOutcome {
        let inner = &self.inner;
        let (vehicle_id, taken) = {
            let mut v = vehicle.lock();
            if !v.is_free() {
                return BatchOutcome::VehicleBusy;
            }
            let Some(taken) = inner.unassigned.take_up_to(sku, inner.config.batch_cap) else {
                return BatchOutcome::ItemDepleted;
            };
            v.inventory_mut().merge(taken.clone());
            (v.id().to_string(), taken)
        };

        let description = format!("Deliver {} {}", taken.quantity(), taken.name());
        let task = inner
            .tasks
            .insert_batch(description, &vehicle_id, TaskStatus::InProgress);
        let order = DeliveryOrder {
            task_id: task.id.clone(),
            vehicle_id: vehicle_id.clone(),
            kind: DeliveryKind::Batch,
        };

        if let Err(err) = self.submit(DeliveryJob::Deliver(order), format!("batch {}", task.id)) {
            vehicle.lock().inventory_mut().remove(sku);
            inner.unassigned.restore(taken);
            // The batch task stays registered; it just never started.
            let _ = inner.tasks.set_status(&task.id, TaskStatus::Pending);
            self.log(
                EventCategory::System,
                &task.id,
                &format!("batch not submitted ({err}), stock returned to the pool"),
            );
            return BatchOutcome::Rejected(err);
        }

        debug!(pass_id, task_id = %task.id, vehicle_id = %vehicle_id, "batch assigned");
        self.log(
            EventCategory::System,
            &task.id,
            &format!("{pass_id}: {} assigned to {vehicle_id}", task.description),
        );
        BatchOutcome::Assigned(BatchAssignment {
            task_id: task.id,
            vehicle_id,
            sku: taken.sku().to_string(),
            item_name: taken.name().to_string(),
            quantity: taken.quantity(),
        })
    }

    /// Schedule a resume scan if automatic distribution is enabled and no
    /// scan is in flight. Returns whether this call scheduled one.
    pub fn try_resume_auto_distribute(&self) -> bool {
        if !self.inner.auto_enabled.load(Ordering::SeqCst) {
            return false;
        }
        let Some(guard) = ResumeGuard::acquire(&self.inner.resume_running) else {
            debug!("resume scan already in flight");
            return false;
        };
        // A rejected job drops the guard with it.
        match self.submit(DeliveryJob::ResumeScan(guard), "resume scan") {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "resume scan not submitted");
                false
            }
        }
    }

    pub(crate) fn run_resume_scan(&self) {
        let inner = &self.inner;
        inner.counters.scans.fetch_add(1, Ordering::Relaxed);

        let has_free = inner.vehicles.any(|v| v.lock().is_free());
        if inner.unassigned.is_empty() || !has_free {
            debug!(has_free, "resume scan found nothing to distribute");
            return;
        }

        let pass_id = format!("RESUME-{}", Uuid::new_v4());
        match self.auto_distribute(&pass_id) {
            Ok(report) => debug!(pass_id = %report.pass_id, batches = report.batches.len(), "resume pass done"),
            Err(err) => warn!(pass_id = %pass_id, error = %err, "resume pass failed"),
        }
    }

    // ----- delivery -----------------------------------------------------

    pub(crate) async fn run_delivery(&self, order: DeliveryOrder) {
        let inner = &self.inner;
        inner.clock.sleep(inner.config.transit()).await;

        let Some(vehicle) = inner.vehicles.get(&order.vehicle_id) else {
            warn!(vehicle_id = %order.vehicle_id, task_id = %order.task_id, "delivery vehicle vanished");
            return;
        };
        let (vehicle_name, delivered) = {
            let mut v = vehicle.lock();
            let delivered = v.inventory_mut().deliver_first(inner.config.batch_cap);
            (v.name().to_string(), delivered)
        };

        let Some((item_name, quantity)) = delivered else {
            info!(vehicle_id = %order.vehicle_id, task_id = %order.task_id, "nothing to deliver");
            self.log(
                EventCategory::Vehicle,
                &order.vehicle_id,
                &format!("no deliverable item for task {}", order.task_id),
            );
            return;
        };

        report_delivery(inner.delivery_sink.as_ref(), &vehicle_name, &item_name, quantity);
        if let Err(err) = inner.tasks.set_status(&order.task_id, TaskStatus::Done) {
            warn!(task_id = %order.task_id, error = %err, "delivered task missing");
        }
        info!(
            vehicle_id = %order.vehicle_id,
            task_id = %order.task_id,
            item = %item_name,
            quantity,
            "delivery completed"
        );
        self.log(
            EventCategory::Vehicle,
            &order.vehicle_id,
            &format!("delivered {quantity} x {item_name} for task {}", order.task_id),
        );

        if order.kind == DeliveryKind::Batch {
            inner
                .charging
                .drain(&vehicle, inner.config.delivery_drain_pct);
        }
        inner.counters.deliveries.fetch_add(1, Ordering::Relaxed);
        self.try_resume_auto_distribute();
    }

    // ----- manual overrides ---------------------------------------------

    /// Set a vehicle's battery level.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::NotFound` for an unknown vehicle
    /// - `SchedulerError::Validation` if `pct` is outside `0..=100`
    pub fn set_battery(&self, vehicle_id: &str, pct: i32) -> Result<Transition, SchedulerError> {
        let vehicle = self.vehicle_handle(vehicle_id)?;
        self.inner.charging.set_battery(&vehicle, pct)
    }

    /// Finish a vehicle's charging episode; a no-op if it holds no station.
    ///
    /// # Errors
    ///
    /// `SchedulerError::NotFound` for an unknown vehicle.
    pub fn finish_charging(&self, vehicle_id: &str) -> Result<bool, SchedulerError> {
        let vehicle = self.vehicle_handle(vehicle_id)?;
        Ok(self.inner.charging.finish_charging(&vehicle))
    }

    /// Mark a station occupied or free by hand.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::NotFound` for an unknown station
    /// - `SchedulerError::Validation` when freeing a station a vehicle is
    ///   charging at
    pub fn set_station_occupancy(&self, station_id: &str, occupied: bool) -> Result<(), SchedulerError> {
        self.inner.stations.set_occupied(station_id, occupied)?;
        self.log(
            EventCategory::Charging,
            station_id,
            if occupied { "marked occupied" } else { "marked free" },
        );
        Ok(())
    }

    /// Stop accepting delivery jobs. Queued jobs still run.
    pub fn shutdown(&self) {
        if let Some(workers) = self.inner.workers.get() {
            workers.shutdown();
        }
        self.log(EventCategory::System, "dispatcher", "stopped accepting delivery jobs");
    }

    // ----- snapshots ----------------------------------------------------

    /// Copy of one vehicle.
    #[must_use]
    pub fn vehicle(&self, vehicle_id: &str) -> Option<StorageVehicle> {
        self.inner.vehicles.get(vehicle_id).map(|v| v.lock().clone())
    }

    /// All vehicles in registration order.
    #[must_use]
    pub fn vehicles(&self) -> Vec<StorageVehicle> {
        self.inner
            .vehicles
            .values()
            .iter()
            .map(|v| v.lock().clone())
            .collect()
    }

    /// All stations in registration order.
    #[must_use]
    pub fn stations(&self) -> Vec<ChargingStation> {
        self.inner.stations.snapshot()
    }

    /// Copy of one task.
    #[must_use]
    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.inner.tasks.get(task_id)
    }

    /// All tasks in creation order.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.inner.tasks.snapshot()
    }

    /// Unassigned stock in distribution order.
    #[must_use]
    pub fn unassigned_items(&self) -> Vec<StorageItem> {
        self.inner.unassigned.snapshot()
    }

    /// True once any distribution pass has run.
    #[must_use]
    pub fn is_auto_enabled(&self) -> bool {
        self.inner.auto_enabled.load(Ordering::SeqCst)
    }

    /// True while a resume scan holds the single-flight guard.
    #[must_use]
    pub fn is_resume_running(&self) -> bool {
        self.inner.resume_running.load(Ordering::SeqCst)
    }

    /// Counters and worker pool statistics.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        let counters = &self.inner.counters;
        DispatchStats {
            distribution_passes: counters.passes.load(Ordering::Relaxed),
            resume_scans: counters.scans.load(Ordering::Relaxed),
            deliveries_completed: counters.deliveries.load(Ordering::Relaxed),
            active_episodes: self.inner.timers.active(),
            pool: self
                .inner
                .workers
                .get()
                .map(WorkerPool::stats)
                .unwrap_or_default(),
        }
    }

    // ----- helpers ------------------------------------------------------

    fn vehicle_handle(&self, vehicle_id: &str) -> Result<VehicleHandle, SchedulerError> {
        self.inner
            .vehicles
            .get(vehicle_id.trim())
            .ok_or_else(|| SchedulerError::not_found("vehicle", vehicle_id))
    }

    fn workers(&self) -> Result<&WorkerPool<DeliveryJob, DeliveryExecutor>, SchedulerError> {
        self.inner.workers.get().ok_or(SchedulerError::PoolShutdown)
    }

    fn submit(&self, job: DeliveryJob, label: impl Into<String>) -> Result<JobId, SchedulerError> {
        Ok(self.workers()?.submit(job, label)?)
    }

    fn log(&self, category: EventCategory, subject_id: &str, message: &str) {
        report_event(self.inner.event_log.as_ref(), category, subject_id, message);
    }
}
