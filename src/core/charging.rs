//! Vehicle battery state machine.
//!
//! Battery updates drive each vehicle through `Idle → Charging → Idle` or
//! `Idle → Waiting → (Charging | LeftQueue)`. Charge ticks and wait-queue
//! polls run as one [`EpisodeTimers`] unit per vehicle. Vehicle locks are
//! never held across a suspension point; lock order is vehicle, then station
//! pool or episode timers. Ending an episode from outside its unit cancels
//! the unit before the vehicle lock is released, so a new episode opened by
//! the next update is never cancelled in its place.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::ChargingPolicy;
use crate::core::audit::{report_event, EventCategory, EventLog};
use crate::core::episodes::EpisodeTimers;
use crate::core::resource_pool::{StationLease, StationPool};
use crate::core::{ChargeState, SchedulerError, StorageVehicle};
use crate::util::clock::Clock;

/// Shared, lockable vehicle record.
pub type VehicleHandle = Arc<Mutex<StorageVehicle>>;

/// What a battery update did to the charging episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// No episode change.
    Unchanged,
    /// A station was claimed.
    StartedCharging(StationLease),
    /// No station was free; the vehicle joined the wait queue.
    StartedWaiting,
    /// Charging finished and the station was released.
    FinishedCharging {
        /// Released station id.
        station_id: String,
    },
}

enum Tick {
    Charged(u8),
    Finished { station_id: String, battery: u8 },
}

enum Poll {
    StillWaiting,
    LeftQueue,
    Charging(StationLease),
}

/// Drives battery updates, charge loops and wait-queue polls.
#[derive(Clone)]
pub struct ChargeCoordinator {
    stations: Arc<StationPool>,
    timers: Arc<EpisodeTimers>,
    log: Arc<dyn EventLog>,
    clock: Arc<dyn Clock>,
    policy: ChargingPolicy,
}

impl ChargeCoordinator {
    /// Create a coordinator over `stations`.
    pub fn new(
        stations: Arc<StationPool>,
        timers: Arc<EpisodeTimers>,
        log: Arc<dyn EventLog>,
        clock: Arc<dyn Clock>,
        policy: ChargingPolicy,
    ) -> Self {
        Self {
            stations,
            timers,
            log,
            clock,
            policy,
        }
    }

    /// Thresholds and timings in use.
    #[must_use]
    pub const fn policy(&self) -> &ChargingPolicy {
        &self.policy
    }

    /// Set the battery level and apply the resulting transition.
    ///
    /// # Errors
    ///
    /// `SchedulerError::Validation` if `pct` is outside `0..=100`; the vehicle
    /// is left untouched.
    pub fn set_battery(&self, vehicle: &VehicleHandle, pct: i32) -> Result<Transition, SchedulerError> {
        let pct = u8::try_from(pct)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| SchedulerError::Validation(format!("battery must be within 0..=100, got {pct}")))?;
        Ok(self.update_battery(vehicle, |_| pct))
    }

    /// Drain `amount` percent, flooring at zero.
    pub fn drain(&self, vehicle: &VehicleHandle, amount: u8) -> Transition {
        self.update_battery(vehicle, |current| current.saturating_sub(amount))
    }

    /// Finish the vehicle's charging episode, releasing its station.
    ///
    /// A vehicle that is not charging is left alone; returns whether an
    /// episode was finished.
    pub fn finish_charging(&self, vehicle: &VehicleHandle) -> bool {
        let (vehicle_id, released) = {
            let mut v = vehicle.lock();
            (v.id().to_string(), self.finish_locked(&mut v))
        };
        let Some(station_id) = released else {
            debug!(vehicle_id = %vehicle_id, "finish requested without an assigned station");
            return false;
        };
        self.report_finished(&vehicle_id, &station_id);
        true
    }

    fn update_battery(&self, vehicle: &VehicleHandle, next: impl FnOnce(u8) -> u8) -> Transition {
        let (vehicle_id, battery, transition) = {
            let mut v = vehicle.lock();
            let battery = next(v.battery_pct());
            v.set_battery_unchecked(battery);
            let transition = self.apply_thresholds(&mut v, vehicle);
            (v.id().to_string(), battery, transition)
        };

        report_event(
            self.log.as_ref(),
            EventCategory::Vehicle,
            &vehicle_id,
            &format!("battery set to {battery}%"),
        );
        match &transition {
            Transition::Unchanged => {}
            Transition::StartedCharging(lease) => self.report_started(&vehicle_id, lease),
            Transition::StartedWaiting => {
                info!(vehicle_id = %vehicle_id, "no free station, waiting");
                report_event(
                    self.log.as_ref(),
                    EventCategory::Charging,
                    &vehicle_id,
                    "no free charging station, waiting in queue",
                );
            }
            Transition::FinishedCharging { station_id } => {
                self.report_finished(&vehicle_id, station_id);
            }
        }
        transition
    }

    /// Caller holds the vehicle lock.
    fn apply_thresholds(&self, v: &mut StorageVehicle, handle: &VehicleHandle) -> Transition {
        let battery = v.battery_pct();
        let episode_open = matches!(v.charge_state(), ChargeState::Idle | ChargeState::LeftQueue);

        if battery <= self.policy.low_battery_pct && episode_open {
            if let Some(lease) = self.stations.allocate() {
                v.set_charge_state(ChargeState::Charging {
                    station_id: lease.id.clone(),
                });
                let this = self.clone();
                let handle = Arc::clone(handle);
                self.timers.schedule(v.id(), async move { this.charge_loop(handle).await });
                return Transition::StartedCharging(lease);
            }
            v.set_charge_state(ChargeState::Waiting {
                since: self.clock.now(),
            });
            let this = self.clone();
            let handle = Arc::clone(handle);
            self.timers.schedule(v.id(), async move { this.wait_loop(handle).await });
            return Transition::StartedWaiting;
        }

        if battery >= self.policy.charged_pct {
            if let Some(station_id) = self.finish_locked(v) {
                return Transition::FinishedCharging { station_id };
            }
        }
        Transition::Unchanged
    }

    /// Release the station and cancel the vehicle's charge unit. Caller holds
    /// the vehicle lock and is not the unit itself.
    fn finish_locked(&self, v: &mut StorageVehicle) -> Option<String> {
        let station_id = self.release_locked(v)?;
        self.timers.cancel(v.id());
        Some(station_id)
    }

    /// Caller holds the vehicle lock.
    fn release_locked(&self, v: &mut StorageVehicle) -> Option<String> {
        let ChargeState::Charging { station_id } = v.charge_state() else {
            return None;
        };
        let station_id = station_id.clone();
        self.stations.release(&station_id);
        v.set_charge_state(ChargeState::Idle);
        Some(station_id)
    }

    async fn charge_loop(self, vehicle: VehicleHandle) {
        loop {
            self.clock.sleep(self.policy.charge_tick()).await;

            let (vehicle_id, tick) = {
                let mut v = vehicle.lock();
                if !v.is_charging() {
                    return;
                }
                let battery = v
                    .battery_pct()
                    .saturating_add(self.policy.charge_step_pct)
                    .min(100);
                v.set_battery_unchecked(battery);
                let tick = if battery >= self.policy.charged_pct {
                    match self.release_locked(&mut v) {
                        Some(station_id) => Tick::Finished { station_id, battery },
                        None => return,
                    }
                } else {
                    Tick::Charged(battery)
                };
                (v.id().to_string(), tick)
            };

            match tick {
                Tick::Charged(battery) => {
                    debug!(vehicle_id = %vehicle_id, battery, "charge tick");
                    report_event(
                        self.log.as_ref(),
                        EventCategory::Charging,
                        &vehicle_id,
                        &format!("charging, battery at {battery}%"),
                    );
                }
                Tick::Finished { station_id, battery } => {
                    debug!(vehicle_id = %vehicle_id, battery, "charge complete");
                    self.report_finished(&vehicle_id, &station_id);
                    return;
                }
            }
        }
    }

    async fn wait_loop(self, vehicle: VehicleHandle) {
        loop {
            self.clock.sleep(self.policy.wait_poll()).await;

            let (vehicle_id, poll) = {
                let mut v = vehicle.lock();
                let ChargeState::Waiting { since } = *v.charge_state() else {
                    return;
                };
                let poll = if self.clock.now().duration_since(since) > self.policy.wait_timeout() {
                    v.set_charge_state(ChargeState::LeftQueue);
                    Poll::LeftQueue
                } else if let Some(lease) = self.stations.allocate() {
                    v.set_charge_state(ChargeState::Charging {
                        station_id: lease.id.clone(),
                    });
                    Poll::Charging(lease)
                } else {
                    Poll::StillWaiting
                };
                (v.id().to_string(), poll)
            };

            match poll {
                Poll::StillWaiting => debug!(vehicle_id = %vehicle_id, "still waiting for a station"),
                Poll::LeftQueue => {
                    info!(vehicle_id = %vehicle_id, "wait timeout exceeded, leaving queue");
                    report_event(
                        self.log.as_ref(),
                        EventCategory::Charging,
                        &vehicle_id,
                        "wait timeout exceeded, left the charging queue",
                    );
                    return;
                }
                Poll::Charging(lease) => {
                    self.report_started(&vehicle_id, &lease);
                    return self.charge_loop(vehicle).await;
                }
            }
        }
    }

    fn report_started(&self, vehicle_id: &str, lease: &StationLease) {
        info!(vehicle_id, station_id = %lease.id, "charging started");
        report_event(
            self.log.as_ref(),
            EventCategory::Charging,
            vehicle_id,
            &format!("charging started at station {} ({})", lease.id, lease.name),
        );
    }

    fn report_finished(&self, vehicle_id: &str, station_id: &str) {
        info!(vehicle_id, station_id, "charging finished");
        report_event(
            self.log.as_ref(),
            EventCategory::Charging,
            vehicle_id,
            &format!("charging finished, released station {station_id}"),
        );
    }
}
