//! Dispatcher timings, thresholds and bootstrap data.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::WorkerPoolConfig;
use crate::core::AppResult;

/// Prefix of every environment override read by [`DispatchConfig::from_env`].
pub const ENV_PREFIX: &str = "MEDSUPPLY_";

/// Battery thresholds and timings that drive the vehicle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargingPolicy {
    /// A battery update at or below this level starts a charging episode.
    pub low_battery_pct: u8,
    /// Charging stops once the battery reaches this level.
    pub charged_pct: u8,
    /// Battery gained per charge tick.
    pub charge_step_pct: u8,
    /// Interval between charge ticks.
    pub charge_tick_ms: u64,
    /// Interval between station retries while waiting.
    pub wait_poll_ms: u64,
    /// Waiting longer than this abandons the queue.
    pub wait_timeout_ms: u64,
}

impl Default for ChargingPolicy {
    fn default() -> Self {
        Self {
            low_battery_pct: 14,
            charged_pct: 95,
            charge_step_pct: 5,
            charge_tick_ms: 20_000,
            wait_poll_ms: 5_000,
            wait_timeout_ms: 40_000,
        }
    }
}

impl ChargingPolicy {
    /// Charge tick interval.
    #[must_use]
    pub const fn charge_tick(&self) -> Duration {
        Duration::from_millis(self.charge_tick_ms)
    }

    /// Wait-queue poll interval.
    #[must_use]
    pub const fn wait_poll(&self) -> Duration {
        Duration::from_millis(self.wait_poll_ms)
    }

    /// Wait-queue timeout.
    #[must_use]
    pub const fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Validate thresholds and timings.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.charged_pct > 100 {
            return Err("charged_pct must be at most 100".into());
        }
        if self.low_battery_pct >= self.charged_pct {
            return Err("low_battery_pct must be below charged_pct".into());
        }
        if self.charge_step_pct == 0 {
            return Err("charge_step_pct must be greater than 0".into());
        }
        if self.charge_tick_ms == 0 || self.wait_poll_ms == 0 || self.wait_timeout_ms == 0 {
            return Err("charging timings must be greater than 0".into());
        }
        Ok(())
    }
}

/// Charging station registered at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSeed {
    /// Station id.
    pub id: String,
    /// Station name.
    pub name: String,
}

/// Unassigned stock loaded at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSeed {
    /// Stock keeping unit.
    pub sku: String,
    /// Item name.
    pub name: String,
    /// Units.
    pub quantity: i64,
}

/// Root dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Delivery worker pool.
    pub pool: WorkerPoolConfig,
    /// Vehicle charging behaviour.
    pub charging: ChargingPolicy,
    /// Simulated transit time of one delivery.
    pub transit_ms: u64,
    /// Most units moved by one delivery task.
    pub batch_cap: u32,
    /// Battery drained by every task status update.
    pub status_drain_pct: u8,
    /// Battery drained by a completed auto-distribution delivery.
    pub delivery_drain_pct: u8,
    /// Distinct SKUs a vehicle may carry.
    pub vehicle_capacity: usize,
    /// Stations registered at startup.
    pub stations: Vec<StationSeed>,
    /// Unassigned stock loaded at startup.
    pub seed_items: Vec<ItemSeed>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pool: WorkerPoolConfig::default(),
            charging: ChargingPolicy::default(),
            transit_ms: 60_000,
            batch_cap: 50,
            status_drain_pct: 5,
            delivery_drain_pct: 10,
            vehicle_capacity: 50,
            stations: (1..=3)
                .map(|i| StationSeed {
                    id: format!("CHG-DEFAULT-{i}"),
                    name: format!("Default_Station_{i}"),
                })
                .collect(),
            seed_items: Vec::new(),
        }
    }
}

impl DispatchConfig {
    /// Simulated transit time.
    #[must_use]
    pub const fn transit(&self) -> Duration {
        Duration::from_millis(self.transit_ms)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending section and field.
    pub fn validate(&self) -> Result<(), String> {
        self.pool.validate().map_err(|e| format!("pool invalid: {e}"))?;
        self.charging
            .validate()
            .map_err(|e| format!("charging invalid: {e}"))?;
        if self.transit_ms == 0 {
            return Err("transit_ms must be greater than 0".into());
        }
        if self.batch_cap == 0 {
            return Err("batch_cap must be greater than 0".into());
        }
        if self.status_drain_pct > 100 || self.delivery_drain_pct > 100 {
            return Err("battery drains must be at most 100".into());
        }
        if self.vehicle_capacity == 0 {
            return Err("vehicle_capacity must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a message for malformed JSON or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, parsed or validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json_str(&raw)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("loading config file {}", path.display()))
    }

    /// Build configuration from the environment (and a `.env` file, if present).
    ///
    /// `MEDSUPPLY_CONFIG` names an optional JSON base file; the remaining
    /// `MEDSUPPLY_*` variables override individual fields.
    ///
    /// # Errors
    ///
    /// Fails on an unreadable base file, an unparsable override, or an
    /// invalid result.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();

        let mut cfg = match std::env::var(format!("{ENV_PREFIX}CONFIG")) {
            Ok(path) => Self::from_json_file(path)?,
            Err(_) => Self::default(),
        };

        env_override("WORKER_COUNT", &mut cfg.pool.worker_count)?;
        env_override("MAX_QUEUE_DEPTH", &mut cfg.pool.max_queue_depth)?;
        env_override("TRANSIT_MS", &mut cfg.transit_ms)?;
        env_override("BATCH_CAP", &mut cfg.batch_cap)?;
        env_override("STATUS_DRAIN_PCT", &mut cfg.status_drain_pct)?;
        env_override("DELIVERY_DRAIN_PCT", &mut cfg.delivery_drain_pct)?;
        env_override("VEHICLE_CAPACITY", &mut cfg.vehicle_capacity)?;
        env_override("LOW_BATTERY_PCT", &mut cfg.charging.low_battery_pct)?;
        env_override("CHARGED_PCT", &mut cfg.charging.charged_pct)?;
        env_override("CHARGE_STEP_PCT", &mut cfg.charging.charge_step_pct)?;
        env_override("CHARGE_TICK_MS", &mut cfg.charging.charge_tick_ms)?;
        env_override("WAIT_POLL_MS", &mut cfg.charging.wait_poll_ms)?;
        env_override("WAIT_TIMEOUT_MS", &mut cfg.charging.wait_timeout_ms)?;

        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn env_override<T>(suffix: &str, slot: &mut T) -> AppResult<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let key = format!("{ENV_PREFIX}{suffix}");
    if let Ok(raw) = std::env::var(&key) {
        *slot = raw
            .trim()
            .parse()
            .with_context(|| format!("parsing {key}={raw}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fleet_constants() {
        let cfg = DispatchConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.stations.len(), 3);
        assert_eq!(cfg.stations[0].id, "CHG-DEFAULT-1");
        assert_eq!(cfg.charging.low_battery_pct, 14);
        assert_eq!(cfg.transit(), Duration::from_secs(60));
    }

    #[test]
    fn test_env_override_parses_value() {
        std::env::set_var("MEDSUPPLY_TEST_ONLY_WIDTH", "7");
        let mut width = 1usize;
        env_override("TEST_ONLY_WIDTH", &mut width).unwrap();
        assert_eq!(width, 7);

        std::env::set_var("MEDSUPPLY_TEST_ONLY_BAD", "seven");
        assert!(env_override("TEST_ONLY_BAD", &mut width).is_err());
        assert_eq!(width, 7);
    }

    #[test]
    fn test_from_env_overrides_drains_step_and_capacity() {
        let vars = [
            ("MEDSUPPLY_STATUS_DRAIN_PCT", "7"),
            ("MEDSUPPLY_DELIVERY_DRAIN_PCT", "12"),
            ("MEDSUPPLY_CHARGE_STEP_PCT", "10"),
            ("MEDSUPPLY_VEHICLE_CAPACITY", "3"),
        ];
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let cfg = DispatchConfig::from_env();
        for (key, _) in vars {
            std::env::remove_var(key);
        }

        let cfg = cfg.unwrap();
        assert_eq!(cfg.status_drain_pct, 7);
        assert_eq!(cfg.delivery_drain_pct, 12);
        assert_eq!(cfg.charging.charge_step_pct, 10);
        assert_eq!(cfg.vehicle_capacity, 3);
        assert_eq!(cfg.batch_cap, 50);
    }
}
