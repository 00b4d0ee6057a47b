//! Worker pool configuration.

use serde::{Deserialize, Serialize};

/// Default number of delivery workers.
pub const DEFAULT_WORKER_COUNT: usize = 10;
/// Default bound on queued jobs.
pub const DEFAULT_MAX_QUEUE_DEPTH: usize = 4096;

/// Width and queue bound of a [`WorkerPool`](crate::core::WorkerPool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    /// Number of concurrently running jobs.
    pub worker_count: usize,
    /// Maximum jobs waiting for a worker before submissions are rejected.
    pub max_queue_depth: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            max_queue_depth: DEFAULT_MAX_QUEUE_DEPTH,
        }
    }
}

impl WorkerPoolConfig {
    /// Defaults: 10 workers, 4096 queued jobs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the queue bound.
    #[must_use]
    pub const fn with_max_queue_depth(mut self, max_queue_depth: usize) -> Self {
        self.max_queue_depth = max_queue_depth;
        self
    }

    /// Validate pool configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.max_queue_depth == 0 {
            return Err("max_queue_depth must be greater than 0".into());
        }
        Ok(())
    }
}
