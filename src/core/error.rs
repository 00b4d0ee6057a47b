//! Error types for scheduler operations.

use thiserror::Error;

use crate::core::worker_pool::PoolError;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Input rejected before any state was touched.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind (vehicle, task, station).
        kind: &'static str,
        /// Identifier that was looked up.
        id: String,
    },
    /// Logging or delivery-sink write failure.
    #[error("collaborator error: {0}")]
    Collaborator(String),
    /// Worker pool no longer accepts submissions.
    #[error("worker pool has been shut down")]
    PoolShutdown,
    /// Worker pool queue is at capacity.
    #[error("worker pool queue is full")]
    QueueFull,
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SchedulerError {
    /// Shorthand for a [`SchedulerError::NotFound`].
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }
}

impl From<PoolError> for SchedulerError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::QueueFull => Self::QueueFull,
            PoolError::PoolShutdown => Self::PoolShutdown,
            PoolError::InvalidConfig(msg) => Self::InvalidConfig(msg),
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
