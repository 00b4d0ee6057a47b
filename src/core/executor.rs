//! Job execution and spawning traits.

use std::future::Future;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifier assigned to a job by the worker pool.
pub type JobId = u64;

/// Metadata attached to every job submitted to a worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    /// Pool-assigned job id.
    pub id: JobId,
    /// Short description used in logs (e.g. `delivery Task 3`).
    pub label: String,
    /// Submission timestamp in milliseconds since epoch.
    pub submitted_at_ms: u128,
}

/// Abstraction for spawning futures on a runtime.
pub trait Spawn {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Runs the payloads a [`WorkerPool`](crate::core::WorkerPool) dequeues.
///
/// Jobs are fire-and-forget: callers never await completion, so the executor
/// applies its effects directly instead of returning a result.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone)]
/// struct Printer;
///
/// #[async_trait]
/// impl WorkerExecutor<String> for Printer {
///     async fn execute(&self, payload: String, meta: JobMetadata) {
///         println!("job {}: {payload}", meta.id);
///     }
/// }
/// ```
#[async_trait]
pub trait WorkerExecutor<P>: Send + Sync + Clone + 'static
where
    P: Send + 'static,
{
    /// Execute one job to completion.
    async fn execute(&self, payload: P, meta: JobMetadata);
}
