//! Bounded-width worker pool for fire-and-forget async jobs.
//!
//! A fixed number of async workers drain a shared `flume` MPMC queue, so at
//! most `worker_count` jobs run at once no matter how many are submitted.
//! Submission never blocks: it either enqueues or fails immediately.
//!
//! # Design Principles
//!
//! - **No polling**: workers park on `recv_async` until a job arrives
//! - **Clean shutdown**: dropping the sender lets workers drain what is queued, then exit
//! - **Panic isolation**: each job runs in its own task so a panic cannot shrink the pool

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use flume::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::WorkerPoolConfig;
use crate::core::executor::{JobId, JobMetadata, Spawn, WorkerExecutor};
use crate::util::clock::now_ms;

/// Errors that can occur when using a `WorkerPool`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The job queue is full; no more jobs can be accepted.
    QueueFull,

    /// The pool has been shut down.
    PoolShutdown,

    /// Configuration validation failed.
    InvalidConfig(String),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "job queue is full"),
            Self::PoolShutdown => write!(f, "pool has been shut down"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for PoolError {}

/// Statistics about pool utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of workers.
    pub worker_count: usize,

    /// Currently executing jobs.
    pub active_jobs: u64,

    /// Jobs waiting in the queue.
    pub queued_jobs: u64,

    /// Total jobs that ran to completion.
    pub completed_jobs: u64,

    /// Total jobs that panicked.
    pub failed_jobs: u64,

    /// Total jobs accepted.
    pub submitted_jobs: u64,
}

/// Internal counters for pool statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub active_jobs: AtomicU64,
    pub queued_jobs: AtomicU64,
    pub completed_jobs: AtomicU64,
    pub failed_jobs: AtomicU64,
    pub submitted_jobs: AtomicU64,
}

impl PoolCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, worker_count: usize) -> PoolStats {
        PoolStats {
            worker_count,
            active_jobs: self.active_jobs.load(Ordering::Relaxed),
            queued_jobs: self.queued_jobs.load(Ordering::Relaxed),
            completed_jobs: self.completed_jobs.load(Ordering::Relaxed),
            failed_jobs: self.failed_jobs.load(Ordering::Relaxed),
            submitted_jobs: self.submitted_jobs.load(Ordering::Relaxed),
        }
    }
}

/// A job waiting for a worker.
struct WorkerJob<P> {
    payload: P,
    meta: JobMetadata,
}

/// Fixed-width pool of async workers.
pub struct WorkerPool<P, E>
where
    P: Send + 'static,
    E: WorkerExecutor<P>,
{
    /// Pool configuration.
    config: WorkerPoolConfig,

    /// Job sender. `None` once shut down.
    job_tx: Mutex<Option<Sender<WorkerJob<P>>>>,

    /// Pool statistics counters (lock-free atomics).
    counters: Arc<PoolCounters>,

    /// Shutdown flag (lock-free atomic).
    shutdown: AtomicBool,

    /// Job ID counter (lock-free atomic).
    job_id_counter: AtomicU64,

    _executor: PhantomData<E>,
}

impl<P, E> WorkerPool<P, E>
where
    P: Send + 'static,
    E: WorkerExecutor<P>,
{
    /// Create the pool and spawn `config.worker_count` workers on `spawner`.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if the configuration is invalid.
    pub fn new<S: Spawn>(config: WorkerPoolConfig, executor: E, spawner: &S) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        let (job_tx, job_rx) = flume::bounded::<WorkerJob<P>>(config.max_queue_depth);
        let counters = Arc::new(PoolCounters::default());

        for worker_id in 0..config.worker_count {
            spawner.spawn(run_worker(
                worker_id,
                job_rx.clone(),
                Arc::clone(&counters),
                executor.clone(),
            ));
        }

        info!(
            worker_count = config.worker_count,
            max_queue_depth = config.max_queue_depth,
            "worker pool initialized"
        );

        Ok(Self {
            config,
            job_tx: Mutex::new(Some(job_tx)),
            counters,
            shutdown: AtomicBool::new(false),
            job_id_counter: AtomicU64::new(0),
            _executor: PhantomData,
        })
    }

    /// Enqueue a job without waiting for it.
    ///
    /// # Errors
    ///
    /// - `PoolError::QueueFull` if the job queue is full
    /// - `PoolError::PoolShutdown` if the pool has been shut down
    pub fn submit(&self, payload: P, label: impl Into<String>) -> Result<JobId, PoolError> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(PoolError::PoolShutdown);
        }

        let job_id = self.job_id_counter.fetch_add(1, Ordering::Relaxed);
        let job = WorkerJob {
            payload,
            meta: JobMetadata {
                id: job_id,
                label: label.into(),
                submitted_at_ms: now_ms(),
            },
        };

        let job_tx = self.job_tx.lock();
        let Some(job_tx) = job_tx.as_ref() else {
            return Err(PoolError::PoolShutdown);
        };

        // Count before sending so a fast worker never decrements below zero.
        self.counters.queued_jobs.fetch_add(1, Ordering::Relaxed);
        match job_tx.try_send(job) {
            Ok(()) => {
                self.counters.submitted_jobs.fetch_add(1, Ordering::Relaxed);
                debug!(job_id, "job submitted to worker pool");
                Ok(job_id)
            }
            Err(TrySendError::Full(_)) => {
                self.counters.queued_jobs.fetch_sub(1, Ordering::Relaxed);
                warn!("worker pool queue is full");
                Err(PoolError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => {
                self.counters.queued_jobs.fetch_sub(1, Ordering::Relaxed);
                Err(PoolError::PoolShutdown)
            }
        }
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.config.worker_count)
    }

    /// Whether [`WorkerPool::shutdown`] has been called.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Stop accepting submissions. Queued jobs still run; workers then exit.
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }
        self.job_tx.lock().take();
        info!("worker pool stopped accepting jobs");
    }
}

impl<P, E> Drop for WorkerPool<P, E>
where
    P: Send + 'static,
    E: WorkerExecutor<P>,
{
    fn drop(&mut self) {
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            self.job_tx.lock().take();
            debug!("worker pool dropped without explicit shutdown");
        }
    }
}

async fn run_worker<P, E>(
    worker_id: usize,
    job_rx: Receiver<WorkerJob<P>>,
    counters: Arc<PoolCounters>,
    executor: E,
) where
    P: Send + 'static,
    E: WorkerExecutor<P>,
{
    debug!(worker_id, "worker started");

    // recv_async fails only once every sender is gone and the queue is drained.
    while let Ok(job) = job_rx.recv_async().await {
        counters.queued_jobs.fetch_sub(1, Ordering::Relaxed);
        counters.active_jobs.fetch_add(1, Ordering::Relaxed);

        let job_id = job.meta.id;
        let label = job.meta.label.clone();
        debug!(worker_id, job_id, %label, "worker executing job");

        let exec = executor.clone();
        let outcome = tokio::spawn(async move { exec.execute(job.payload, job.meta).await }).await;

        counters.active_jobs.fetch_sub(1, Ordering::Relaxed);
        match outcome {
            Ok(()) => {
                counters.completed_jobs.fetch_add(1, Ordering::Relaxed);
                debug!(worker_id, job_id, "worker completed job");
            }
            Err(e) => {
                counters.failed_jobs.fetch_add(1, Ordering::Relaxed);
                error!(worker_id, job_id, %label, error = %e, "job panicked");
            }
        }
    }

    debug!(worker_id, "worker exiting");
}
