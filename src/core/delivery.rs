//! Jobs run by the delivery worker pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tracing::debug;

use crate::core::dispatcher::{Dispatcher, DispatcherInner};
use crate::core::executor::{JobMetadata, WorkerExecutor};

/// Origin of a delivery job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    /// Started by moving a task to `IN_PROGRESS`.
    Manual,
    /// Created by a distribution pass; drains extra battery on completion.
    Batch,
}

/// One simulated delivery of a task by its vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOrder {
    /// Task completed by the delivery.
    pub task_id: String,
    /// Vehicle carrying the goods.
    pub vehicle_id: String,
    /// Manual or batch.
    pub kind: DeliveryKind,
}

/// Holds the single-flight resume flag; clears it when dropped.
///
/// The guard travels inside the queued job, so the flag is released exactly
/// once whether the scan runs, is rejected, or is dropped with the queue.
#[derive(Debug)]
pub struct ResumeGuard {
    flag: Arc<AtomicBool>,
}

impl ResumeGuard {
    /// Claim `flag`, or `None` if another scan holds it.
    pub(crate) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for ResumeGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Payload of the delivery worker pool.
#[derive(Debug)]
pub enum DeliveryJob {
    /// Carry out a delivery.
    Deliver(DeliveryOrder),
    /// Look for free vehicles and pooled stock, then distribute.
    ResumeScan(ResumeGuard),
}

/// Executes [`DeliveryJob`]s against the dispatcher that submitted them.
#[derive(Clone)]
pub struct DeliveryExecutor {
    dispatcher: Weak<DispatcherInner>,
}

impl DeliveryExecutor {
    pub(crate) const fn new(dispatcher: Weak<DispatcherInner>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl WorkerExecutor<DeliveryJob> for DeliveryExecutor {
    async fn execute(&self, job: DeliveryJob, meta: JobMetadata) {
        let Some(inner) = self.dispatcher.upgrade() else {
            debug!(job_id = meta.id, label = %meta.label, "dispatcher gone, dropping job");
            return;
        };
        let dispatcher = Dispatcher::from_inner(inner);
        match job {
            DeliveryJob::Deliver(order) => dispatcher.run_delivery(order).await,
            DeliveryJob::ResumeScan(guard) => {
                dispatcher.run_resume_scan();
                drop(guard);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_guard_is_single_flight() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = ResumeGuard::acquire(&flag).unwrap();
        assert!(ResumeGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::SeqCst));
        assert!(ResumeGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_dropping_unrun_job_releases_guard() {
        let flag = Arc::new(AtomicBool::new(false));
        let job = DeliveryJob::ResumeScan(ResumeGuard::acquire(&flag).unwrap());
        assert!(flag.load(Ordering::SeqCst));
        drop(job);
        assert!(!flag.load(Ordering::SeqCst));
    }
}
