//! Tokio runtime spawner implementation.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::{Handle, Runtime, TryCurrentError};

use crate::core::Spawn;

/// Tokio-based spawner that executes tasks on a tokio runtime.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: Handle,
    // Keeps a runtime built by `with_worker_threads` alive.
    _runtime: Option<Arc<Runtime>>,
}

impl TokioSpawner {
    /// Create a spawner from a tokio runtime handle.
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self {
            handle,
            _runtime: None,
        }
    }

    /// Spawner for the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Fails when called outside a tokio runtime.
    pub fn current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }

    /// Create a spawner that owns a new multi-threaded runtime.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while building the runtime.
    pub fn with_worker_threads(worker_threads: usize) -> Result<Self, std::io::Error> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads)
            .enable_all()
            .build()?;
        Ok(Self {
            handle: runtime.handle().clone(),
            _runtime: Some(Arc::new(runtime)),
        })
    }

    /// Handle of the underlying runtime.
    #[must_use]
    pub const fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut);
    }
}
