//! Registry of tasks and their status.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::{Registry, SchedulerError, Task, TaskStatus};
use crate::util::validate::require_non_blank;

/// Tasks are created once, updated in place, never deleted.
pub struct TaskStore {
    tasks: Registry<Task>,
    next_batch_number: AtomicU64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Registry::new(),
            next_batch_number: AtomicU64::new(1),
        }
    }

    /// Register a task, trimming its id.
    ///
    /// # Errors
    ///
    /// `SchedulerError::Validation` for a blank or already used id.
    pub fn insert(&self, mut task: Task) -> Result<Task, SchedulerError> {
        task.id = require_non_blank(&task.id, "task id")?;
        let stored = task.clone();
        self.tasks
            .insert_new(&stored.id, task)
            .map_err(|t| SchedulerError::Validation(format!("task '{}' already exists", t.id)))?;
        Ok(stored)
    }

    /// Register a generated batch task named `Task N`, skipping ids already taken.
    pub fn insert_batch(
        &self,
        description: String,
        assignee_vehicle_id: &str,
        status: TaskStatus,
    ) -> Task {
        loop {
            let n = self.next_batch_number.fetch_add(1, Ordering::Relaxed);
            let mut task = Task::new(format!("Task {n}"), description.clone(), Some(assignee_vehicle_id));
            task.status = status;
            let id = task.id.clone();
            if self.tasks.insert_new(&id, task.clone()).is_ok() {
                return task;
            }
        }
    }

    /// Set a task's status, returning the updated task.
    ///
    /// # Errors
    ///
    /// `SchedulerError::NotFound` for an unknown id.
    pub fn set_status(&self, id: &str, status: TaskStatus) -> Result<Task, SchedulerError> {
        self.tasks
            .update(id, |task| {
                task.status = status;
                task.clone()
            })
            .ok_or_else(|| SchedulerError::not_found("task", id))
    }

    /// Copy of one task.
    pub fn get(&self, id: &str) -> Option<Task> {
        self.tasks.get(id)
    }

    /// All tasks in creation order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.values()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when no task exists.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
