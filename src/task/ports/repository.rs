//! Repository port for task persistence, lookup, and listing.

use crate::task::domain::{Page, PageRequest, StatusTransition, Task, TaskFilter, TaskId, TaskStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Compare-and-swap status write derived from an accepted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Task being updated.
    pub task_id: TaskId,
    /// Status the stored task must still hold for the write to apply.
    pub expected: TaskStatus,
    /// Status to store.
    pub new_status: TaskStatus,
    /// Timestamp to store as the latest change.
    pub updated_at: DateTime<Utc>,
}

impl StatusUpdate {
    /// Builds the status write for an accepted transition.
    #[must_use]
    pub const fn from_transition(transition: &StatusTransition) -> Self {
        let task = transition.task();
        Self {
            task_id: task.id(),
            expected: transition.previous_status(),
            new_status: task.status(),
            updated_at: task.updated_at(),
        }
    }
}

/// Task persistence contract.
///
/// Implementations must serialise status writes per task: two
/// [`update_status`](TaskRepository::update_status) calls expecting the same
/// current status cannot both succeed.
///
/// Only the status is compare-and-swapped. Field writes carry no version, so
/// concurrent [`update_fields`](TaskRepository::update_fields) calls resolve
/// as last writer wins, each rewriting every non-status field from its own
/// snapshot. A status change authorised against a snapshot taken before a
/// concurrent reassignment still applies, and its event names the
/// responsible user from that snapshot.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Persists every field of `task` except its status and returns the
    /// stored task.
    ///
    /// The stored status is kept so a concurrent transition is never undone
    /// by a field edit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update_fields(&self, task: &Task) -> TaskRepositoryResult<Task>;

    /// Writes a new status if the stored status still equals
    /// `update.expected`, and returns the stored task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::Conflict`] when the stored status differs
    /// from the expected one.
    async fn update_status(&self, update: StatusUpdate) -> TaskRepositoryResult<Task>;

    /// Removes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Lists tasks matching `filter`, ordered by creation time then
    /// identifier, windowed by `page`.
    async fn list(&self, filter: &TaskFilter, page: PageRequest)
    -> TaskRepositoryResult<Page<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored status no longer matches the expected one.
    #[error("task {task_id} status is {actual}, expected {expected}")]
    Conflict {
        /// Task whose write was rejected.
        task_id: TaskId,
        /// Status the writer expected.
        expected: TaskStatus,
        /// Status actually stored.
        actual: TaskStatus,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
