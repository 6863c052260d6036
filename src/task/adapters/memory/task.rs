//! In-memory repository for tasks.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Page, PageRequest, PersistedTaskData, Task, TaskFilter, TaskId, paginate},
    ports::{StatusUpdate, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Status writes compare and swap inside a single write-lock scope, which
/// gives the per-task serialisation the repository port requires.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut tasks = self.state.write().map_err(lock_error)?;
        if tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let tasks = self.state.read().map_err(lock_error)?;
        Ok(tasks.get(&id).cloned())
    }

    async fn update_fields(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let mut tasks = self.state.write().map_err(lock_error)?;
        let stored = tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;

        let mut data = task.to_persisted();
        data.status = stored.status();
        data.created_at = stored.created_at();
        data.creator_id = stored.creator_id();
        *stored = Task::from_persisted(data);
        Ok(stored.clone())
    }

    async fn update_status(&self, update: StatusUpdate) -> TaskRepositoryResult<Task> {
        let mut tasks = self.state.write().map_err(lock_error)?;
        let stored = tasks
            .get_mut(&update.task_id)
            .ok_or(TaskRepositoryError::NotFound(update.task_id))?;

        if stored.status() != update.expected {
            return Err(TaskRepositoryError::Conflict {
                task_id: update.task_id,
                expected: update.expected,
                actual: stored.status(),
            });
        }

        let data = PersistedTaskData {
            status: update.new_status,
            updated_at: update.updated_at,
            ..stored.to_persisted()
        };
        *stored = Task::from_persisted(data);
        Ok(stored.clone())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut tasks = self.state.write().map_err(lock_error)?;
        tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskRepositoryError::NotFound(id))
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<Task>> {
        let tasks = self.state.read().map_err(lock_error)?;
        Ok(paginate(tasks.values(), filter, page))
    }
}
