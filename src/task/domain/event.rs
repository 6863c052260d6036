//! Values produced by an accepted status transition.

use super::{Task, TaskId, TaskStatus, TaskTitle};
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status-change notice addressed to a task's responsible user.
///
/// Created once per accepted transition and consumed at most once by the
/// notification dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Task whose status changed.
    pub task_id: TaskId,
    /// Task title at the time of the change.
    pub task_title: TaskTitle,
    /// Status before the change.
    pub old_status: TaskStatus,
    /// Status after the change.
    pub new_status: TaskStatus,
    /// Responsible user at the time of the change.
    pub recipient_user_id: UserId,
    /// User who requested the change.
    pub changed_by: UserId,
    /// When the transition was accepted.
    pub occurred_at: DateTime<Utc>,
}

/// Outcome of an accepted transition: the new task value and its event.
///
/// Nothing here is persisted yet; storing the task is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    task: Task,
    previous_status: TaskStatus,
    event: Option<NotificationEvent>,
}

impl StatusTransition {
    pub(super) const fn new(
        task: Task,
        previous_status: TaskStatus,
        event: Option<NotificationEvent>,
    ) -> Self {
        Self {
            task,
            previous_status,
            event,
        }
    }

    /// Returns the task with its new status applied.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the status the task held before the transition.
    #[must_use]
    pub const fn previous_status(&self) -> TaskStatus {
        self.previous_status
    }

    /// Returns the notification event, if the task has a responsible user.
    #[must_use]
    pub const fn event(&self) -> Option<&NotificationEvent> {
        self.event.as_ref()
    }

    /// Splits the transition into the new task value and its event.
    #[must_use]
    pub fn into_parts(self) -> (Task, Option<NotificationEvent>) {
        (self.task, self.event)
    }
}
