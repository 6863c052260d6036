//! Task aggregate root and its status state machine.

use super::{NotificationEvent, StatusTransition, TaskDomainError, TaskId, TaskStatus, TaskTitle};
use crate::identity::domain::{Identity, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: Option<String>,
    status: TaskStatus,
    priority: i32,
    responsible_user_id: Option<UserId>,
    assignees: Vec<UserId>,
    creator_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: TaskTitle,
    description: Option<String>,
    priority: i32,
    responsible_user_id: Option<UserId>,
    assignees: Vec<UserId>,
}

impl NewTask {
    /// Creates task fields with only a title set.
    #[must_use]
    pub const fn new(title: TaskTitle) -> Self {
        Self {
            title,
            description: None,
            priority: 0,
            responsible_user_id: None,
            assignees: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the responsible user.
    #[must_use]
    pub const fn with_responsible_user(mut self, user_id: UserId) -> Self {
        self.responsible_user_id = Some(user_id);
        self
    }

    /// Sets the assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assignees = dedup_users(assignees);
        self
    }

    /// Returns the responsible user, if any.
    #[must_use]
    pub const fn responsible_user_id(&self) -> Option<UserId> {
        self.responsible_user_id
    }

    /// Returns the assignees.
    #[must_use]
    pub fn assignees(&self) -> &[UserId] {
        &self.assignees
    }
}

/// Field edits applied by an update. Unset fields are left unchanged.
///
/// Status is deliberately absent: it only changes through
/// [`Task::transition`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    title: Option<TaskTitle>,
    description: Option<Option<String>>,
    priority: Option<i32>,
    responsible_user_id: Option<Option<UserId>>,
    assignees: Option<Vec<UserId>>,
}

impl TaskChanges {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: TaskTitle) -> Self {
        self.title = Some(title);
        self
    }

    /// Replaces or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Reassigns or clears the responsible user.
    #[must_use]
    pub const fn with_responsible_user(mut self, user_id: Option<UserId>) -> Self {
        self.responsible_user_id = Some(user_id);
        self
    }

    /// Replaces the assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assignees = Some(dedup_users(assignees));
        self
    }

    /// Returns `true` when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.responsible_user_id.is_none()
            && self.assignees.is_none()
    }

    /// Returns every user referenced by the change set.
    #[must_use]
    pub fn referenced_users(&self) -> Vec<UserId> {
        let responsible = self.responsible_user_id.flatten();
        responsible
            .into_iter()
            .chain(self.assignees.iter().flatten().copied())
            .collect()
    }
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: i32,
    /// Persisted responsible user, if any.
    pub responsible_user_id: Option<UserId>,
    /// Persisted assignees.
    pub assignees: Vec<UserId>,
    /// Persisted creator.
    pub creator_id: UserId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in [`TaskStatus::Open`].
    #[must_use]
    pub fn create(fields: NewTask, creator_id: UserId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title: fields.title,
            description: fields.description,
            status: TaskStatus::Open,
            priority: fields.priority,
            responsible_user_id: fields.responsible_user_id,
            assignees: fields.assignees,
            creator_id,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            responsible_user_id: data.responsible_user_id,
            assignees: data.assignees,
            creator_id: data.creator_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Decomposes the task into its persisted representation.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedTaskData {
        PersistedTaskData {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            responsible_user_id: self.responsible_user_id,
            assignees: self.assignees.clone(),
            creator_id: self.creator_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns the responsible user, if any.
    #[must_use]
    pub const fn responsible_user_id(&self) -> Option<UserId> {
        self.responsible_user_id
    }

    /// Returns the assignees.
    #[must_use]
    pub fn assignees(&self) -> &[UserId] {
        &self.assignees
    }

    /// Returns the user who created the task.
    #[must_use]
    pub const fn creator_id(&self) -> UserId {
        self.creator_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies field edits and refreshes `updated_at`.
    pub fn apply_changes(&mut self, changes: TaskChanges, clock: &impl Clock) {
        if changes.is_empty() {
            return;
        }
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(responsible) = changes.responsible_user_id {
            self.responsible_user_id = responsible;
        }
        if let Some(assignees) = changes.assignees {
            self.assignees = assignees;
        }
        self.touch(clock);
    }

    /// Computes the result of moving this task to `requested`.
    ///
    /// The receiver is left untouched. On success the returned transition
    /// holds the updated task and, when the task has a responsible user, one
    /// event addressed to that user, even if they are also the actor.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when
    /// `(current, requested)` is not an allowed edge.
    pub fn transition(
        &self,
        requested: TaskStatus,
        actor: &Identity,
        clock: &impl Clock,
    ) -> Result<StatusTransition, TaskDomainError> {
        let from = self.status;
        if !from.can_transition_to(requested) {
            return Err(TaskDomainError::InvalidTransition {
                task_id: self.id,
                from,
                to: requested,
            });
        }

        let mut updated = self.clone();
        updated.status = requested;
        updated.touch(clock);

        let event = updated
            .responsible_user_id
            .map(|recipient_user_id| NotificationEvent {
                task_id: updated.id,
                task_title: updated.title.clone(),
                old_status: from,
                new_status: requested,
                recipient_user_id,
                changed_by: actor.user_id(),
                occurred_at: updated.updated_at,
            });

        Ok(StatusTransition::new(updated, from, event))
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn dedup_users(users: impl IntoIterator<Item = UserId>) -> Vec<UserId> {
    let mut unique = Vec::new();
    for user in users {
        if !unique.contains(&user) {
            unique.push(user);
        }
    }
    unique
}
