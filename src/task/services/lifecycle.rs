//! Service layer for authenticated, authorised task operations.
//!
//! Every operation follows the same pipeline: resolve the caller from a
//! bearer token, load the target task, ask the policy engine, then mutate.
//! Status changes additionally hand their event to the notification
//! dispatcher once the new status is stored.

use mockable::Clock;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::identity::{
    domain::{Identity, UserId},
    ports::{UserRepository, UserRepositoryError},
    services::{TokenError, TokenService},
};
use crate::notification::{domain::Notification, services::NotificationDispatcher};
use crate::policy::{Action, ResourceContext, authorize};
use crate::task::{
    domain::{
        NewTask, NotificationEvent, Page, PageError, PageLimits, PageRequest, Task, TaskChanges,
        TaskDomainError, TaskFilter, TaskId, TaskStatus, TaskTitle,
    },
    ports::{StatusUpdate, TaskRepository, TaskRepositoryError},
};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTaskRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    responsible_user_id: Option<UserId>,
    #[serde(default)]
    assignees: Vec<UserId>,
}

impl NewTaskRequest {
    /// Creates a request with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
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
        self.assignees = assignees.into_iter().collect();
        self
    }

    fn into_new_task(self) -> Result<NewTask, TaskDomainError> {
        let mut fields = NewTask::new(TaskTitle::new(self.title)?)
            .with_priority(self.priority)
            .with_assignees(self.assignees);
        if let Some(description) = self.description {
            fields = fields.with_description(description);
        }
        if let Some(responsible) = self.responsible_user_id {
            fields = fields.with_responsible_user(responsible);
        }
        Ok(fields)
    }
}

/// Request payload for editing task fields. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<Option<String>>,
    #[serde(default)]
    priority: Option<i32>,
    #[serde(default)]
    responsible_user_id: Option<Option<UserId>>,
    #[serde(default)]
    assignees: Option<Vec<UserId>>,
}

impl UpdateTaskRequest {
    /// Creates a request that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
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
        self.assignees = Some(assignees.into_iter().collect());
        self
    }

    fn into_changes(self) -> Result<TaskChanges, TaskDomainError> {
        let mut changes = TaskChanges::new();
        if let Some(title) = self.title {
            changes = changes.with_title(TaskTitle::new(title)?);
        }
        if let Some(description) = self.description {
            changes = changes.with_description(description);
        }
        if let Some(priority) = self.priority {
            changes = changes.with_priority(priority);
        }
        if let Some(responsible) = self.responsible_user_id {
            changes = changes.with_responsible_user(responsible);
        }
        if let Some(assignees) = self.assignees {
            changes = changes.with_assignees(assignees);
        }
        Ok(changes)
    }
}

/// Raw paging parameters as received from a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageQuery {
    /// Offset-based window.
    Offset {
        /// Requested page size; the configured default when absent.
        limit: Option<i64>,
        /// Items to skip.
        offset: i64,
    },
    /// 1-based page number with an optional size.
    Number {
        /// Page number, starting at one.
        page: i64,
        /// Requested page size; the configured default when absent.
        size: Option<i64>,
    },
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::Offset {
            limit: None,
            offset: 0,
        }
    }
}

impl PageQuery {
    fn resolve(self, limits: PageLimits) -> Result<PageRequest, PageError> {
        match self {
            Self::Offset { limit, offset } => PageRequest::new(limit, offset, limits),
            Self::Number { page, size } => PageRequest::from_page_number(page, size, limits),
        }
    }
}

/// Service-level errors for task operations.
///
/// Messages are safe to show to callers: `Forbidden` carries no detail and
/// persistence diagnostics stay in the logs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskLifecycleError {
    /// The bearer token is missing, invalid, expired, or names an unknown
    /// user.
    #[error("could not validate credentials")]
    Unauthorized,
    /// The caller's role does not allow the action.
    #[error("not enough permissions")]
    Forbidden,
    /// The task or a referenced user does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The request conflicts with the task's current state.
    #[error("{0}")]
    Conflict(String),
    /// The request failed validation.
    #[error("{0}")]
    InvalidArgument(String),
    /// An unexpected failure; details are logged.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TaskLifecycleError {
    fn internal(err: &impl std::error::Error) -> Self {
        error!(error = %err, "task operation failed");
        Self::Internal("storage unavailable".to_owned())
    }
}

impl From<TokenError> for TaskLifecycleError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken => Self::Unauthorized,
            TokenError::Configuration(_) | TokenError::Signing(_) => Self::internal(&err),
        }
    }
}

impl From<TaskDomainError> for TaskLifecycleError {
    fn from(err: TaskDomainError) -> Self {
        match err {
            TaskDomainError::EmptyTitle => Self::InvalidArgument(err.to_string()),
            TaskDomainError::InvalidTransition { from, to, .. } => {
                Self::Conflict(format!("cannot move task from {from} to {to}"))
            }
        }
    }
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => Self::NotFound(format!("task {id} not found")),
            TaskRepositoryError::Conflict { .. } | TaskRepositoryError::DuplicateTask(_) => {
                Self::Conflict(err.to_string())
            }
            TaskRepositoryError::Persistence(_) => Self::internal(&err),
        }
    }
}

impl From<UserRepositoryError> for TaskLifecycleError {
    fn from(err: UserRepositoryError) -> Self {
        Self::internal(&err)
    }
}

impl From<PageError> for TaskLifecycleError {
    fn from(err: PageError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task operations behind token authentication and role policy.
pub struct TaskLifecycleService<T, U, C>
where
    T: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    users: Arc<U>,
    tokens: Arc<TokenService<C>>,
    dispatcher: NotificationDispatcher,
    page_limits: PageLimits,
    clock: Arc<C>,
}

impl<T, U, C> Clone for TaskLifecycleService<T, U, C>
where
    T: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            users: Arc::clone(&self.users),
            tokens: Arc::clone(&self.tokens),
            dispatcher: self.dispatcher.clone(),
            page_limits: self.page_limits,
            clock: Arc::clone(&self.clock),
        }
    }
}

const DEFAULT_PAGE_LIMITS: PageLimits = PageLimits::new(10, 100);

impl<T, U, C> TaskLifecycleService<T, U, C>
where
    T: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service with default page limits.
    #[must_use]
    pub const fn new(
        tasks: Arc<T>,
        users: Arc<U>,
        tokens: Arc<TokenService<C>>,
        dispatcher: NotificationDispatcher,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            users,
            tokens,
            dispatcher,
            page_limits: DEFAULT_PAGE_LIMITS,
            clock,
        }
    }

    /// Replaces the page size limits used by [`Self::list_tasks`].
    #[must_use]
    pub const fn with_page_limits(mut self, page_limits: PageLimits) -> Self {
        self.page_limits = page_limits;
        self
    }

    /// Returns the dispatcher status-change events are handed to.
    #[must_use]
    pub const fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Creates a task in [`TaskStatus::Open`] owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Unauthorized`] for a bad token,
    /// [`TaskLifecycleError::Forbidden`] when the role may not create tasks,
    /// [`TaskLifecycleError::InvalidArgument`] for an empty title, and
    /// [`TaskLifecycleError::NotFound`] when a referenced user is unknown.
    pub async fn create_task(
        &self,
        token: &str,
        request: NewTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let identity = self.authenticate(token).await?;
        Self::authorize(
            &identity,
            Action::CreateTask,
            &ResourceContext::new(identity.user_id()),
        )?;

        let fields = request.into_new_task()?;
        let referenced: Vec<UserId> = fields
            .responsible_user_id()
            .into_iter()
            .chain(fields.assignees().iter().copied())
            .collect();
        self.ensure_users_exist(&referenced).await?;

        let task = Task::create(fields, identity.user_id(), &*self.clock);
        self.tasks.store(&task).await?;
        info!(task_id = %task.id(), creator = %identity.user_id(), "task created");
        Ok(task)
    }

    /// Returns one task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Unauthorized`] for a bad token,
    /// [`TaskLifecycleError::NotFound`] when the task does not exist, and
    /// [`TaskLifecycleError::Forbidden`] when the role may not read it.
    pub async fn get_task(&self, token: &str, id: TaskId) -> TaskLifecycleResult<Task> {
        let identity = self.authenticate(token).await?;
        let task = self.load_task(id).await?;
        Self::authorize(&identity, Action::ReadTask, &Self::context_for(&identity, &task))?;
        Ok(task)
    }

    /// Returns one page of tasks matching `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Unauthorized`] for a bad token,
    /// [`TaskLifecycleError::Forbidden`] when the role may not list tasks,
    /// and [`TaskLifecycleError::InvalidArgument`] for a negative offset, a
    /// non-positive limit, or a page number below one.
    pub async fn list_tasks(
        &self,
        token: &str,
        filter: TaskFilter,
        query: PageQuery,
    ) -> TaskLifecycleResult<Page<Task>> {
        let identity = self.authenticate(token).await?;
        Self::authorize(
            &identity,
            Action::ReadTaskList,
            &ResourceContext::new(identity.user_id()),
        )?;
        let request = query.resolve(self.page_limits)?;
        Ok(self.tasks.list(&filter, request).await?)
    }

    /// Edits task fields other than status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Unauthorized`] for a bad token,
    /// [`TaskLifecycleError::NotFound`] when the task or a referenced user
    /// does not exist, [`TaskLifecycleError::Forbidden`] when the role may
    /// not edit this task, and [`TaskLifecycleError::InvalidArgument`] for
    /// an empty title.
    pub async fn update_task(
        &self,
        token: &str,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let identity = self.authenticate(token).await?;
        let mut task = self.load_task(id).await?;
        Self::authorize(
            &identity,
            Action::UpdateTaskFields,
            &Self::context_for(&identity, &task),
        )?;

        let changes = request.into_changes()?;
        self.ensure_users_exist(&changes.referenced_users()).await?;
        if changes.is_empty() {
            return Ok(task);
        }

        task.apply_changes(changes, &*self.clock);
        let stored = self.tasks.update_fields(&task).await?;
        info!(task_id = %id, editor = %identity.user_id(), "task fields updated");
        Ok(stored)
    }

    /// Moves a task to `requested` and notifies its responsible user.
    ///
    /// The notification is queued after the status is stored; its delivery
    /// is neither awaited nor able to fail this call. Authorisation and the
    /// notification recipient use the task as loaded at the start of the
    /// call; a concurrent reassignment does not invalidate the change.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Unauthorized`] for a bad token,
    /// [`TaskLifecycleError::NotFound`] when the task does not exist,
    /// [`TaskLifecycleError::Forbidden`] when the role may not move this
    /// task, and [`TaskLifecycleError::Conflict`] when the edge is not
    /// allowed or another change stored a different status first.
    pub async fn change_task_status(
        &self,
        token: &str,
        id: TaskId,
        requested: TaskStatus,
    ) -> TaskLifecycleResult<Task> {
        let identity = self.authenticate(token).await?;
        let task = self.load_task(id).await?;
        Self::authorize(
            &identity,
            Action::ChangeStatus,
            &Self::context_for(&identity, &task),
        )?;

        let transition = task.transition(requested, &identity, &*self.clock)?;
        let update = StatusUpdate::from_transition(&transition);
        let (_, event) = transition.into_parts();
        let stored = self.tasks.update_status(update).await?;
        info!(
            task_id = %id,
            from = %update.expected,
            to = %update.new_status,
            changed_by = %identity.user_id(),
            "task status changed"
        );

        if let Some(status_event) = event {
            self.notify(status_event).await;
        }
        Ok(stored)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Unauthorized`] for a bad token,
    /// [`TaskLifecycleError::NotFound`] when the task does not exist, and
    /// [`TaskLifecycleError::Forbidden`] when the role may not delete it.
    pub async fn delete_task(&self, token: &str, id: TaskId) -> TaskLifecycleResult<()> {
        let identity = self.authenticate(token).await?;
        let task = self.load_task(id).await?;
        Self::authorize(&identity, Action::DeleteTask, &Self::context_for(&identity, &task))?;

        self.tasks.delete(id).await?;
        info!(task_id = %id, deleted_by = %identity.user_id(), "task deleted");
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> TaskLifecycleResult<Identity> {
        let identity = self.tokens.validate(token)?;
        if self.users.find_by_id(identity.user_id()).await?.is_none() {
            debug!(user_id = %identity.user_id(), "token names an unknown user");
            return Err(TaskLifecycleError::Unauthorized);
        }
        Ok(identity)
    }

    fn authorize(
        identity: &Identity,
        action: Action,
        context: &ResourceContext,
    ) -> TaskLifecycleResult<()> {
        let decision = authorize(identity.role(), action, context);
        if decision.is_allowed() {
            return Ok(());
        }
        debug!(
            user_id = %identity.user_id(),
            role = %identity.role(),
            action = %action,
            reason = ?decision.reason(),
            "permission denied"
        );
        Err(TaskLifecycleError::Forbidden)
    }

    fn context_for(identity: &Identity, task: &Task) -> ResourceContext {
        ResourceContext::new(identity.user_id())
            .with_responsible_user(task.responsible_user_id())
            .with_creator(task.creator_id())
    }

    async fn load_task(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| TaskLifecycleError::NotFound(format!("task {id} not found")))
    }

    /// Resolves the recipient's username and queues the notification.
    ///
    /// The status change is already stored, so a failed lookup only skips
    /// the notification.
    async fn notify(&self, event: NotificationEvent) {
        let recipient = event.recipient_user_id;
        match self.users.find_by_id(recipient).await {
            Ok(Some(user)) => {
                self.dispatcher
                    .dispatch(Notification::new(event, user.username().clone()));
            }
            Ok(None) => warn!(
                task_id = %event.task_id,
                recipient = %recipient,
                "notification skipped: recipient no longer exists"
            ),
            Err(err) => warn!(
                task_id = %event.task_id,
                recipient = %recipient,
                error = %err,
                "notification skipped: recipient lookup failed"
            ),
        }
    }

    async fn ensure_users_exist(&self, user_ids: &[UserId]) -> TaskLifecycleResult<()> {
        for &user_id in user_ids {
            if self.users.find_by_id(user_id).await?.is_none() {
                return Err(TaskLifecycleError::NotFound(format!(
                    "user {user_id} not found"
                )));
            }
        }
        Ok(())
    }
}
