//! Service layer for task creation, lifecycle transitions, and listing.
//!
//! Each operation runs inside its own unit-of-work scope: precondition
//! checks, entity mutation, and persistence either all commit or all roll
//! back. Users are consumed read-only through the user gateway.

use crate::task::domain::{Task, TaskDomainError, TaskId, TaskPriority};
use crate::task::ports::TaskGatewayError;
use crate::uow::{RetryPolicy, SessionFactory, Transient, UnitOfWork, UnitOfWorkError};
use crate::user::domain::{User, UserId, UserStatus};
use crate::user::ports::{UserGateway, UserGatewayError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Business limits applied when creating tasks.
///
/// The per-user cap lives here and nowhere else; pass a customised policy
/// to [`TaskService::with_policy`] instead of redefining the constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPolicy {
    /// Maximum number of tasks one user may own.
    pub max_tasks_per_user: u64,
}

impl TaskPolicy {
    /// Default per-user task cap.
    pub const DEFAULT_MAX_TASKS_PER_USER: u64 = 1000;
}

impl Default for TaskPolicy {
    fn default() -> Self {
        Self {
            max_tasks_per_user: Self::DEFAULT_MAX_TASKS_PER_USER,
        }
    }
}

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: String,
    user_id: i64,
    priority: TaskPriority,
}

impl CreateTaskRequest {
    /// Creates a request with the default (medium) priority.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>, user_id: i64) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            user_id,
            priority: TaskPriority::default(),
        }
    }

    /// Sets the task priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Request payload for updating task fields.
///
/// Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    priority: Option<TaskPriority>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a new priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Domain validation or state-machine rule failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The requested user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The user exists but may not own tasks right now.
    #[error("user {user_id} is not active (status: {status})")]
    UserNotActive {
        /// The inactive user.
        user_id: UserId,
        /// The status blocking the operation.
        status: UserStatus,
    },

    /// The requested task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The user reached the per-user task cap.
    #[error("user {user_id} has {current} tasks, limit is {limit}")]
    MaxTasksExceeded {
        /// The user at the cap.
        user_id: UserId,
        /// Task count observed inside the transaction.
        current: u64,
        /// Configured cap.
        limit: u64,
    },

    /// User gateway operation failed.
    #[error(transparent)]
    Users(#[from] UserGatewayError),

    /// Task gateway operation failed.
    #[error(transparent)]
    Gateway(#[from] TaskGatewayError),

    /// Transaction boundary failed.
    #[error(transparent)]
    UnitOfWork(#[from] UnitOfWorkError),
}

impl Transient for TaskServiceError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Gateway(err) => err.is_transient(),
            Self::UnitOfWork(err) => err.is_transient(),
            Self::Domain(_)
            | Self::UserNotFound(_)
            | Self::UserNotActive { .. }
            | Self::TaskNotFound(_)
            | Self::MaxTasksExceeded { .. }
            | Self::Users(_) => false,
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task lifecycle orchestration service.
pub struct TaskService<U, C>
where
    U: UserGateway + 'static,
    C: Clock + Send + Sync + 'static,
{
    sessions: Arc<dyn SessionFactory>,
    users: Arc<U>,
    clock: Arc<C>,
    policy: TaskPolicy,
    retry: RetryPolicy,
}

impl<U, C> TaskService<U, C>
where
    U: UserGateway + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a task service with default policy and retry settings.
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionFactory>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            sessions,
            users,
            clock,
            policy: TaskPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the task policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: TaskPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the retry policy used by unit-of-work scopes.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(Arc::clone(&self.sessions)).with_retry_policy(self.retry)
    }

    /// Creates a task for an existing, active user.
    ///
    /// Inside one transaction scope the per-user task count is checked
    /// against the policy cap, the entity is constructed with full
    /// validation, and the result is persisted; commit happens on scope
    /// exit, so a failure at any step leaves nothing behind.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::UserNotFound`] or
    /// [`TaskServiceError::UserNotActive`] when the owner check fails,
    /// [`TaskServiceError::MaxTasksExceeded`] at the cap, and
    /// [`TaskServiceError::Domain`] when field validation fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskServiceResult<Task> {
        let user = self.resolve_active_user(request.user_id).await?;
        let user_id = user.id();

        let mut uow = self.unit_of_work();
        let clock = Arc::clone(&self.clock);
        let policy = self.policy;
        let created = uow
            .run_scoped(move |scope| {
                Box::pin(async move {
                    let tasks = scope.tasks()?;
                    let current = tasks.count_by_user(user_id).await?;
                    if current >= policy.max_tasks_per_user {
                        warn!(
                            user_id = %user_id,
                            current,
                            limit = policy.max_tasks_per_user,
                            "task creation rejected: per-user cap reached",
                        );
                        return Err(TaskServiceError::MaxTasksExceeded {
                            user_id,
                            current,
                            limit: policy.max_tasks_per_user,
                        });
                    }

                    let task = Task::new(
                        request.title,
                        request.description,
                        request.user_id,
                        request.priority,
                        &*clock,
                    )?;
                    tasks.save(&task).await?;
                    Ok(task)
                })
            })
            .await?;

        info!(task_id = %created.id(), user_id = %user_id, "task created");
        Ok(created)
    }

    /// Completes the task with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when no such task exists
    /// and [`TaskServiceError::Domain`] when the task is already completed
    /// or cancelled.
    pub async fn complete_task(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        let completed = self
            .apply_transition(task_id, |task, clock| task.complete(clock))
            .await?;
        info!(task_id = %task_id, user_id = %completed.user_id(), "task completed");
        Ok(completed)
    }

    /// Starts work on the task with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when no such task exists
    /// and [`TaskServiceError::Domain`] when the task is not pending.
    pub async fn start_task(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        let started = self
            .apply_transition(task_id, |task, clock| task.start(clock))
            .await?;
        info!(task_id = %task_id, user_id = %started.user_id(), "task started");
        Ok(started)
    }

    /// Cancels the task with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when no such task exists
    /// and [`TaskServiceError::Domain`] when the task is already terminal.
    pub async fn cancel_task(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        let cancelled = self
            .apply_transition(task_id, |task, clock| task.cancel(clock))
            .await?;
        info!(task_id = %task_id, user_id = %cancelled.user_id(), "task cancelled");
        Ok(cancelled)
    }

    /// Applies a partial update to a non-terminal task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when no such task exists
    /// and [`TaskServiceError::Domain`] when the task is terminal or a new
    /// field value fails validation.
    pub async fn update_task(
        &self,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let updated = self
            .apply_transition(task_id, move |task, clock| {
                if let Some(title) = request.title {
                    task.update_title(title, clock)?;
                }
                if let Some(description) = request.description {
                    task.update_description(description, clock)?;
                }
                if let Some(priority) = request.priority {
                    task.change_priority(priority, clock)?;
                }
                Ok(())
            })
            .await?;
        info!(task_id = %task_id, "task updated");
        Ok(updated)
    }

    /// Lists all tasks owned by an existing user, in unspecified order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::UserNotFound`] when the user does not
    /// exist.
    pub async fn list_tasks_by_user(&self, user_id: UserId) -> TaskServiceResult<Vec<Task>> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(TaskServiceError::UserNotFound(user_id))?;

        let mut uow = self.unit_of_work();
        let listed: Vec<Task> = uow
            .run_scoped(move |scope| {
                Box::pin(async move {
                    let tasks = scope.tasks()?;
                    Ok::<_, TaskServiceError>(tasks.find_by_user(user_id).await?)
                })
            })
            .await?;
        debug!(user_id = %user_id, count = listed.len(), "listed tasks");
        Ok(listed)
    }

    /// Loads a task, applies a mutation, and persists it in one scope.
    async fn apply_transition<F>(&self, task_id: TaskId, apply: F) -> TaskServiceResult<Task>
    where
        F: FnOnce(&mut Task, &C) -> Result<(), TaskDomainError> + Send + 'static,
    {
        let mut uow = self.unit_of_work();
        let clock = Arc::clone(&self.clock);
        uow.run_scoped(move |scope| {
            Box::pin(async move {
                let tasks = scope.tasks()?;
                let mut task = tasks
                    .find_by_id(task_id)
                    .await?
                    .ok_or(TaskServiceError::TaskNotFound(task_id))?;
                apply(&mut task, &*clock)?;
                tasks.save(&task).await?;
                Ok(task)
            })
        })
        .await
    }

    async fn resolve_active_user(&self, raw_user_id: i64) -> TaskServiceResult<User> {
        let user_id = UserId::new(raw_user_id)
            .map_err(|_| TaskDomainError::InvalidUserId(raw_user_id))?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(TaskServiceError::UserNotFound(user_id))?;
        if !user.is_active() {
            warn!(user_id = %user_id, status = %user.status(), "task operation rejected: user not active");
            return Err(TaskServiceError::UserNotActive {
                user_id,
                status: user.status(),
            });
        }
        Ok(user)
    }
}
