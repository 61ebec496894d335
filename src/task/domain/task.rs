//! Task aggregate root and lifecycle transitions.

use super::{TaskDescription, TaskDomainError, TaskId, TaskPriority, TaskStatus, TaskTitle};
use crate::user::domain::UserId;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Default number of days after which an open task counts as overdue.
pub const DEFAULT_OVERDUE_THRESHOLD_DAYS: i64 = 365;

/// Task aggregate root.
///
/// All mutation goes through named transition methods that re-validate
/// before assigning, so an invalid or half-mutated task is never observable
/// by calling code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: TaskDescription,
    user_id: UserId,
    status: TaskStatus,
    priority: TaskPriority,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: TaskDescription,
    /// Persisted owning user.
    pub user_id: UserId,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted completion timestamp, set only for completed tasks.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new pending task after validating every field.
    ///
    /// No partial entity exists on failure. The new task starts in
    /// [`TaskStatus::Pending`] with `updated_at == created_at` and no
    /// completion timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the title or description violates
    /// its length bounds or `user_id` is not positive.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        user_id: i64,
        priority: TaskPriority,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let validated_title = TaskTitle::new(title)?;
        let validated_description = TaskDescription::new(description)?;
        let owner =
            UserId::new(user_id).map_err(|_| TaskDomainError::InvalidUserId(user_id))?;
        let timestamp = clock.utc();

        Ok(Self {
            id: TaskId::new(),
            title: validated_title,
            description: validated_description,
            user_id: owner,
            status: TaskStatus::Pending,
            priority,
            created_at: timestamp,
            updated_at: timestamp,
            completed_at: None,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            user_id: data.user_id,
            status: data.status,
            priority: data.priority,
            created_at: data.created_at,
            updated_at: data.updated_at,
            completed_at: data.completed_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the owning user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the completion timestamp, if the task completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns whether the task is still open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Returns whether the task completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, TaskStatus::Completed)
    }

    /// Starts work on a pending task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyTerminal`] when the task is
    /// completed or cancelled, and [`TaskDomainError::InvalidTransition`]
    /// when the task is already in progress.
    pub fn start(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_not_terminal("start")?;
        if self.status != TaskStatus::Pending {
            return Err(TaskDomainError::InvalidTransition {
                task_id: self.id,
                from: self.status,
                to: TaskStatus::InProgress,
            });
        }
        self.status = TaskStatus::InProgress;
        self.touch(clock);
        Ok(())
    }

    /// Completes the task, recording the completion instant.
    ///
    /// Completion is not idempotent: a second call fails and preserves the
    /// timestamp recorded by the first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyCompleted`] when the task already
    /// completed and [`TaskDomainError::InvalidTransition`] when it was
    /// cancelled.
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        match self.status {
            TaskStatus::Completed => Err(TaskDomainError::AlreadyCompleted {
                task_id: self.id,
                operation: "complete",
            }),
            TaskStatus::Cancelled => Err(TaskDomainError::InvalidTransition {
                task_id: self.id,
                from: TaskStatus::Cancelled,
                to: TaskStatus::Completed,
            }),
            TaskStatus::Pending | TaskStatus::InProgress => {
                let timestamp = clock.utc();
                self.status = TaskStatus::Completed;
                self.completed_at = Some(timestamp);
                self.updated_at = timestamp;
                Ok(())
            }
        }
    }

    /// Cancels the task. The completion timestamp remains unset.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyTerminal`] when the task already
    /// completed or cancelled.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_not_terminal("cancel")?;
        self.status = TaskStatus::Cancelled;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the title after re-validating it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyTerminal`] on terminal tasks and
    /// the title validation errors otherwise; the stored title is untouched
    /// on failure.
    pub fn update_title(
        &mut self,
        title: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_not_terminal("update title")?;
        self.title = TaskTitle::new(title)?;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the description after re-validating it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyTerminal`] on terminal tasks and
    /// the description validation errors otherwise; the stored description
    /// is untouched on failure.
    pub fn update_description(
        &mut self,
        description: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_not_terminal("update description")?;
        self.description = TaskDescription::new(description)?;
        self.touch(clock);
        Ok(())
    }

    /// Changes the priority of a non-terminal task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyTerminal`] on terminal tasks.
    pub fn change_priority(
        &mut self,
        priority: TaskPriority,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_not_terminal("change priority")?;
        self.priority = priority;
        self.touch(clock);
        Ok(())
    }

    /// Returns whether the task has been open longer than `threshold_days`.
    ///
    /// Terminal tasks are never overdue.
    #[must_use]
    pub fn is_overdue(&self, threshold_days: i64, clock: &impl Clock) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        clock.utc() - self.created_at > Duration::days(threshold_days)
    }

    /// Returns the task age in whole days since creation.
    #[must_use]
    pub fn age_in_days(&self, clock: &impl Clock) -> i64 {
        (clock.utc() - self.created_at).num_days()
    }

    fn ensure_not_terminal(&self, operation: &'static str) -> Result<(), TaskDomainError> {
        if self.status.is_terminal() {
            return Err(TaskDomainError::AlreadyTerminal {
                task_id: self.id,
                status: self.status,
                operation,
            });
        }
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
