//! `PostgreSQL` gateway implementation bound to one session connection.

use super::blocking_helpers::{ConnectionSlot, run_blocking_with, with_connection};
use super::models::{TaskChangeset, TaskRow};
use super::schema::tasks;
use super::session::classify_storage_error;
use crate::task::domain::{
    PersistedTaskData, Task, TaskDescription, TaskId, TaskPriority, TaskStatus, TaskTitle,
};
use crate::task::ports::{TaskGateway, TaskGatewayError, TaskGatewayResult};
use crate::user::domain::UserId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::sync::Arc;

/// `PostgreSQL`-backed task gateway.
///
/// Every operation runs on the single connection owned by the session that
/// produced this gateway, so writes stay inside that session's open
/// transaction. Closing the session empties the shared connection slot and
/// fails further use of the handle.
pub struct PostgresTaskGateway {
    connection: ConnectionSlot,
}

impl std::fmt::Debug for PostgresTaskGateway {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("PostgresTaskGateway").finish_non_exhaustive()
    }
}

impl PostgresTaskGateway {
    pub(super) fn new(connection: ConnectionSlot) -> Self {
        Self { connection }
    }

    async fn run<F, T>(&self, f: F) -> TaskGatewayResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskGatewayResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let slot = Arc::clone(&self.connection);
        run_blocking_with(
            move || with_connection(&slot, |err| TaskGatewayError::persistence(err), f),
            TaskGatewayError::persistence,
        )
        .await
    }
}

#[async_trait]
impl TaskGateway for PostgresTaskGateway {
    async fn save(&self, task: &Task) -> TaskGatewayResult<()> {
        let row = to_changeset(task);
        self.run(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .on_conflict(tasks::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map(|_| ())
                .map_err(storage_error)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskGatewayResult<Option<Task>> {
        let task_uuid = id.into_inner();
        self.run(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(task_uuid))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(storage_error)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_user(&self, user_id: UserId) -> TaskGatewayResult<Vec<Task>> {
        let owner = user_id.into_inner();
        self.run(move |connection| {
            let rows = tasks::table
                .filter(tasks::user_id.eq(owner))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(storage_error)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn count_by_user(&self, user_id: UserId) -> TaskGatewayResult<u64> {
        let owner = user_id.into_inner();
        self.run(move |connection| {
            let count: i64 = tasks::table
                .filter(tasks::user_id.eq(owner))
                .count()
                .get_result(connection)
                .map_err(storage_error)?;
            u64::try_from(count).map_err(TaskGatewayError::persistence)
        })
        .await
    }
}

/// Maps a Diesel error, preserving its transient classification.
fn storage_error(err: DieselError) -> TaskGatewayError {
    match classify_storage_error(&err) {
        Some(kind) => TaskGatewayError::transient(kind, err),
        None => TaskGatewayError::persistence(err),
    }
}

fn to_changeset(task: &Task) -> TaskChangeset {
    TaskChangeset {
        id: task.id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().as_str().to_owned(),
        user_id: task.user_id().into_inner(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        completed_at: task.completed_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskGatewayResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        user_id,
        status,
        priority,
        created_at,
        updated_at,
        completed_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        title: TaskTitle::new(title).map_err(TaskGatewayError::persistence)?,
        description: TaskDescription::new(description).map_err(TaskGatewayError::persistence)?,
        user_id: UserId::new(user_id).map_err(TaskGatewayError::persistence)?,
        status: TaskStatus::try_from(status.as_str()).map_err(TaskGatewayError::persistence)?,
        priority: TaskPriority::try_from(priority.as_str())
            .map_err(TaskGatewayError::persistence)?,
        created_at,
        updated_at,
        completed_at,
    };
    Ok(Task::from_persisted(data))
}
