//! In-memory task store with staged transactional writes.

use crate::task::domain::{Task, TaskId};
use crate::task::ports::{TaskGateway, TaskGatewayError, TaskGatewayResult};
use crate::user::domain::UserId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

type TaskMap = HashMap<TaskId, Task>;

/// Converts a poisoned-lock failure into an opaque I/O error.
fn lock_poisoned(err: impl fmt::Display) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

/// Committed task state shared by every session opened against one store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    committed: Arc<RwLock<TaskMap>>,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn shared(&self) -> Arc<RwLock<TaskMap>> {
        Arc::clone(&self.committed)
    }
}

/// Session-bound gateway reading through a staged-write overlay.
///
/// Writes land in the overlay until the owning session commits; reads see
/// the overlay on top of committed state. A closed session invalidates the
/// gateway, failing every operation.
#[derive(Debug)]
pub struct InMemoryTaskGateway {
    base: Arc<RwLock<TaskMap>>,
    staged: RwLock<TaskMap>,
    open: AtomicBool,
}

impl InMemoryTaskGateway {
    pub(super) fn new(base: Arc<RwLock<TaskMap>>) -> Self {
        Self {
            base,
            staged: RwLock::new(TaskMap::new()),
            open: AtomicBool::new(false),
        }
    }

    pub(super) fn mark_open(&self) -> Result<(), std::io::Error> {
        let mut staged = self.staged.write().map_err(lock_poisoned)?;
        staged.clear();
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub(super) fn apply_staged(&self) -> Result<(), std::io::Error> {
        let mut staged = self.staged.write().map_err(lock_poisoned)?;
        let mut base = self.base.write().map_err(lock_poisoned)?;
        for (id, task) in staged.drain() {
            base.insert(id, task);
        }
        Ok(())
    }

    pub(super) fn discard_staged(&self) -> Result<(), std::io::Error> {
        let mut staged = self.staged.write().map_err(lock_poisoned)?;
        staged.clear();
        Ok(())
    }

    pub(super) fn mark_closed(&self) -> Result<(), std::io::Error> {
        self.open.store(false, Ordering::SeqCst);
        self.discard_staged()
    }

    fn ensure_open(&self) -> TaskGatewayResult<()> {
        if self.open.load(Ordering::SeqCst) {
            return Ok(());
        }
        Err(TaskGatewayError::persistence(std::io::Error::other(
            "session is closed",
        )))
    }

    fn merged_for_user(&self, user_id: UserId) -> TaskGatewayResult<TaskMap> {
        let base = self.base.read().map_err(|err| {
            TaskGatewayError::persistence(lock_poisoned(err))
        })?;
        let staged = self.staged.read().map_err(|err| {
            TaskGatewayError::persistence(lock_poisoned(err))
        })?;

        let mut merged: TaskMap = base
            .iter()
            .filter(|(_, task)| task.user_id() == user_id)
            .map(|(id, task)| (*id, task.clone()))
            .collect();
        for (id, task) in staged.iter() {
            if task.user_id() == user_id {
                merged.insert(*id, task.clone());
            }
        }
        Ok(merged)
    }
}

#[async_trait]
impl TaskGateway for InMemoryTaskGateway {
    async fn save(&self, task: &Task) -> TaskGatewayResult<()> {
        self.ensure_open()?;
        let mut staged = self.staged.write().map_err(|err| {
            TaskGatewayError::persistence(lock_poisoned(err))
        })?;
        staged.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskGatewayResult<Option<Task>> {
        self.ensure_open()?;
        let staged = self.staged.read().map_err(|err| {
            TaskGatewayError::persistence(lock_poisoned(err))
        })?;
        if let Some(task) = staged.get(&id) {
            return Ok(Some(task.clone()));
        }
        let base = self.base.read().map_err(|err| {
            TaskGatewayError::persistence(lock_poisoned(err))
        })?;
        Ok(base.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> TaskGatewayResult<Vec<Task>> {
        self.ensure_open()?;
        Ok(self.merged_for_user(user_id)?.into_values().collect())
    }

    async fn count_by_user(&self, user_id: UserId) -> TaskGatewayResult<u64> {
        self.ensure_open()?;
        let merged = self.merged_for_user(user_id)?;
        u64::try_from(merged.len()).map_err(TaskGatewayError::persistence)
    }
}
