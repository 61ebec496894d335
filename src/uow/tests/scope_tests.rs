//! Exactly-once accounting tests for scoped execution.

use super::harness::CountingSessionFactory;
use crate::task::adapters::memory::{InMemorySessionFactory, InMemoryTaskStore};
use crate::task::domain::{Task, TaskPriority};
use crate::task::ports::TaskGatewayError;
use crate::uow::{SessionError, SessionFactory, UnitOfWork, UnitOfWorkError, UowState};
use crate::user::domain::UserId;
use mockable::DefaultClock;
use std::sync::Arc;

fn scope_error() -> UnitOfWorkError {
    UnitOfWorkError::Session(SessionError::persistence(std::io::Error::other(
        "operation failed",
    )))
}

fn gateway_failure(err: TaskGatewayError) -> UnitOfWorkError {
    UnitOfWorkError::Session(SessionError::persistence(err))
}

fn memory_factory() -> Arc<dyn SessionFactory> {
    Arc::new(InMemorySessionFactory::new(InMemoryTaskStore::new()))
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_scope_commits_and_closes_exactly_once() {
    let factory = CountingSessionFactory::new();
    let counters = factory.counters();
    let mut uow = UnitOfWork::new(Arc::new(factory));

    let result: Result<u32, UnitOfWorkError> = uow
        .run_scoped(|_scope| Box::pin(async move { Ok(42) }))
        .await;

    assert_eq!(result.expect("scope should succeed"), 42);
    assert_eq!(counters.snapshot(), (1, 1, 0, 1));
    assert_eq!(uow.state(), UowState::Idle);
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_scope_rolls_back_and_closes_exactly_once() {
    let factory = CountingSessionFactory::new();
    let counters = factory.counters();
    let mut uow = UnitOfWork::new(Arc::new(factory));

    let result: Result<u32, UnitOfWorkError> = uow
        .run_scoped(|_scope| Box::pin(async move { Err(scope_error()) }))
        .await;

    assert!(result.is_err());
    assert_eq!(counters.snapshot(), (1, 0, 1, 1));
    assert_eq!(uow.state(), UowState::Idle);
}

#[tokio::test(flavor = "multi_thread")]
async fn scope_exposes_gateway_bound_to_the_open_transaction() {
    let mut uow = UnitOfWork::new(Arc::new(CountingSessionFactory::new()));
    let owner = UserId::new(1).expect("valid user id");

    let result: Result<u64, UnitOfWorkError> = uow
        .run_scoped(move |scope| {
            Box::pin(async move {
                let tasks = scope.tasks()?;
                tasks.count_by_user(owner).await.map_err(gateway_failure)
            })
        })
        .await;

    assert_eq!(result.expect("scope should succeed"), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_scope_discards_staged_writes() {
    let factory = memory_factory();
    let clock = DefaultClock;
    let owner = UserId::new(1).expect("valid user id");

    let mut writer = UnitOfWork::new(Arc::clone(&factory));
    let task = Task::new(
        "Doomed write",
        "Staged then rolled back",
        1,
        TaskPriority::default(),
        &clock,
    )
    .expect("valid task");

    let result: Result<(), UnitOfWorkError> = writer
        .run_scoped(move |scope| {
            Box::pin(async move {
                let tasks = scope.tasks()?;
                tasks.save(&task).await.map_err(gateway_failure)?;
                Err(scope_error())
            })
        })
        .await;
    assert!(result.is_err());

    let mut reader = UnitOfWork::new(Arc::clone(&factory));
    let count: Result<u64, UnitOfWorkError> = reader
        .run_scoped(move |scope| {
            Box::pin(async move {
                let tasks = scope.tasks()?;
                tasks.count_by_user(owner).await.map_err(gateway_failure)
            })
        })
        .await;

    assert_eq!(count.expect("read scope should succeed"), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn committed_scope_publishes_writes_to_later_sessions() {
    let factory = memory_factory();
    let clock = DefaultClock;
    let owner = UserId::new(1).expect("valid user id");

    let mut writer = UnitOfWork::new(Arc::clone(&factory));
    let task = Task::new(
        "Durable write",
        "Staged then committed",
        1,
        TaskPriority::default(),
        &clock,
    )
    .expect("valid task");
    let task_id = task.id();

    writer
        .run_scoped::<(), UnitOfWorkError, _>(move |scope| {
            Box::pin(async move {
                let tasks = scope.tasks()?;
                tasks.save(&task).await.map_err(gateway_failure)
            })
        })
        .await
        .expect("write scope should succeed");

    let mut reader = UnitOfWork::new(Arc::clone(&factory));
    let found: Result<Option<Task>, UnitOfWorkError> = reader
        .run_scoped(move |scope| {
            Box::pin(async move {
                let tasks = scope.tasks()?;
                tasks.find_by_id(task_id).await.map_err(gateway_failure)
            })
        })
        .await;

    let found_task = found
        .expect("read scope should succeed")
        .expect("committed task should be visible");
    assert_eq!(found_task.id(), task_id);
    assert_eq!(found_task.user_id(), owner);
}

#[tokio::test(flavor = "multi_thread")]
async fn gateway_handle_is_invalidated_after_the_scope_closes() {
    let factory = memory_factory();
    let mut uow = UnitOfWork::new(Arc::clone(&factory));
    let owner = UserId::new(1).expect("valid user id");

    let leaked: Result<Arc<dyn crate::task::ports::TaskGateway>, UnitOfWorkError> = uow
        .run_scoped(|scope| Box::pin(async move { scope.tasks() }))
        .await;
    let gateway = leaked.expect("scope should succeed");

    let result = gateway.count_by_user(owner).await;
    assert!(matches!(result, Err(TaskGatewayError::Persistence(_))));
}
