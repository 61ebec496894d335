//! Domain-focused tests for task creation and validation.

use crate::task::domain::{
    DEFAULT_OVERDUE_THRESHOLD_DAYS, PersistedTaskData, Task, TaskDescription, TaskDomainError,
    TaskId, TaskPriority, TaskStatus, TaskTitle,
};
use crate::user::domain::UserId;
use chrono::Duration;
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn persisted_pending_task(created_days_ago: i64, clock: &DefaultClock) -> Task {
    let created_at = clock.utc() - Duration::days(created_days_ago);
    Task::from_persisted(PersistedTaskData {
        id: TaskId::new(),
        title: TaskTitle::new("Quarterly close").expect("valid title"),
        description: TaskDescription::new("Reconcile ledger accounts").expect("valid description"),
        user_id: UserId::new(1).expect("valid user id"),
        status: TaskStatus::Pending,
        priority: TaskPriority::Medium,
        created_at,
        updated_at: created_at,
        completed_at: None,
    })
}

#[rstest]
fn new_task_starts_pending_with_aligned_timestamps(clock: DefaultClock) {
    let task = Task::new(
        "Review Q1 report",
        "Check the revenue figures against the ledger",
        1,
        TaskPriority::default(),
        &clock,
    )
    .expect("valid task");

    assert_eq!(task.status(), TaskStatus::Pending);
    assert_eq!(task.priority(), TaskPriority::Medium);
    assert_eq!(task.created_at(), task.updated_at());
    assert!(task.completed_at().is_none());
    assert!(task.is_active());
    assert!(!task.is_completed());
}

#[rstest]
fn new_task_trims_title_and_description(clock: DefaultClock) {
    let task = Task::new(
        "  Review Q1  ",
        "  check figures  ",
        1,
        TaskPriority::High,
        &clock,
    )
    .expect("valid task");

    assert_eq!(task.title().as_str(), "Review Q1");
    assert_eq!(task.description().as_str(), "check figures");
    assert_eq!(task.priority(), TaskPriority::High);
}

#[rstest]
fn new_task_rejects_blank_title(clock: DefaultClock) {
    let result = Task::new("   ", "description", 1, TaskPriority::default(), &clock);
    assert_eq!(result, Err(TaskDomainError::EmptyTitle));
}

#[rstest]
fn new_task_rejects_overlong_title(clock: DefaultClock) {
    let result = Task::new(
        "x".repeat(201),
        "description",
        1,
        TaskPriority::default(),
        &clock,
    );
    assert_eq!(
        result,
        Err(TaskDomainError::TitleTooLong {
            length: 201,
            max: 200
        })
    );
}

#[rstest]
fn new_task_rejects_blank_description(clock: DefaultClock) {
    let result = Task::new("title", "\t\n ", 1, TaskPriority::default(), &clock);
    assert_eq!(result, Err(TaskDomainError::EmptyDescription));
}

#[rstest]
fn new_task_rejects_overlong_description(clock: DefaultClock) {
    let result = Task::new(
        "title",
        "d".repeat(1001),
        1,
        TaskPriority::default(),
        &clock,
    );
    assert_eq!(
        result,
        Err(TaskDomainError::DescriptionTooLong {
            length: 1001,
            max: 1000
        })
    );
}

#[rstest]
#[case(0)]
#[case(-5)]
fn new_task_rejects_non_positive_user_id(#[case] user_id: i64, clock: DefaultClock) {
    let result = Task::new(
        "title",
        "description",
        user_id,
        TaskPriority::default(),
        &clock,
    );
    assert_eq!(result, Err(TaskDomainError::InvalidUserId(user_id)));
}

#[rstest]
fn open_task_past_threshold_is_overdue(clock: DefaultClock) {
    let task = persisted_pending_task(400, &clock);

    assert!(task.is_overdue(DEFAULT_OVERDUE_THRESHOLD_DAYS, &clock));
    assert!(!task.is_overdue(500, &clock));
    assert!(task.age_in_days(&clock) >= 400);
}

#[rstest]
fn terminal_task_is_never_overdue(clock: DefaultClock) {
    let mut task = persisted_pending_task(400, &clock);
    task.cancel(&clock).expect("cancel should succeed");

    assert!(!task.is_overdue(DEFAULT_OVERDUE_THRESHOLD_DAYS, &clock));
}

#[rstest]
fn from_persisted_round_trips_all_fields(clock: DefaultClock) {
    let original = Task::new(
        "Archive invoices",
        "Move processed invoices to cold storage",
        9,
        TaskPriority::Low,
        &clock,
    )
    .expect("valid task");

    let data = PersistedTaskData {
        id: original.id(),
        title: original.title().clone(),
        description: original.description().clone(),
        user_id: original.user_id(),
        status: original.status(),
        priority: original.priority(),
        created_at: original.created_at(),
        updated_at: original.updated_at(),
        completed_at: original.completed_at(),
    };

    assert_eq!(Task::from_persisted(data), original);
}
