//! End-to-end task flow tests over the in-memory stack.

use super::helpers::{FlowService, service, service_with_policy, user_id};
use faena::task::domain::{Task, TaskDomainError, TaskPriority, TaskStatus};
use faena::task::services::{CreateTaskRequest, TaskPolicy, TaskServiceError, UpdateTaskRequest};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_and_complete_full_flow(service: FlowService) {
    let created = service
        .create_task(CreateTaskRequest::new(
            "Review Q1",
            "Quarterly review of the revenue figures",
            1,
        ))
        .await
        .expect("task creation should succeed");

    assert_eq!(created.status(), TaskStatus::Pending);
    assert!(created.completed_at().is_none());
    assert_eq!(created.created_at(), created.updated_at());

    let completed = service
        .complete_task(created.id())
        .await
        .expect("task completion should succeed");

    assert_eq!(completed.id(), created.id());
    assert_eq!(completed.status(), TaskStatus::Completed);
    assert!(completed.completed_at().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_for_missing_user_persists_nothing(service: FlowService) {
    let result = service
        .create_task(CreateTaskRequest::new("Orphan", "No owner exists", 404))
        .await;

    assert!(matches!(result, Err(TaskServiceError::UserNotFound(_))));

    for existing in [1, 2] {
        let listed = service
            .list_tasks_by_user(user_id(existing))
            .await
            .expect("listing should succeed");
        assert!(listed.is_empty());
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_at_cap_is_rejected() {
    let service = service_with_policy(TaskPolicy {
        max_tasks_per_user: 3,
    });

    for index in 0..3 {
        service
            .create_task(CreateTaskRequest::new(
                format!("Quota filler {index}"),
                "Occupy one slot",
                1,
            ))
            .await
            .expect("creation below the cap should succeed");
    }

    let result = service
        .create_task(CreateTaskRequest::new("Overflow", "Beyond the cap", 1))
        .await;

    assert!(matches!(
        result,
        Err(TaskServiceError::MaxTasksExceeded {
            current: 3,
            limit: 3,
            ..
        })
    ));

    // The cap applies per user; another owner still has room.
    service
        .create_task(CreateTaskRequest::new("Elsewhere", "Different owner", 2))
        .await
        .expect("other users should be unaffected");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_a_cancelled_task_leaves_it_cancelled(service: FlowService) {
    let created = service
        .create_task(CreateTaskRequest::new("Short lived", "Cancel me", 1))
        .await
        .expect("task creation should succeed");
    service
        .cancel_task(created.id())
        .await
        .expect("cancellation should succeed");

    let result = service.complete_task(created.id()).await;
    assert!(matches!(
        result,
        Err(TaskServiceError::Domain(
            TaskDomainError::InvalidTransition { .. }
        ))
    ));

    let listed = service
        .list_tasks_by_user(user_id(1))
        .await
        .expect("listing should succeed");
    assert_eq!(listed.len(), 1);
    assert_eq!(
        listed.first().map(Task::status),
        Some(TaskStatus::Cancelled)
    );
    assert_eq!(listed.first().and_then(Task::completed_at), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lifecycle_with_updates_survives_reloads(service: FlowService) {
    let created = service
        .create_task(
            CreateTaskRequest::new("Initial", "Walk the whole lifecycle", 2)
                .with_priority(TaskPriority::Low),
        )
        .await
        .expect("task creation should succeed");

    service
        .start_task(created.id())
        .await
        .expect("start should succeed");
    let updated = service
        .update_task(
            created.id(),
            UpdateTaskRequest::new()
                .with_title("Renamed mid-flight")
                .with_priority(TaskPriority::Urgent),
        )
        .await
        .expect("update should succeed");
    assert_eq!(updated.status(), TaskStatus::InProgress);

    let listed = service
        .list_tasks_by_user(user_id(2))
        .await
        .expect("listing should succeed");
    let reloaded = listed.first().expect("task should be listed");
    assert_eq!(reloaded.title().as_str(), "Renamed mid-flight");
    assert_eq!(reloaded.priority(), TaskPriority::Urgent);
    assert_eq!(reloaded.description().as_str(), "Walk the whole lifecycle");

    service
        .complete_task(created.id())
        .await
        .expect("completion should succeed");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tasks_are_isolated_per_owner(service: FlowService) {
    service
        .create_task(CreateTaskRequest::new("Mine", "Owned by user one", 1))
        .await
        .expect("task creation should succeed");
    service
        .create_task(CreateTaskRequest::new("Yours", "Owned by user two", 2))
        .await
        .expect("task creation should succeed");

    let first_owner = service
        .list_tasks_by_user(user_id(1))
        .await
        .expect("listing should succeed");
    let second_owner = service
        .list_tasks_by_user(user_id(2))
        .await
        .expect("listing should succeed");

    assert_eq!(first_owner.len(), 1);
    assert_eq!(second_owner.len(), 1);
    assert_eq!(
        first_owner.first().map(|task| task.title().as_str()),
        Some("Mine")
    );
    assert_eq!(
        second_owner.first().map(|task| task.title().as_str()),
        Some("Yours")
    );
}
