//! Shared helpers for in-memory integration tests.

use faena::task::adapters::memory::{InMemorySessionFactory, InMemoryTaskStore};
use faena::task::services::{TaskPolicy, TaskService};
use faena::user::adapters::memory::InMemoryUserGateway;
use faena::user::domain::{EmailAddress, User, UserId, UserName, UserStatus};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Service type under test, wired with in-memory adapters.
pub type FlowService = TaskService<InMemoryUserGateway, DefaultClock>;

/// Builds a validated user for seeding the fake gateway.
pub fn sample_user(id: i64, name: &str, status: UserStatus) -> User {
    User::new(
        UserId::new(id).expect("valid user id"),
        UserName::new(name).expect("valid name"),
        EmailAddress::new(format!("user{id}@company.com")).expect("valid email"),
        status,
    )
}

/// Returns a validated user identifier.
pub fn user_id(id: i64) -> UserId {
    UserId::new(id).expect("valid user id")
}

/// Builds the default seeded user gateway: two active users, one inactive.
pub fn seeded_users() -> InMemoryUserGateway {
    InMemoryUserGateway::new([
        sample_user(1, "Juan Pérez", UserStatus::Active),
        sample_user(2, "María García", UserStatus::Active),
        sample_user(3, "Ana Martínez", UserStatus::Inactive),
    ])
}

/// Builds a service over a fresh store with the given task policy.
pub fn service_with_policy(policy: TaskPolicy) -> FlowService {
    TaskService::new(
        Arc::new(InMemorySessionFactory::new(InMemoryTaskStore::new())),
        Arc::new(seeded_users()),
        Arc::new(DefaultClock),
    )
    .with_policy(policy)
}

/// Provides a service with the default policy for each test.
#[fixture]
pub fn service() -> FlowService {
    service_with_policy(TaskPolicy::default())
}
