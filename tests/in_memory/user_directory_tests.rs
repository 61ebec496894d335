//! User directory tests over the seeded fake gateway.

use super::helpers::{seeded_users, user_id};
use faena::user::adapters::memory::InMemoryUserGateway;
use faena::user::services::{UserDirectoryError, UserDirectoryService};
use std::sync::Arc;

fn directory() -> UserDirectoryService<InMemoryUserGateway> {
    UserDirectoryService::new(Arc::new(seeded_users()))
}

#[tokio::test(flavor = "multi_thread")]
async fn get_user_returns_seeded_entry() {
    let user = directory()
        .get_user(user_id(1))
        .await
        .expect("lookup should succeed");

    assert_eq!(user.id(), user_id(1));
    assert_eq!(user.name().as_str(), "Juan Pérez");
    assert!(user.is_active());
}

#[tokio::test(flavor = "multi_thread")]
async fn get_unknown_user_fails() {
    let result = directory().get_user(user_id(404)).await;

    assert!(matches!(
        result,
        Err(UserDirectoryError::NotFound(missing)) if missing == user_id(404)
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_users_returns_every_seeded_entry() {
    let users = directory()
        .list_users()
        .await
        .expect("listing should succeed");

    assert_eq!(users.len(), 3);
    assert_eq!(users.iter().filter(|user| user.is_active()).count(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn seed_loading_is_explicit_per_instance() {
    let empty = InMemoryUserGateway::default();
    let seeded = seeded_users();

    assert!(empty.is_empty());
    assert_eq!(seeded.len(), 3);
}
