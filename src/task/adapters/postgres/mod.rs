//! `PostgreSQL` adapters for task persistence.

mod blocking_helpers;
mod gateway;
mod models;
mod schema;
mod session;

pub use blocking_helpers::TaskPgPool;
pub use gateway::PostgresTaskGateway;
pub use session::{PostgresSessionFactory, PostgresTaskSession};
