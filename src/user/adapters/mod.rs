//! Adapter implementations for user lookup.

pub mod memory;

pub use memory::{InMemoryUserGateway, UserSeedError};
