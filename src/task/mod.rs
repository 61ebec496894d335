//! Task lifecycle management for Faena.
//!
//! This module implements the task bounded context: creating tasks owned by
//! users, moving them through their lifecycle (pending, in-progress,
//! completed, cancelled) with validated state transitions, and listing them
//! per owner. Writes go through the unit-of-work boundary in [`crate::uow`]
//! so every use case commits or rolls back atomically. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
