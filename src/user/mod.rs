//! User lookup for Faena.
//!
//! Task use cases consume users as a read-only capability: does this user
//! exist, and is it active. The module keeps the hexagonal split used by
//! [`crate::task`]:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
