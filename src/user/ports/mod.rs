//! Port contracts for user lookup.

pub mod gateway;

pub use gateway::{UserGateway, UserGatewayError, UserGatewayResult};
