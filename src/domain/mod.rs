//! Domain layer - core business logic and entities

pub mod execution;
pub mod price;
pub mod protocol;
pub mod registry;
pub mod routing;
pub mod swap;
