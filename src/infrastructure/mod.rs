//! Infrastructure layer - collaborator implementations

pub mod memory;

pub use memory::{MemoryLedger, MemoryPriceFeed};
