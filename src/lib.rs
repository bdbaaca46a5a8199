//! Swap Engine - multi-hop conversion settlement
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use domain::execution::{AssetTransfer, HopFill, NativeSettlement};
pub use domain::price::{PriceOracle, PricePoint};
pub use domain::protocol::ProtocolConfig;
pub use domain::swap::{SwapCompleted, SwapEngine, SwapQuote, SwapReceipt};
pub use shared::errors::SwapError;
