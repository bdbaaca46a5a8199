//! Price feed interface

use async_trait::async_trait;

use super::PricePoint;
use crate::shared::types::{AssetPair, Principal};

/// Price source consulted once per hop.
///
/// `oracle` is the identity the engine is currently configured with, so
/// repointing the engine at another oracle changes which quotes it sees.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn get_price(&self, oracle: &Principal, pair: &AssetPair) -> Option<PricePoint>;
}
