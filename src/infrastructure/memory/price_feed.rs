use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::price::{PriceOracle, PricePoint};
use crate::shared::types::{AssetPair, Principal};

/// Quotes keyed by publishing oracle and directional pair
#[derive(Debug, Default)]
pub struct MemoryPriceFeed {
    prices: RwLock<HashMap<(Principal, AssetPair), PricePoint>>,
}

impl MemoryPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_price(&self, oracle: &Principal, pair: AssetPair, price: PricePoint) {
        self.prices.write().await.insert((oracle.clone(), pair), price);
    }

    pub async fn remove_price(&self, oracle: &Principal, pair: &AssetPair) -> Option<PricePoint> {
        self.prices.write().await.remove(&(oracle.clone(), pair.clone()))
    }
}

#[async_trait]
impl PriceOracle for MemoryPriceFeed {
    async fn get_price(&self, oracle: &Principal, pair: &AssetPair) -> Option<PricePoint> {
        self.prices
            .read()
            .await
            .get(&(oracle.clone(), pair.clone()))
            .copied()
    }
}
