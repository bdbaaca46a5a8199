//! Application services and use cases

use std::sync::Arc;

use tracing::info;

use super::report::{BalanceRow, QuoteReport, SwapReport, TopologyReport};
use crate::domain::price::PricePoint;
use crate::domain::swap::SwapEngine;
use crate::infrastructure::memory::{MemoryLedger, MemoryPriceFeed};
use crate::shared::config::EngineConfig;
use crate::shared::errors::AppError;
use crate::shared::types::{Amount, AssetId, AssetPair, BlockHeight, Principal};

/// Engine wired to in-memory collaborators seeded from the config file.
pub struct SimulationService {
    engine: SwapEngine,
    ledger: Arc<MemoryLedger>,
}

impl SimulationService {
    pub async fn new(config: &EngineConfig) -> Result<Self, AppError> {
        let feed = Arc::new(MemoryPriceFeed::new());
        for entry in &config.prices {
            let oracle = entry
                .oracle
                .clone()
                .unwrap_or_else(|| config.protocol.oracle.clone());
            feed.set_price(
                &oracle,
                AssetPair::new(entry.asset_in.clone(), entry.asset_out.clone()),
                PricePoint::new(entry.rate, entry.timestamp),
            )
            .await;
        }

        let ledger = Arc::new(MemoryLedger::new(config.protocol.native_asset.clone()));
        for entry in &config.balances {
            ledger.credit(&entry.asset, &entry.owner, entry.amount).await;
        }

        let engine = SwapEngine::bootstrap(config, feed, ledger.clone(), ledger.clone())
            .await
            .map_err(|e| AppError::BootstrapError(e.to_string()))?;

        info!(
            prices = config.prices.len(),
            balances = config.balances.len(),
            "Simulation collaborators seeded"
        );
        Ok(Self { engine, ledger })
    }

    pub async fn swap(
        &self,
        asset_in: &AssetId,
        asset_out: &AssetId,
        amount: Amount,
        min_out: Amount,
        caller: &Principal,
        height: BlockHeight,
    ) -> Result<SwapReport, AppError> {
        let receipt = self
            .engine
            .swap_detailed(asset_in, asset_out, amount, min_out, caller, height)
            .await?;

        let balances = self
            .ledger
            .snapshot()
            .await
            .into_iter()
            .map(|(asset, owner, amount)| BalanceRow { owner, asset, amount })
            .collect();

        Ok(SwapReport { receipt, balances })
    }

    pub async fn quote(
        &self,
        asset_in: &AssetId,
        asset_out: &AssetId,
        amount: Amount,
        height: BlockHeight,
    ) -> Result<QuoteReport, AppError> {
        let quote = self.engine.quote(asset_in, asset_out, amount, height).await?;
        Ok(quote.into())
    }

    pub async fn topology(&self) -> TopologyReport {
        TopologyReport::from(&self.engine.snapshot().await)
    }
}
