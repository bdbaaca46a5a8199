//! Configuration tables and the admin operations that mutate them

use tracing::info;

use crate::domain::protocol::{ensure_admin, ProtocolConfig};
use crate::domain::registry::{AssetRegistry, Pair, PairTable, Route, RouteTable};
use crate::shared::errors::SwapError;
use crate::shared::types::{Amount, AssetId, AssetPair, BasisPoints, Principal};
use crate::shared::utils::format_path;

/// Everything a swap reads. Admin operations check the caller first and
/// leave the state untouched on any error.
#[derive(Debug, Clone)]
pub struct EngineState {
    config: ProtocolConfig,
    assets: AssetRegistry,
    pairs: PairTable,
    routes: RouteTable,
}

impl EngineState {
    pub fn new(config: ProtocolConfig) -> Self {
        Self {
            config,
            assets: AssetRegistry::new(),
            pairs: PairTable::new(),
            routes: RouteTable::new(),
        }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn pairs(&self) -> &PairTable {
        &self.pairs
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn get_pair(&self, asset_in: &AssetId, asset_out: &AssetId) -> Option<Pair> {
        self.pairs
            .get(&AssetPair::new(asset_in.clone(), asset_out.clone()))
            .copied()
    }

    pub fn get_route(&self, asset_in: &AssetId, asset_out: &AssetId) -> Option<Route> {
        self.routes
            .get(&AssetPair::new(asset_in.clone(), asset_out.clone()))
            .cloned()
    }

    // ---- admin operations ----

    pub fn add_asset(&mut self, caller: &Principal, asset: AssetId) -> Result<(), SwapError> {
        ensure_admin(&self.config, caller)?;
        self.assets.add(asset.clone())?;
        info!(asset = %asset, "Asset registered");
        Ok(())
    }

    pub fn add_pair(
        &mut self,
        caller: &Principal,
        asset_in: AssetId,
        asset_out: AssetId,
        fee_bps: BasisPoints,
    ) -> Result<(), SwapError> {
        ensure_admin(&self.config, caller)?;
        let key = AssetPair::new(asset_in, asset_out);
        self.pairs.insert(&self.assets, key.clone(), fee_bps)?;
        info!(pair = %key, fee_bps, "Pair created");
        Ok(())
    }

    pub fn set_route(
        &mut self,
        caller: &Principal,
        asset_in: AssetId,
        asset_out: AssetId,
        path: Vec<AssetId>,
    ) -> Result<(), SwapError> {
        ensure_admin(&self.config, caller)?;
        let key = AssetPair::new(asset_in, asset_out);
        let description = format_path(&path);
        let previous = self
            .routes
            .upsert(key.clone(), path, self.config.max_path_length)?;
        info!(
            route = %key,
            path = %description,
            replaced = previous.is_some(),
            "Route set"
        );
        Ok(())
    }

    pub fn set_protocol_fee(&mut self, caller: &Principal, bps: BasisPoints) -> Result<(), SwapError> {
        ensure_admin(&self.config, caller)?;
        self.config.set_protocol_fee(bps)?;
        info!(bps, "Protocol fee updated");
        Ok(())
    }

    pub fn set_fee_recipient(&mut self, caller: &Principal, recipient: Principal) -> Result<(), SwapError> {
        ensure_admin(&self.config, caller)?;
        info!(recipient = %recipient, "Fee recipient updated");
        self.config.fee_recipient = recipient;
        Ok(())
    }

    pub fn pause(&mut self, caller: &Principal) -> Result<(), SwapError> {
        ensure_admin(&self.config, caller)?;
        self.config.paused = true;
        info!("Swaps paused");
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Principal) -> Result<(), SwapError> {
        ensure_admin(&self.config, caller)?;
        self.config.paused = false;
        info!("Swaps resumed");
        Ok(())
    }

    pub fn set_admin(&mut self, caller: &Principal, admin: Principal) -> Result<(), SwapError> {
        ensure_admin(&self.config, caller)?;
        info!(from = %self.config.admin, to = %admin, "Admin handed over");
        self.config.admin = admin;
        Ok(())
    }

    pub fn set_oracle(&mut self, caller: &Principal, oracle: Principal) -> Result<(), SwapError> {
        ensure_admin(&self.config, caller)?;
        info!(oracle = %oracle, "Oracle updated");
        self.config.oracle = oracle;
        Ok(())
    }

    pub fn set_max_path_length(&mut self, caller: &Principal, max: usize) -> Result<(), SwapError> {
        ensure_admin(&self.config, caller)?;
        self.config.set_max_path_length(max)?;
        info!(max, "Maximum path length updated");
        Ok(())
    }

    pub fn set_liquidity_threshold(&mut self, caller: &Principal, threshold: Amount) -> Result<(), SwapError> {
        ensure_admin(&self.config, caller)?;
        self.config.liquidity_threshold = threshold;
        info!(threshold, "Liquidity threshold updated");
        Ok(())
    }
}
