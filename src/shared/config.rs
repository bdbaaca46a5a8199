use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::shared::errors::AppError;
use crate::shared::types::{Amount, AssetId, BasisPoints, BlockHeight, Principal, Rate};

pub const DEFAULT_MAX_PATH_LENGTH: usize = 5;

/// Protocol section of the engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolSection {
    pub admin: Principal,
    /// Account holding assets between the in and out legs of a hop
    pub custody: Principal,
    pub fee_recipient: Principal,
    pub oracle: Principal,
    /// Asset in which hop fees are settled
    pub native_asset: AssetId,
    #[serde(default)]
    pub protocol_fee_bps: BasisPoints,
    #[serde(default = "default_max_path_length")]
    pub max_path_length: usize,
    #[serde(default)]
    pub liquidity_threshold: Amount,
    #[serde(default)]
    pub paused: bool,
}

fn default_max_path_length() -> usize {
    DEFAULT_MAX_PATH_LENGTH
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairEntry {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub fee_bps: BasisPoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntry {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub path: Vec<AssetId>,
}

/// Quote seeded into the in-memory price feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEntry {
    /// Defaults to the protocol oracle
    #[serde(default)]
    pub oracle: Option<Principal>,
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub rate: Rate,
    pub timestamp: BlockHeight,
}

/// Opening balance seeded into the in-memory ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub owner: Principal,
    pub asset: AssetId,
    pub amount: Amount,
}

/// Engine configuration: protocol settings plus the initial tables.
///
/// `prices` and `balances` only feed the in-memory collaborators used by
/// the CLI; a deployment wires its own oracle and ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub protocol: ProtocolSection,
    #[serde(default)]
    pub assets: Vec<AssetId>,
    #[serde(default)]
    pub pairs: Vec<PairEntry>,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    #[serde(default)]
    pub prices: Vec<PriceEntry>,
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,
}

/// Loads engine configuration from TOML
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, AppError> {
        let path = path.as_ref();
        let config_content = fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::parse(&config_content)
    }

    pub fn parse(content: &str) -> Result<EngineConfig, AppError> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        if config.protocol.max_path_length < 2 {
            return Err(AppError::ConfigError(format!(
                "max_path_length must be at least 2, got {}",
                config.protocol.max_path_length
            )));
        }

        Ok(config)
    }
}
