//! Protocol configuration state

use serde::Serialize;

use crate::shared::config::{ProtocolSection, DEFAULT_MAX_PATH_LENGTH};
use crate::shared::errors::SwapError;
use crate::shared::types::{Amount, AssetId, BasisPoints, Principal, MAX_FEE_BPS};

/// Global engine parameters. Mutated only through admin-gated operations.
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolConfig {
    /// Only principal allowed to change configuration
    pub admin: Principal,
    /// Engine account that receives `amount_in` and pays out `amount_out`
    pub custody: Principal,
    /// Receives per-hop fees
    pub fee_recipient: Principal,
    /// Price source consulted by every hop
    pub oracle: Principal,
    /// Settlement asset used for fee payment
    pub native_asset: AssetId,
    /// Stored for governance; hop fees come from the pair
    pub protocol_fee_bps: BasisPoints,
    pub paused: bool,
    pub max_path_length: usize,
    /// Stored only, not consulted by the swap path
    pub liquidity_threshold: Amount,
}

impl ProtocolConfig {
    pub fn new(
        admin: Principal,
        custody: Principal,
        fee_recipient: Principal,
        oracle: Principal,
        native_asset: AssetId,
    ) -> Self {
        Self {
            admin,
            custody,
            fee_recipient,
            oracle,
            native_asset,
            protocol_fee_bps: 0,
            paused: false,
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            liquidity_threshold: 0,
        }
    }

    pub fn set_protocol_fee(&mut self, bps: BasisPoints) -> Result<(), SwapError> {
        if bps > MAX_FEE_BPS {
            return Err(SwapError::InvalidFee(bps));
        }
        self.protocol_fee_bps = bps;
        Ok(())
    }

    pub fn set_max_path_length(&mut self, max: usize) -> Result<(), SwapError> {
        if max < 2 {
            return Err(SwapError::InvalidPath(format!(
                "maximum path length must be at least 2, got {}",
                max
            )));
        }
        self.max_path_length = max;
        Ok(())
    }
}

impl TryFrom<&ProtocolSection> for ProtocolConfig {
    type Error = SwapError;

    fn try_from(section: &ProtocolSection) -> Result<Self, Self::Error> {
        let mut config = Self::new(
            section.admin.clone(),
            section.custody.clone(),
            section.fee_recipient.clone(),
            section.oracle.clone(),
            section.native_asset.clone(),
        );
        config.set_protocol_fee(section.protocol_fee_bps)?;
        config.set_max_path_length(section.max_path_length)?;
        config.liquidity_threshold = section.liquidity_threshold;
        config.paused = section.paused;
        Ok(config)
    }
}
