//! Swap domain - public entry point, configuration state and results

mod engine_state;
mod swap_engine;

pub use engine_state::EngineState;
pub use swap_engine::SwapEngine;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::execution::HopFill;
use crate::shared::types::{Amount, AssetId, Principal};

/// Published after every successful swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapCompleted {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub amount_in: Amount,
    pub amount_out: Amount,
}

/// Full record of a settled swap
#[derive(Debug, Clone, Serialize)]
pub struct SwapReceipt {
    pub id: String,
    pub caller: Principal,
    pub path: Vec<AssetId>,
    pub hops: Vec<HopFill>,
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub completed_at: DateTime<Utc>,
}

/// Dry-run result: what a swap would settle at the given height
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapQuote {
    pub path: Vec<AssetId>,
    pub hops: Vec<HopFill>,
    pub amount_in: Amount,
    pub amount_out: Amount,
}

impl SwapQuote {
    /// Sum of per-hop fees, in the native asset
    pub fn total_fee(&self) -> Amount {
        self.hops.iter().map(|h| h.fee).sum()
    }
}
