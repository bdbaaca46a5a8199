//! JSON reports printed by the CLI

use serde::Serialize;

use crate::domain::swap::{EngineState, SwapQuote, SwapReceipt};
use crate::shared::types::{Amount, AssetId, BasisPoints, Principal};

#[derive(Debug, Serialize)]
pub struct BalanceRow {
    pub owner: Principal,
    pub asset: AssetId,
    pub amount: Amount,
}

/// Settled swap plus the ledger afterwards
#[derive(Debug, Serialize)]
pub struct SwapReport {
    pub receipt: SwapReceipt,
    pub balances: Vec<BalanceRow>,
}

#[derive(Debug, Serialize)]
pub struct QuoteReport {
    #[serde(flatten)]
    pub quote: SwapQuote,
    pub total_fee: Amount,
}

impl From<SwapQuote> for QuoteReport {
    fn from(quote: SwapQuote) -> Self {
        Self {
            total_fee: quote.total_fee(),
            quote,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PairRow {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub fee_bps: BasisPoints,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct RouteRow {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub path: Vec<AssetId>,
}

/// Configured assets, pairs and routes, sorted for stable output
#[derive(Debug, Serialize)]
pub struct TopologyReport {
    pub admin: Principal,
    pub oracle: Principal,
    pub paused: bool,
    pub protocol_fee_bps: BasisPoints,
    pub max_path_length: usize,
    pub assets: Vec<AssetId>,
    pub pairs: Vec<PairRow>,
    pub routes: Vec<RouteRow>,
}

impl From<&EngineState> for TopologyReport {
    fn from(state: &EngineState) -> Self {
        let config = state.config();

        let mut pairs: Vec<PairRow> = state
            .pairs()
            .iter()
            .map(|(key, pair)| PairRow {
                asset_in: key.asset_in.clone(),
                asset_out: key.asset_out.clone(),
                fee_bps: pair.fee_bps,
                active: pair.active,
            })
            .collect();
        pairs.sort_by(|a, b| (&a.asset_in, &a.asset_out).cmp(&(&b.asset_in, &b.asset_out)));

        let mut routes: Vec<RouteRow> = state
            .routes()
            .iter()
            .map(|(key, route)| RouteRow {
                asset_in: key.asset_in.clone(),
                asset_out: key.asset_out.clone(),
                path: route.path.clone(),
            })
            .collect();
        routes.sort_by(|a, b| (&a.asset_in, &a.asset_out).cmp(&(&b.asset_in, &b.asset_out)));

        Self {
            admin: config.admin.clone(),
            oracle: config.oracle.clone(),
            paused: config.paused,
            protocol_fee_bps: config.protocol_fee_bps,
            max_path_length: config.max_path_length,
            assets: state.assets().iter().cloned().collect(),
            pairs,
            routes,
        }
    }
}

pub fn to_json<T: Serialize>(report: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
