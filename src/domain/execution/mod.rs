//! Execution domain - per-hop pricing, settlement and compensation

mod hop_executor;
mod transfer;
mod transfer_journal;

pub use hop_executor::HopExecutor;
pub use transfer::{AssetTransfer, NativeSettlement, Settlement, TransferLeg, TransferRecord};
pub use transfer_journal::TransferJournal;

use serde::Serialize;

use crate::shared::types::{Amount, AssetId};

/// Outcome of one executed (or quoted) hop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HopFill {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub amount_in: Amount,
    /// `amount_in * rate`
    pub gross_out: Amount,
    /// Charged in the native settlement asset
    pub fee: Amount,
    /// `gross_out - fee`, the input of the next hop
    pub amount_out: Amount,
}
