//! Single-leg conversion

use tracing::{debug, warn};

use super::{HopFill, Settlement, TransferJournal, TransferLeg, TransferRecord};
use crate::domain::price::PriceOracle;
use crate::domain::protocol::ProtocolConfig;
use crate::domain::registry::PairTable;
use crate::shared::errors::SwapError;
use crate::shared::types::{Amount, AssetId, AssetPair, BlockHeight, Principal};
use crate::shared::utils::bps_of;

/// Prices and settles one hop against a configuration snapshot.
pub struct HopExecutor<'a> {
    config: &'a ProtocolConfig,
    pairs: &'a PairTable,
    oracle: &'a dyn PriceOracle,
}

impl<'a> HopExecutor<'a> {
    pub fn new(config: &'a ProtocolConfig, pairs: &'a PairTable, oracle: &'a dyn PriceOracle) -> Self {
        Self {
            config,
            pairs,
            oracle,
        }
    }

    /// Validate the leg and compute its amounts without moving anything.
    pub async fn price_hop(
        &self,
        leg: &AssetPair,
        amount_in: Amount,
        current_height: BlockHeight,
    ) -> Result<HopFill, SwapError> {
        let pair = self.pairs.get(leg).ok_or_else(|| SwapError::InvalidPair {
            asset_in: leg.asset_in.clone(),
            asset_out: leg.asset_out.clone(),
        })?;

        let price = self
            .oracle
            .get_price(&self.config.oracle, leg)
            .await
            .ok_or_else(|| SwapError::NoRoute {
                asset_in: leg.asset_in.clone(),
                asset_out: leg.asset_out.clone(),
            })?;

        if !price.is_fresh(current_height) {
            if price.age(current_height).is_none() {
                warn!(hop = %leg, quoted_at = price.timestamp, current_height, "Quote published ahead of current height");
            }
            return Err(SwapError::StalePrice {
                quoted_at: price.timestamp,
                current_height,
            });
        }

        let gross_out = amount_in
            .checked_mul(price.rate)
            .ok_or(SwapError::MathOverflow)?;
        let fee = bps_of(gross_out, pair.fee_bps).ok_or(SwapError::MathOverflow)?;

        Ok(HopFill {
            asset_in: leg.asset_in.clone(),
            asset_out: leg.asset_out.clone(),
            amount_in,
            gross_out,
            fee,
            amount_out: gross_out - fee,
        })
    }

    /// Price the leg, then settle it: input to custody, output to the
    /// caller, fee to the recipient, in that order.
    pub async fn execute_hop(
        &self,
        leg: &AssetPair,
        amount_in: Amount,
        caller: &Principal,
        current_height: BlockHeight,
        settlement: &Settlement<'_>,
        journal: &mut TransferJournal,
    ) -> Result<HopFill, SwapError> {
        let fill = self.price_hop(leg, amount_in, current_height).await?;

        let transfer_in = TransferRecord {
            leg: TransferLeg::Asset(fill.asset_in.clone()),
            amount: fill.amount_in,
            from: caller.clone(),
            to: self.config.custody.clone(),
        };
        settlement.execute(transfer_in, journal).await.map_err(|e| {
            warn!(hop = %leg, error = %format!("{:#}", e), "Input transfer rejected");
            rejected(&fill.asset_in, e)
        })?;

        let transfer_out = TransferRecord {
            leg: TransferLeg::Asset(fill.asset_out.clone()),
            amount: fill.amount_out,
            from: self.config.custody.clone(),
            to: caller.clone(),
        };
        settlement.execute(transfer_out, journal).await.map_err(|e| {
            warn!(hop = %leg, error = %format!("{:#}", e), "Output transfer rejected");
            rejected(&fill.asset_out, e)
        })?;

        let fee_payment = TransferRecord {
            leg: TransferLeg::Native,
            amount: fill.fee,
            from: caller.clone(),
            to: self.config.fee_recipient.clone(),
        };
        settlement.execute(fee_payment, journal).await.map_err(|e| {
            warn!(hop = %leg, error = %format!("{:#}", e), "Fee transfer rejected");
            SwapError::FeeTransferFailed
        })?;

        debug!(
            hop = %leg,
            amount_in = fill.amount_in,
            gross_out = fill.gross_out,
            fee = fill.fee,
            amount_out = fill.amount_out,
            "Hop settled"
        );
        Ok(fill)
    }
}

fn rejected(asset: &AssetId, e: anyhow::Error) -> SwapError {
    SwapError::swap_failed(SwapError::TransferRejected {
        asset: asset.clone(),
        reason: format!("{:#}", e),
    })
}
