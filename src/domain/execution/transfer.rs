//! Value-transfer collaborators

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use super::TransferJournal;
use crate::shared::types::{Amount, AssetId, Principal};

/// Moves balances of a given asset between accounts.
#[async_trait]
pub trait AssetTransfer: Send + Sync {
    async fn transfer(
        &self,
        asset: &AssetId,
        amount: Amount,
        from: &Principal,
        to: &Principal,
    ) -> anyhow::Result<()>;
}

/// Moves the native settlement asset. Used only for fees.
#[async_trait]
pub trait NativeSettlement: Send + Sync {
    async fn transfer(&self, amount: Amount, from: &Principal, to: &Principal) -> anyhow::Result<()>;
}

/// Which capability a transfer goes through
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransferLeg {
    Asset(AssetId),
    Native,
}

impl fmt::Display for TransferLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferLeg::Asset(asset) => write!(f, "{}", asset),
            TransferLeg::Native => f.write_str("native"),
        }
    }
}

/// A single committed movement of value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    pub leg: TransferLeg,
    pub amount: Amount,
    pub from: Principal,
    pub to: Principal,
}

impl TransferRecord {
    /// The movement that undoes this one
    pub fn reversal(&self) -> Self {
        Self {
            leg: self.leg.clone(),
            amount: self.amount,
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

/// Both transfer capabilities, borrowed for the duration of one swap
#[derive(Clone, Copy)]
pub struct Settlement<'a> {
    assets: &'a dyn AssetTransfer,
    native: &'a dyn NativeSettlement,
}

impl<'a> Settlement<'a> {
    pub fn new(assets: &'a dyn AssetTransfer, native: &'a dyn NativeSettlement) -> Self {
        Self { assets, native }
    }

    async fn submit(&self, record: &TransferRecord) -> anyhow::Result<()> {
        let result = match &record.leg {
            TransferLeg::Asset(asset) => {
                self.assets
                    .transfer(asset, record.amount, &record.from, &record.to)
                    .await
            }
            TransferLeg::Native => self.native.transfer(record.amount, &record.from, &record.to).await,
        };
        result.with_context(|| {
            format!(
                "transfer of {} {} from {} to {}",
                record.amount, record.leg, record.from, record.to
            )
        })
    }

    /// Submit `record` and journal it once the collaborator accepts it.
    pub async fn execute(
        &self,
        record: TransferRecord,
        journal: &mut TransferJournal,
    ) -> anyhow::Result<()> {
        self.submit(&record).await?;
        journal.record(record);
        Ok(())
    }

    /// Issue the reversal of `record` without journaling it
    pub async fn reverse(&self, record: &TransferRecord) -> anyhow::Result<()> {
        self.submit(&record.reversal()).await
    }
}
