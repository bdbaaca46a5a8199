use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::domain::execution::{AssetTransfer, NativeSettlement};
use crate::shared::types::{Amount, AssetId, Principal};

/// Balance book implementing both transfer capabilities.
///
/// Native transfers are booked under `native_asset`. Assets passed to
/// `fail_on` reject every transfer, which lets tests drive failure paths.
#[derive(Debug)]
pub struct MemoryLedger {
    native_asset: AssetId,
    balances: RwLock<HashMap<(AssetId, Principal), Amount>>,
    failing: RwLock<HashSet<AssetId>>,
}

impl MemoryLedger {
    pub fn new(native_asset: AssetId) -> Self {
        Self {
            native_asset,
            balances: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
        }
    }

    /// Mint `amount` into `owner`'s balance
    pub async fn credit(&self, asset: &AssetId, owner: &Principal, amount: Amount) {
        let mut balances = self.balances.write().await;
        let balance = balances.entry((asset.clone(), owner.clone())).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub async fn balance_of(&self, asset: &AssetId, owner: &Principal) -> Amount {
        self.balances
            .read()
            .await
            .get(&(asset.clone(), owner.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Non-zero balances, sorted by asset then owner
    pub async fn snapshot(&self) -> Vec<(AssetId, Principal, Amount)> {
        let mut rows: Vec<_> = self
            .balances
            .read()
            .await
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|((asset, owner), amount)| (asset.clone(), owner.clone(), *amount))
            .collect();
        rows.sort();
        rows
    }

    pub async fn fail_on(&self, asset: AssetId) {
        self.failing.write().await.insert(asset);
    }

    pub async fn clear_failures(&self) {
        self.failing.write().await.clear();
    }

    async fn move_balance(
        &self,
        asset: &AssetId,
        amount: Amount,
        from: &Principal,
        to: &Principal,
    ) -> Result<()> {
        if self.failing.read().await.contains(asset) {
            bail!("transfers of {} are disabled", asset);
        }

        let mut balances = self.balances.write().await;
        let available = balances
            .get(&(asset.clone(), from.clone()))
            .copied()
            .unwrap_or(0);
        if available < amount {
            bail!(
                "insufficient {} balance for {}: has {}, needs {}",
                asset,
                from,
                available,
                amount
            );
        }

        balances.insert((asset.clone(), from.clone()), available - amount);
        let credit = balances.entry((asset.clone(), to.clone())).or_insert(0);
        *credit = credit
            .checked_add(amount)
            .ok_or_else(|| anyhow!("{} balance of {} overflows", asset, to))?;
        Ok(())
    }
}

#[async_trait]
impl AssetTransfer for MemoryLedger {
    async fn transfer(
        &self,
        asset: &AssetId,
        amount: Amount,
        from: &Principal,
        to: &Principal,
    ) -> Result<()> {
        self.move_balance(asset, amount, from, to).await
    }
}

#[async_trait]
impl NativeSettlement for MemoryLedger {
    async fn transfer(&self, amount: Amount, from: &Principal, to: &Principal) -> Result<()> {
        self.move_balance(&self.native_asset, amount, from, to).await
    }
}
