//! Direct conversions and their fee rates

use std::collections::HashMap;

use serde::Serialize;

use super::AssetRegistry;
use crate::shared::errors::SwapError;
use crate::shared::types::{AssetPair, BasisPoints, MAX_FEE_BPS};

/// A configured direct conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pair {
    pub fee_bps: BasisPoints,
    /// Set at creation. Hop execution does not read it.
    pub active: bool,
}

/// Pairs keyed by directional `(asset_in, asset_out)`
#[derive(Debug, Clone, Default)]
pub struct PairTable {
    pairs: HashMap<AssetPair, Pair>,
}

impl PairTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pair. Both assets must be registered and the key must be new.
    pub fn insert(
        &mut self,
        registry: &AssetRegistry,
        key: AssetPair,
        fee_bps: BasisPoints,
    ) -> Result<(), SwapError> {
        registry.require(&key.asset_in)?;
        registry.require(&key.asset_out)?;
        if fee_bps > MAX_FEE_BPS {
            return Err(SwapError::InvalidFee(fee_bps));
        }
        if self.pairs.contains_key(&key) {
            return Err(SwapError::PairAlreadyExists {
                asset_in: key.asset_in,
                asset_out: key.asset_out,
            });
        }

        self.pairs.insert(
            key,
            Pair {
                fee_bps,
                active: true,
            },
        );
        Ok(())
    }

    pub fn get(&self, key: &AssetPair) -> Option<&Pair> {
        self.pairs.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetPair, &Pair)> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
