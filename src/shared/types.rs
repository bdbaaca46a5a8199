//! Common types used across the engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token amount in the asset's smallest unit
pub type Amount = u128;

/// Exchange rate applied as an integer multiplier
pub type Rate = u128;

/// Block height used for price freshness
pub type BlockHeight = u64;

/// Fee rate in basis points (1 bps = 0.01%)
pub type BasisPoints = u32;

/// Denominator for basis point arithmetic
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Upper bound for any pair or protocol fee (5%)
pub const MAX_FEE_BPS: BasisPoints = 500;

/// Asset identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Account or contract identity (admin, callers, custody, oracle source)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Directional (asset_in, asset_out) key. A->B and B->A are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetPair {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
}

impl AssetPair {
    pub fn new(asset_in: AssetId, asset_out: AssetId) -> Self {
        Self { asset_in, asset_out }
    }

    pub fn reversed(&self) -> Self {
        Self {
            asset_in: self.asset_out.clone(),
            asset_out: self.asset_in.clone(),
        }
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.asset_in, self.asset_out)
    }
}
