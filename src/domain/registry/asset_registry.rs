//! Set of assets the engine accepts

use std::collections::BTreeSet;

use crate::shared::errors::SwapError;
use crate::shared::types::AssetId;

/// Registered assets. There is no removal.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    assets: BTreeSet<AssetId>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, asset: AssetId) -> Result<(), SwapError> {
        if self.assets.contains(&asset) {
            return Err(SwapError::AlreadySupported(asset));
        }
        self.assets.insert(asset);
        Ok(())
    }

    pub fn contains(&self, asset: &AssetId) -> bool {
        self.assets.contains(asset)
    }

    /// `InvalidToken` naming the first unregistered asset
    pub fn require(&self, asset: &AssetId) -> Result<(), SwapError> {
        if self.contains(asset) {
            Ok(())
        } else {
            Err(SwapError::InvalidToken(asset.clone()))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetId> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
