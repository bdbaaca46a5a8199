//! Explicit multi-hop paths overriding the direct conversion

use std::collections::HashMap;

use serde::Serialize;

use crate::shared::errors::SwapError;
use crate::shared::types::{AssetId, AssetPair};

/// Ordered assets to traverse, endpoints included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: Vec<AssetId>,
}

impl Route {
    /// Validate `path` for `key` against `max_path_length`.
    pub fn new(key: &AssetPair, path: Vec<AssetId>, max_path_length: usize) -> Result<Self, SwapError> {
        if path.len() < 2 {
            return Err(SwapError::InvalidPath(format!(
                "path needs at least 2 assets, got {}",
                path.len()
            )));
        }
        if path.len() > max_path_length {
            return Err(SwapError::MaxPathLength {
                len: path.len(),
                max: max_path_length,
            });
        }
        if path.first() != Some(&key.asset_in) || path.last() != Some(&key.asset_out) {
            return Err(SwapError::InvalidPath(format!(
                "path must start at {} and end at {}",
                key.asset_in, key.asset_out
            )));
        }
        Ok(Self { path })
    }

    pub fn hop_count(&self) -> usize {
        self.path.len() - 1
    }
}

/// Routes keyed by directional `(asset_in, asset_out)`. Writes overwrite.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<AssetPair, Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and upsert. Returns the previous route, if any.
    pub fn upsert(
        &mut self,
        key: AssetPair,
        path: Vec<AssetId>,
        max_path_length: usize,
    ) -> Result<Option<Route>, SwapError> {
        let route = Route::new(&key, path, max_path_length)?;
        Ok(self.routes.insert(key, route))
    }

    pub fn get(&self, key: &AssetPair) -> Option<&Route> {
        self.routes.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetPair, &Route)> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
