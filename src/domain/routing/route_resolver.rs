//! Route resolution

use tracing::debug;

use crate::domain::registry::RouteTable;
use crate::shared::types::{AssetId, AssetPair};

/// Resolves the path a swap will traverse.
///
/// A configured route wins; otherwise the direct `[asset_in, asset_out]`
/// path is used. Pairs along the path are not checked here, hop execution
/// validates each one as it reaches it.
pub struct RouteResolver<'a> {
    routes: &'a RouteTable,
}

impl<'a> RouteResolver<'a> {
    pub fn new(routes: &'a RouteTable) -> Self {
        Self { routes }
    }

    pub fn resolve(&self, asset_in: &AssetId, asset_out: &AssetId) -> Vec<AssetId> {
        let key = AssetPair::new(asset_in.clone(), asset_out.clone());
        match self.routes.get(&key) {
            Some(route) => {
                debug!(route = %key, hops = route.hop_count(), "Using configured route");
                route.path.clone()
            }
            None => vec![asset_in.clone(), asset_out.clone()],
        }
    }
}

/// Consecutive `(in, out)` legs of a path
pub fn hops(path: &[AssetId]) -> impl Iterator<Item = AssetPair> + '_ {
    path.windows(2)
        .map(|leg| AssetPair::new(leg[0].clone(), leg[1].clone()))
}
