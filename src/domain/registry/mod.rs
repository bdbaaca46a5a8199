//! Registry domain - supported assets, direct pairs and configured routes

mod asset_registry;
mod pair_table;
mod route_table;

pub use asset_registry::AssetRegistry;
pub use pair_table::{Pair, PairTable};
pub use route_table::{Route, RouteTable};
