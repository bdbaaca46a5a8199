//! Routing domain - turns an (asset_in, asset_out) request into a path

mod route_resolver;

pub use route_resolver::{hops, RouteResolver};
