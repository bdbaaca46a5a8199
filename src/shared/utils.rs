//! Utility functions and helpers

use crate::shared::types::{Amount, BasisPoints, BPS_DENOMINATOR};

/// `floor(amount * bps / 10000)`, or `None` on overflow
pub fn bps_of(amount: Amount, bps: BasisPoints) -> Option<Amount> {
    amount
        .checked_mul(bps as u128)
        .map(|scaled| scaled / BPS_DENOMINATOR)
}

/// Render a path as `A -> B -> C`
pub fn format_path<T: std::fmt::Display>(path: &[T]) -> String {
    path.iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
