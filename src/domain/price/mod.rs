//! Price domain - oracle contract and freshness rules

mod price_feed;

pub use price_feed::PriceOracle;

use serde::{Deserialize, Serialize};

use crate::shared::types::{BlockHeight, Rate};

/// Maximum age, in blocks, of a usable quote (exclusive)
pub const STALENESS_WINDOW: BlockHeight = 10;

/// Quote published by the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Integer multiplier applied to the input amount
    pub rate: Rate,
    /// Block height at which the quote was published
    pub timestamp: BlockHeight,
}

impl PricePoint {
    pub fn new(rate: Rate, timestamp: BlockHeight) -> Self {
        Self { rate, timestamp }
    }

    /// Blocks elapsed since publication; `None` for a quote from a future height.
    pub fn age(&self, current_height: BlockHeight) -> Option<BlockHeight> {
        current_height.checked_sub(self.timestamp)
    }

    pub fn is_fresh(&self, current_height: BlockHeight) -> bool {
        matches!(self.age(current_height), Some(age) if age < STALENESS_WINDOW)
    }
}
