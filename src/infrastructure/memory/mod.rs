//! In-memory oracle and ledger for tests and local simulation

mod ledger;
mod price_feed;

pub use ledger::MemoryLedger;
pub use price_feed::MemoryPriceFeed;
