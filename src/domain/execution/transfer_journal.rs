//! Compensation log for non-transactional transfer collaborators

use tracing::{error, warn};

use super::{Settlement, TransferRecord};

/// Transfers committed during one swap, in execution order.
///
/// When a swap fails after some transfers went through, `unwind` issues
/// the reversals newest first so balances end where they started.
#[derive(Debug, Default)]
pub struct TransferJournal {
    records: Vec<TransferRecord>,
}

impl TransferJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: TransferRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TransferRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reverse every committed transfer. Returns how many reversals failed.
    pub async fn unwind(self, settlement: &Settlement<'_>) -> usize {
        if self.records.is_empty() {
            return 0;
        }

        warn!(transfers = self.records.len(), "Unwinding committed transfers");
        let mut failed = 0;
        for record in self.records.iter().rev() {
            if let Err(e) = settlement.reverse(record).await {
                error!(error = %format!("{:#}", e), "Compensating transfer failed");
                failed += 1;
            }
        }
        failed
    }
}
