use super::holding::HoldingStore;
use super::transaction::TransactionLog;

/// The ledger state: current positions plus the full trade history.
///
/// Persisted as two independent snapshot blobs (see `StorageManager`).
/// The executor mutates a clone of this and swaps it in only after both
/// snapshots are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    /// Current positions, one per symbol
    pub holdings: HoldingStore,

    /// Every buy/sell ever executed, append-only
    pub transactions: TransactionLog,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty() && self.transactions.is_empty()
    }
}
