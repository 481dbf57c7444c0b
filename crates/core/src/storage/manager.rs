use log::{debug, error, warn};

use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingStore};
use crate::models::portfolio::Portfolio;
use crate::models::settings::LedgerSettings;
use crate::models::transaction::{Transaction, TransactionLog};

use super::traits::KeyValueStore;

/// Snapshot persistence for the ledger.
///
/// Holdings and transactions are two independent JSON blobs, each fully
/// overwritten on every save. Keys come from `LedgerSettings`.
pub struct StorageManager<S: KeyValueStore> {
    store: S,
    portfolio_key: String,
    transactions_key: String,
}

impl<S: KeyValueStore> StorageManager<S> {
    pub fn new(store: S, settings: &LedgerSettings) -> Self {
        Self {
            store,
            portfolio_key: settings.portfolio_key.clone(),
            transactions_key: settings.transactions_key.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load both snapshots. Absent keys yield an empty collection; a blob
    /// that is present but unreadable is a `Deserialization` error.
    pub async fn load(&self) -> Result<Portfolio, CoreError> {
        let holdings = match self.store.get(&self.portfolio_key).await? {
            Some(blob) => {
                let rows: Vec<Holding> = serde_json::from_str(&blob).map_err(|e| {
                    CoreError::Deserialization(format!("Failed to read holdings snapshot: {e}"))
                })?;
                HoldingStore::from_snapshot(rows)
            }
            None => HoldingStore::new(),
        };

        let transactions = match self.store.get(&self.transactions_key).await? {
            Some(blob) => {
                let rows: Vec<Transaction> = serde_json::from_str(&blob).map_err(|e| {
                    CoreError::Deserialization(format!(
                        "Failed to read transactions snapshot: {e}"
                    ))
                })?;
                TransactionLog::from_snapshot(rows)
            }
            None => TransactionLog::new(),
        };

        debug!(
            "Loaded ledger: {} holdings, {} transactions",
            holdings.len(),
            transactions.len()
        );

        Ok(Portfolio {
            holdings,
            transactions,
        })
    }

    pub async fn save_holdings(&self, holdings: &HoldingStore) -> Result<(), CoreError> {
        let blob = serde_json::to_string(holdings).map_err(|e| {
            CoreError::Serialization(format!("Failed to serialize holdings: {e}"))
        })?;
        self.store.set(&self.portfolio_key, blob).await
    }

    pub async fn save_transactions(&self, transactions: &TransactionLog) -> Result<(), CoreError> {
        let blob = serde_json::to_string(transactions).map_err(|e| {
            CoreError::Serialization(format!("Failed to serialize transactions: {e}"))
        })?;
        self.store.set(&self.transactions_key, blob).await
    }

    /// Persist `next`, holdings first, then transactions.
    ///
    /// When the transactions write fails after the holdings write succeeded,
    /// the holdings snapshot from `previous` is written back so storage keeps
    /// matching the in-memory state the caller still holds. The original
    /// error is returned either way.
    pub async fn commit(&self, previous: &Portfolio, next: &Portfolio) -> Result<(), CoreError> {
        self.save_holdings(&next.holdings).await?;

        if let Err(e) = self.save_transactions(&next.transactions).await {
            warn!("Transaction snapshot write failed, restoring holdings snapshot: {e}");
            if let Err(restore) = self.save_holdings(&previous.holdings).await {
                error!("Failed to restore holdings snapshot after write failure: {restore}");
            }
            return Err(e);
        }

        Ok(())
    }

    /// Delete both snapshots.
    pub async fn clear(&self) -> Result<(), CoreError> {
        self.store.remove(&self.portfolio_key).await?;
        self.store.remove(&self.transactions_key).await?;
        Ok(())
    }
}
