use async_trait::async_trait;

use crate::errors::CoreError;

/// Key-value blob store the ledger persists its snapshots into.
///
/// Blobs are opaque strings (JSON in practice). Implementations report every
/// failure as `CoreError::Persistence`; a missing key is `Ok(None)`, not an error.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Overwrite the blob stored under `key`.
    async fn set(&self, key: &str, blob: String) -> Result<(), CoreError>;

    /// Delete `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), CoreError>;
}
