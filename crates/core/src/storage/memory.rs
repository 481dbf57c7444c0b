use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::errors::CoreError;

use super::traits::KeyValueStore;

/// Process-local store. Useful for tests and for hosts that persist the blobs themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with pre-existing blobs, e.g. snapshots handed over by a host app.
    pub fn with_blobs<I, K, V>(blobs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            blobs: RwLock::new(
                blobs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Synchronous peek at a stored blob.
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.blobs.read().ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> CoreError {
    CoreError::Persistence("memory store lock poisoned".into())
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let blobs = self.blobs.read().map_err(|_| poisoned())?;
        Ok(blobs.get(key).cloned())
    }

    async fn set(&self, key: &str, blob: String) -> Result<(), CoreError> {
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        blobs.insert(key.to_string(), blob);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CoreError> {
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        blobs.remove(key);
        Ok(())
    }
}
