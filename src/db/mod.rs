//! Durable client storage.
//!
//! String keys, JSON values. The file store survives process restarts; the
//! memory store lives as long as its last clone.

pub mod file_store;
pub mod memory;

pub use file_store::FileStorage;
pub use memory::MemoryStorage;

use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Storage key names as constants.
pub mod keys {
    /// Persisted offline placeholder identity
    pub const OFFLINE_IDENTITY: &str = "auth.offline_identity";
}

/// Key/value storage that outlives the in-memory session.
#[async_trait]
pub trait DurableStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove `key`. Returns whether a value was present.
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Read and decode a typed value.
pub async fn get_json<T: DeserializeOwned>(
    storage: &dyn DurableStorage,
    key: &str,
) -> Result<Option<T>> {
    match storage.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AppError::Storage(format!("Corrupt value under {}: {}", key, e))),
        None => Ok(None),
    }
}

/// Encode and write a typed value.
pub async fn set_json<T: Serialize + Sync>(
    storage: &dyn DurableStorage,
    key: &str,
    value: &T,
) -> Result<()> {
    let value = serde_json::to_value(value)
        .map_err(|e| AppError::Storage(format!("Failed to encode {}: {}", key, e)))?;
    storage.set(key, value).await
}
