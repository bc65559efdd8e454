// Key-value backend abstraction and the in-memory backend
//
// Any medium that can get, set and remove string values by key can hold
// interview state. Writes are last-write-wins with no merging.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::errors::StoreError;

/// Durable string key-value storage.
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove all given keys; missing keys are ignored.
    async fn remove(&self, keys: &[String]) -> Result<(), StoreError>;

    /// Backend name for status output.
    fn name(&self) -> &str;
}

/// Process-local backend. Shared clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: Arc<DashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            self.values.remove(key);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
