use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use visitcount_core::error::{CounterError, Result};
use visitcount_core::{read_count_field, DocumentKey, DocumentStore, Fields};

/// In-process document store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: DashMap<DocumentKey, Fields>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { docs: DashMap::new() }
    }

    /// Seed or overwrite a document outside the async API.
    pub fn insert(&self, key: DocumentKey, fields: Fields) {
        self.docs.insert(key, fields);
    }

    pub fn snapshot(&self, key: &DocumentKey) -> Option<Fields> {
        self.docs.get(key).map(|r| r.value().clone())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &DocumentKey) -> Result<Option<Fields>> {
        Ok(self.snapshot(key))
    }

    async fn set(&self, key: &DocumentKey, fields: Fields) -> Result<()> {
        self.docs.insert(key.clone(), fields);
        Ok(())
    }

    async fn update(&self, key: &DocumentKey, partial: Fields) -> Result<()> {
        let mut doc = self
            .docs
            .get_mut(key)
            .ok_or_else(|| CounterError::NotFound(key.to_string()))?;
        doc.extend(partial);
        Ok(())
    }

    async fn increment(&self, key: &DocumentKey, field: &str, delta: u64) -> Result<u64> {
        // Entry guard holds the shard lock for the whole read-modify-write.
        let mut doc = self.docs.entry(key.clone()).or_default();
        let next = read_count_field(&doc, field)?
            .checked_add(delta)
            .ok_or_else(|| CounterError::Internal(format!("{field} overflow")))?;
        doc.insert(field.to_string(), Value::from(next));
        Ok(next)
    }
}
