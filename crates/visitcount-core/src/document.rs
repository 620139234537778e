//! Document-store contract.
//!
//! The counter never talks to a concrete database client. It sees a keyed
//! store of JSON field maps with fetch, create, partial-update and atomic
//! increment primitives; backends live in the server crate.

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;

/// Field map of a single document.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Collection/document pair identifying one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub collection: String,
    pub document: String,
}

impl DocumentKey {
    pub fn new(collection: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            document: document.into(),
        }
    }
}

impl Default for DocumentKey {
    fn default() -> Self {
        Self::new("views", "counter")
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.document)
    }
}

/// Keyed document store.
///
/// Each call is expected to be atomic for a single document. Nothing wraps a
/// `get` followed by `update` in a transaction; callers that need that use
/// [`DocumentStore::increment`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend label for logs and metrics.
    fn name(&self) -> &'static str;

    /// Fetch a document. `Ok(None)` means it does not exist.
    async fn get(&self, key: &DocumentKey) -> Result<Option<Fields>>;

    /// Create the document, replacing any previous content.
    async fn set(&self, key: &DocumentKey, fields: Fields) -> Result<()>;

    /// Merge `partial` into an existing document.
    /// Fails with `CounterError::NotFound` when the document is missing.
    async fn update(&self, key: &DocumentKey, partial: Fields) -> Result<()>;

    /// Add `delta` to an integer field in one atomic step, creating the
    /// document (and the field, starting from 0) when missing.
    /// Returns the value after the increment.
    async fn increment(&self, key: &DocumentKey, field: &str, delta: u64) -> Result<u64>;
}
