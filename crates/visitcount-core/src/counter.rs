//! Visit counter increment.
//!
//! Two modes are supported:
//! - `TwoStep`: fetch, add one, then update (or create on first visit). Two
//!   concurrent requests may read the same value and both write `n + 1`, so one
//!   visit is lost. This is the legacy behaviour and the default.
//! - `Atomic`: a single `DocumentStore::increment` call. No lost updates.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::document::{DocumentKey, DocumentStore, Fields};
use crate::error::CounterError;

/// Name of the integer field holding the visit count.
pub const COUNT_FIELD: &str = "count";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncrementMode {
    #[default]
    TwoStep,
    Atomic,
}

impl IncrementMode {
    pub fn as_str(self) -> &'static str {
        match self {
            IncrementMode::TwoStep => "two_step",
            IncrementMode::Atomic => "atomic",
        }
    }
}

/// Store call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Get,
    Set,
    Update,
    Increment,
}

impl StoreOp {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreOp::Get => "get",
            StoreOp::Set => "set",
            StoreOp::Update => "update",
            StoreOp::Increment => "increment",
        }
    }
}

/// The single failure class of an increment: any fetch/update/create error.
#[derive(Debug, thiserror::Error)]
#[error("{} {key} failed: {source}", .op.as_str())]
pub struct StoreOperationFailure {
    pub op: StoreOp,
    pub key: DocumentKey,
    #[source]
    pub source: CounterError,
}

impl StoreOperationFailure {
    fn new(op: StoreOp, key: &DocumentKey, source: CounterError) -> Self {
        Self {
            op,
            key: key.clone(),
            source,
        }
    }
}

/// Increments the counter document through a [`DocumentStore`].
///
/// Holds no counter state of its own; every call goes to the store.
#[derive(Clone)]
pub struct VisitCounter {
    store: Arc<dyn DocumentStore>,
    key: DocumentKey,
    mode: IncrementMode,
}

impl fmt::Debug for VisitCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitCounter")
            .field("store", &self.store.name())
            .field("key", &self.key)
            .field("mode", &self.mode)
            .finish()
    }
}

impl VisitCounter {
    pub fn new(store: Arc<dyn DocumentStore>, key: DocumentKey, mode: IncrementMode) -> Self {
        Self { store, key, mode }
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    pub fn mode(&self) -> IncrementMode {
        self.mode
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Record one visit and return the new count.
    pub async fn increment(&self) -> Result<u64, StoreOperationFailure> {
        match self.mode {
            IncrementMode::TwoStep => self.increment_two_step().await,
            IncrementMode::Atomic => self
                .store
                .increment(&self.key, COUNT_FIELD, 1)
                .await
                .map_err(|e| StoreOperationFailure::new(StoreOp::Increment, &self.key, e)),
        }
    }

    async fn increment_two_step(&self) -> Result<u64, StoreOperationFailure> {
        let key = &self.key;
        let existing = self
            .store
            .get(key)
            .await
            .map_err(|e| StoreOperationFailure::new(StoreOp::Get, key, e))?;

        match existing {
            Some(fields) => {
                let current =
                    read_count(&fields).map_err(|e| StoreOperationFailure::new(StoreOp::Get, key, e))?;
                let next = current.checked_add(1).ok_or_else(|| {
                    StoreOperationFailure::new(
                        StoreOp::Get,
                        key,
                        CounterError::Internal("count overflow".into()),
                    )
                })?;

                self.store
                    .update(key, count_fields(next))
                    .await
                    .map_err(|e| StoreOperationFailure::new(StoreOp::Update, key, e))?;
                tracing::debug!(%key, count = next, "counter updated");
                Ok(next)
            }
            None => {
                self.store
                    .set(key, count_fields(1))
                    .await
                    .map_err(|e| StoreOperationFailure::new(StoreOp::Set, key, e))?;
                tracing::debug!(%key, "counter created");
                Ok(1)
            }
        }
    }
}

/// Read the count field; a missing field counts as 0.
pub fn read_count(fields: &Fields) -> Result<u64, CounterError> {
    read_count_field(fields, COUNT_FIELD)
}

/// Read a non-negative integer field; a missing field counts as 0.
pub fn read_count_field(fields: &Fields, field: &str) -> Result<u64, CounterError> {
    match fields.get(field) {
        None => Ok(0),
        Some(v) => v.as_u64().ok_or_else(|| {
            CounterError::Corrupt(format!("{field} is not a non-negative integer: {v}"))
        }),
    }
}

/// `{"count": n}`
pub fn count_fields(n: u64) -> Fields {
    let mut fields = Fields::new();
    fields.insert(COUNT_FIELD.to_string(), Value::from(n));
    fields
}
