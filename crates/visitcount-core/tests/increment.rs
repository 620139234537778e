//! Counter increment semantics against a recording in-test store.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use visitcount_core::{
    CounterError, DocumentKey, DocumentStore, Fields, IncrementMode, Result, StoreOp, VisitCounter,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Get,
    Set(Fields),
    Update(Fields),
    Increment,
}

#[derive(Default)]
struct RecordingStore {
    docs: Mutex<HashMap<DocumentKey, Fields>>,
    calls: Mutex<Vec<Call>>,
    fail_get: Option<String>,
}

impl RecordingStore {
    fn with_doc(key: &DocumentKey, fields: serde_json::Value) -> Self {
        let store = Self::default();
        let serde_json::Value::Object(map) = fields else { panic!("fields must be an object") };
        store.docs.lock().unwrap().insert(key.clone(), map);
        store
    }

    fn failing_get(msg: &str) -> Self {
        Self {
            fail_get: Some(msg.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn doc(&self, key: &DocumentKey) -> Option<Fields> {
        self.docs.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn get(&self, key: &DocumentKey) -> Result<Option<Fields>> {
        self.calls.lock().unwrap().push(Call::Get);
        if let Some(msg) = &self.fail_get {
            return Err(CounterError::Unavailable(msg.clone()));
        }
        Ok(self.docs.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &DocumentKey, fields: Fields) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Set(fields.clone()));
        self.docs.lock().unwrap().insert(key.clone(), fields);
        Ok(())
    }

    async fn update(&self, key: &DocumentKey, partial: Fields) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Update(partial.clone()));
        let mut docs = self.docs.lock().unwrap();
        let doc = docs
            .get_mut(key)
            .ok_or_else(|| CounterError::NotFound(key.to_string()))?;
        doc.extend(partial);
        Ok(())
    }

    async fn increment(&self, key: &DocumentKey, field: &str, delta: u64) -> Result<u64> {
        self.calls.lock().unwrap().push(Call::Increment);
        let mut docs = self.docs.lock().unwrap();
        let doc = docs.entry(key.clone()).or_default();
        let next = doc.get(field).and_then(|v| v.as_u64()).unwrap_or(0) + delta;
        doc.insert(field.to_string(), json!(next));
        Ok(next)
    }
}

fn obj(v: serde_json::Value) -> Fields {
    match v {
        serde_json::Value::Object(m) => m,
        _ => panic!("not an object"),
    }
}

fn counter(store: &Arc<RecordingStore>, mode: IncrementMode) -> VisitCounter {
    VisitCounter::new(store.clone(), DocumentKey::default(), mode)
}

#[tokio::test]
async fn first_visit_creates_document() {
    let store = Arc::new(RecordingStore::default());
    let n = counter(&store, IncrementMode::TwoStep).increment().await.unwrap();

    assert_eq!(n, 1);
    assert_eq!(store.calls(), vec![Call::Get, Call::Set(obj(json!({"count": 1})))]);
    assert_eq!(store.doc(&DocumentKey::default()), Some(obj(json!({"count": 1}))));
}

#[tokio::test]
async fn existing_count_is_updated_not_recreated() {
    let key = DocumentKey::default();
    let store = Arc::new(RecordingStore::with_doc(&key, json!({"count": 5, "owner": "site"})));
    let n = counter(&store, IncrementMode::TwoStep).increment().await.unwrap();

    assert_eq!(n, 6);
    assert_eq!(store.calls(), vec![Call::Get, Call::Update(obj(json!({"count": 6})))]);
    // partial update leaves other fields alone
    assert_eq!(store.doc(&key), Some(obj(json!({"count": 6, "owner": "site"}))));
}

#[tokio::test]
async fn missing_count_field_starts_from_zero() {
    let key = DocumentKey::default();
    let store = Arc::new(RecordingStore::with_doc(&key, json!({"owner": "site"})));
    let n = counter(&store, IncrementMode::TwoStep).increment().await.unwrap();

    assert_eq!(n, 1);
    assert_eq!(store.calls(), vec![Call::Get, Call::Update(obj(json!({"count": 1})))]);
}

#[tokio::test]
async fn sequential_visits_count_up() {
    let store = Arc::new(RecordingStore::default());
    let counter = counter(&store, IncrementMode::TwoStep);

    let mut seen = Vec::new();
    for _ in 0..10 {
        seen.push(counter.increment().await.unwrap());
    }
    assert_eq!(seen, (1..=10).collect::<Vec<u64>>());
}

#[tokio::test]
async fn get_failure_is_reported_with_op_and_cause() {
    let store = Arc::new(RecordingStore::failing_get("Simulated store connection error"));
    let err = counter(&store, IncrementMode::TwoStep).increment().await.unwrap_err();

    assert_eq!(err.op, StoreOp::Get);
    assert!(matches!(err.source, CounterError::Unavailable(_)));
    let text = err.to_string();
    assert!(text.contains("views/counter"), "{text}");
    assert!(text.contains("Simulated store connection error"), "{text}");
    // nothing written after a failed read
    assert_eq!(store.calls(), vec![Call::Get]);
}

#[tokio::test]
async fn non_numeric_count_fails_without_writing() {
    let key = DocumentKey::default();
    let store = Arc::new(RecordingStore::with_doc(&key, json!({"count": "seven"})));
    let err = counter(&store, IncrementMode::TwoStep).increment().await.unwrap_err();

    assert!(matches!(err.source, CounterError::Corrupt(_)));
    assert_eq!(store.calls(), vec![Call::Get]);
}

#[tokio::test]
async fn overflow_is_a_failure() {
    let key = DocumentKey::default();
    let store = Arc::new(RecordingStore::with_doc(&key, json!({"count": u64::MAX})));
    let err = counter(&store, IncrementMode::TwoStep).increment().await.unwrap_err();

    // reported against the read step; no write was attempted
    assert_eq!(err.op, StoreOp::Get);
    assert!(matches!(err.source, CounterError::Internal(_)));
    assert_eq!(store.calls(), vec![Call::Get]);
}

#[tokio::test]
async fn atomic_mode_uses_single_increment_call() {
    let store = Arc::new(RecordingStore::default());
    let counter = counter(&store, IncrementMode::Atomic);

    assert_eq!(counter.increment().await.unwrap(), 1);
    assert_eq!(counter.increment().await.unwrap(), 2);
    assert_eq!(store.calls(), vec![Call::Increment, Call::Increment]);
}

#[test]
fn mode_defaults_to_two_step() {
    assert_eq!(IncrementMode::default(), IncrementMode::TwoStep);
    assert_eq!(IncrementMode::default().as_str(), "two_step");
}
