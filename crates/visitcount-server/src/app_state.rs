//! Shared application state.
//!
//! Cheap to clone: everything lives behind `Arc`. The counter value itself is
//! never held here; each request goes to the store.

use std::sync::Arc;

use visitcount_core::error::Result;
use visitcount_core::{DocumentStore, VisitCounter};

use crate::config::ServiceConfig;
use crate::http::cors::CorsPolicy;
use crate::obs::ServiceMetrics;
use crate::store;

#[derive(Clone)]
pub struct AppState {
    counter: VisitCounter,
    cors: Arc<CorsPolicy>,
    metrics: Arc<ServiceMetrics>,
}

impl AppState {
    /// Open the configured store and build state from it.
    pub async fn from_config(cfg: &ServiceConfig) -> Result<Self> {
        let store = store::open(&cfg.store).await?;
        Ok(Self::with_store(cfg, store))
    }

    /// Build state around an already opened store (tests inject fakes here).
    pub fn with_store(cfg: &ServiceConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            counter: VisitCounter::new(store, cfg.counter.key(), cfg.counter.mode),
            cors: Arc::new(CorsPolicy::from_config(&cfg.cors)),
            metrics: Arc::new(ServiceMetrics::default()),
        }
    }

    pub fn counter(&self) -> &VisitCounter {
        &self.counter
    }

    pub fn cors(&self) -> Arc<CorsPolicy> {
        Arc::clone(&self.cors)
    }

    pub fn metrics(&self) -> Arc<ServiceMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }
}
