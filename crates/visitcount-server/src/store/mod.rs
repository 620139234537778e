//! Document store backends.

pub mod file;
pub mod memory;

use std::sync::Arc;

use visitcount_core::error::Result;
use visitcount_core::DocumentStore;

use crate::config::{StoreBackend, StoreSection};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Build the configured backend.
pub async fn open(cfg: &StoreSection) -> Result<Arc<dyn DocumentStore>> {
    match cfg.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::File => {
            let store = FileStore::new(&cfg.path);
            store.ensure_root().await?;
            Ok(Arc::new(store))
        }
    }
}
