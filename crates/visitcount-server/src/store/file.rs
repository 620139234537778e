//! JSON-file document store.
//!
//! Layout: `<root>/<collection>/<document>.json`, one JSON object per file.
//! Writes land in a sibling temp file that is fsynced before being renamed into
//! place, and the directory is fsynced after the rename. Readers never observe
//! a half-written document, and a crash leaves either the old or the new
//! content. A leftover `.json.tmp` is never read. All writers share one async
//! mutex; `update` and `increment` read and write under it.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use visitcount_core::error::{CounterError, Result};
use visitcount_core::{read_count_field, DocumentKey, DocumentStore, Fields};

#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create the root directory up front so a bad path fails at startup.
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))
    }

    fn doc_path(&self, key: &DocumentKey) -> PathBuf {
        self.root
            .join(&key.collection)
            .join(format!("{}.json", key.document))
    }

    async fn read_doc(&self, key: &DocumentKey) -> Result<Option<Fields>> {
        let path = self.doc_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };
        let fields: Fields = serde_json::from_slice(&bytes)
            .map_err(|e| CounterError::Corrupt(format!("{}: {e}", path.display())))?;
        Ok(Some(fields))
    }

    async fn write_doc(&self, key: &DocumentKey, fields: &Fields) -> Result<()> {
        let path = self.doc_path(key);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error(dir, e))?;
        }

        let body = serde_json::to_vec(fields)
            .map_err(|e| CounterError::Internal(format!("encode {key}: {e}")))?;
        let tmp = path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        file.write_all(&body).await.map_err(|e| io_error(&tmp, e))?;
        file.sync_all().await.map_err(|e| io_error(&tmp, e))?;
        drop(file);

        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;
        if let Some(dir) = path.parent() {
            sync_dir(dir).await?;
        }
        Ok(())
    }
}

/// Persist a rename by fsyncing the containing directory.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> Result<()> {
    let handle = tokio::fs::File::open(dir)
        .await
        .map_err(|e| io_error(dir, e))?;
    handle.sync_all().await.map_err(|e| io_error(dir, e))
}

// Directories cannot be opened as files here; rename is already durable.
#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

fn io_error(path: &Path, e: io::Error) -> CounterError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => {
            CounterError::PermissionDenied(format!("{}: {e}", path.display()))
        }
        _ => CounterError::Unavailable(format!("{}: {e}", path.display())),
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get(&self, key: &DocumentKey) -> Result<Option<Fields>> {
        self.read_doc(key).await
    }

    async fn set(&self, key: &DocumentKey, fields: Fields) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_doc(key, &fields).await
    }

    async fn update(&self, key: &DocumentKey, partial: Fields) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self
            .read_doc(key)
            .await?
            .ok_or_else(|| CounterError::NotFound(key.to_string()))?;
        doc.extend(partial);
        self.write_doc(key, &doc).await
    }

    async fn increment(&self, key: &DocumentKey, field: &str, delta: u64) -> Result<u64> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read_doc(key).await?.unwrap_or_default();
        let next = read_count_field(&doc, field)?
            .checked_add(delta)
            .ok_or_else(|| CounterError::Internal(format!("{field} overflow")))?;
        doc.insert(field.to_string(), Value::from(next));
        self.write_doc(key, &doc).await?;
        Ok(next)
    }
}
