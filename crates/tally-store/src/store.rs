//! Document persistence: the [`DocumentStore`] trait and its two
//! implementations.
//!
//! [`FileStore`] is the production store: one JSON file, whole-document
//! overwrite, atomic replace via a sibling temp file and rename so a failed
//! save never corrupts the prior on-disk state. [`MemoryStore`] is the
//! in-memory fake used by engine and handler tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::document::Document;
use crate::error::StoreError;

/// Load/save access to the single shared progress document.
///
/// `save` unconditionally stamps `metadata.lastUpdated` with the current
/// time before writing, mirroring the write path of the original tracker.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self) -> Result<Document, StoreError>;
    async fn save(&self, doc: &mut Document) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Production store: one pretty-printed JSON file at a fixed path.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize with 2-space indentation plus a trailing newline, the
    /// on-disk format of the original data file.
    fn render(doc: &Document) -> Result<String, serde_json::Error> {
        let mut out = serde_json::to_string_pretty(doc)?;
        out.push('\n');
        Ok(out)
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn load(&self) -> Result<Document, StoreError> {
        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| StoreError::Io {
                    op: "read",
                    path: self.path.clone(),
                    source,
                })?;

        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, doc: &mut Document) -> Result<(), StoreError> {
        doc.metadata.last_updated = Some(Utc::now());

        let contents = Self::render(doc).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        // Write to a sibling temp file, then rename into place. The rename
        // is atomic on the same filesystem, so readers see either the old
        // document or the new one, never a partial write.
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, contents.as_bytes())
            .await
            .map_err(|source| StoreError::Io {
                op: "write",
                path: tmp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                op: "replace",
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), "progress document saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-memory fake for tests. Holds one document behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<Document>,
}

impl MemoryStore {
    pub fn new(doc: Document) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self) -> Result<Document, StoreError> {
        Ok(self.doc.lock().await.clone())
    }

    async fn save(&self, doc: &mut Document) -> Result<(), StoreError> {
        doc.metadata.last_updated = Some(Utc::now());
        *self.doc.lock().await = doc.clone();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
