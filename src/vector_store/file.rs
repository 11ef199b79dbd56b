//! JSON file-backed vector store.

use super::{DocumentStore, VectorStoreDocument};
use crate::error::{GanjError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// Vector store persisted as a single JSON document.
///
/// The first successful [`DocumentStore::load`] is cached for the lifetime of the
/// store. Failed loads are not cached, so a later call may still succeed.
pub struct JsonFileStore {
    path: PathBuf,
    cache: OnceCell<Arc<VectorStoreDocument>>,
}

impl JsonFileStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceCell::new(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole document, replacing any existing file.
    #[instrument(skip(self, document), fields(path = %self.path.display(), chunks = document.total_chunks))]
    pub async fn save(&self, document: &VectorStoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(document)?;
        tokio::fs::write(&self.path, content).await?;

        info!("Saved {} chunks", document.total_chunks);
        Ok(())
    }

    /// Read and parse the backing file without touching the cache.
    pub async fn read(&self) -> Result<VectorStoreDocument> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            GanjError::VectorStore(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let document: VectorStoreDocument = serde_json::from_str(&content)?;
        Ok(document)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self) -> Option<Arc<VectorStoreDocument>> {
        let loaded = self
            .cache
            .get_or_try_init(|| async {
                let document = self.read().await?;
                debug!(
                    "Loaded vector store with {} chunks (embeddings: {})",
                    document.chunks.len(),
                    document.has_embeddings
                );
                Ok::<_, GanjError>(Arc::new(document))
            })
            .await;

        match loaded {
            Ok(document) => Some(document.clone()),
            Err(e) => {
                warn!("Vector store unavailable: {}", e);
                None
            }
        }
    }
}
