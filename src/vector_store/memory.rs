//! In-memory document store.
//!
//! Useful for testing and for serving a document built in the same process.

use super::{DocumentStore, VectorStoreDocument};
use async_trait::async_trait;
use std::sync::Arc;

/// Store holding an already-built document (or none at all).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: Option<Arc<VectorStoreDocument>>,
}

impl MemoryStore {
    /// Create a store serving `document`.
    pub fn new(document: VectorStoreDocument) -> Self {
        Self {
            document: Some(Arc::new(document)),
        }
    }

    /// Create a store with no document, as if loading had failed.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self) -> Option<Arc<VectorStoreDocument>> {
        self.document.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new(VectorStoreDocument::new(Vec::new(), 0, false));
        let document = store.load().await.unwrap();
        assert_eq!(document.total_chunks, 0);

        assert!(MemoryStore::empty().load().await.is_none());
    }
}
