use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::event::{DocumentChanged, StoreEvents};
use crate::storage::{DocumentIndex, DocumentRef, DocumentStore, Error, Result};

/// Documents kept in memory.
///
/// Behaves like a vault for reads and writes. Writes to documents marked with
/// [`MemoryStore::reject_writes_to`] fail without changing anything.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<DocumentRef, String>>,
    rejected: RwLock<HashSet<DocumentRef>>,
    writes: AtomicUsize,
    pub on: StoreEvents,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a document without counting as a write.
    pub async fn insert(&self, document: DocumentRef, content: impl Into<String>) {
        self.documents.write().await.insert(document, content.into());
    }

    pub async fn get(&self, document: &DocumentRef) -> Option<String> {
        self.documents.read().await.get(document).cloned()
    }

    pub async fn reject_writes_to(&self, document: DocumentRef) {
        self.rejected.write().await.insert(document);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, document: &DocumentRef) -> Result<String> {
        self.get(document)
            .await
            .ok_or_else(|| Error::DocumentNotFound(document.to_string()))
    }

    async fn write(&self, document: &DocumentRef, content: &str) -> Result<()> {
        if self.rejected.read().await.contains(document) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("write to {} rejected", document),
            )));
        }

        self.documents.write().await.insert(document.clone(), content.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.on.document_changed.dispatch(&DocumentChanged {
            document: document.clone(),
            content: content.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl DocumentIndex for MemoryStore {
    async fn list_documents(&self) -> Result<Vec<DocumentRef>> {
        let mut documents: Vec<DocumentRef> = self.documents.read().await.keys().cloned().collect();
        documents.sort();
        Ok(documents)
    }
}
