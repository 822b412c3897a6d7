//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use folio_blocks::{Document, DocumentId};

use crate::storage::{DocumentSummary, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores pages in memory. Use the builder methods to seed pages and to
/// make saves fail.
///
/// # Example
///
/// ```ignore
/// use folio_blocks::Document;
/// use folio_storage::{MockStorage, Storage};
///
/// let page = Document::new("Home", "home").unwrap();
/// let storage = MockStorage::new().with_document(page.clone());
///
/// assert_eq!(storage.load(page.id()).unwrap(), page);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    documents: RwLock<HashMap<DocumentId, Document>>,
    save_failure: RwLock<Option<StorageErrorKind>>,
    saves: AtomicUsize,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_document(self, document: Document) -> Self {
        self.documents
            .write()
            .unwrap()
            .insert(document.id(), document);
        self
    }

    /// Make every subsequent save fail with `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_save_failure(self, kind: StorageErrorKind) -> Self {
        self.set_save_failure(Some(kind));
        self
    }

    /// Change save failure injection at runtime.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_save_failure(&self, kind: Option<StorageErrorKind>) {
        *self.save_failure.write().unwrap() = kind;
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Number of stored pages.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    /// Whether no pages are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MockStorage {
    fn load(&self, id: DocumentId) -> Result<Document, StorageError> {
        self.documents
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(id).with_backend(BACKEND))
    }

    fn save(&self, document: &Document) -> Result<(), StorageError> {
        if let Some(kind) = *self.save_failure.read().unwrap() {
            return Err(StorageError::new(kind)
                .with_id(document.id())
                .with_backend(BACKEND));
        }
        self.documents
            .write()
            .unwrap()
            .insert(document.id(), document.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self, id: DocumentId) -> Result<(), StorageError> {
        self.documents
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(id).with_backend(BACKEND))
    }

    fn list(&self) -> Result<Vec<DocumentSummary>, StorageError> {
        Ok(self
            .documents
            .read()
            .unwrap()
            .values()
            .map(DocumentSummary::from)
            .collect())
    }
}
