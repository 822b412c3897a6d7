//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for persisting pages by id, along
//! with [`StorageError`] for unified error handling across backends.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use folio_blocks::{Document, DocumentId, PageStatus};
use serde::Serialize;

/// Page listing entry returned by [`Storage::list`].
///
/// Carries enough metadata to filter and sort pages without loading their
/// block trees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    pub slug: String,
    pub status: PageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id(),
            title: doc.title().to_owned(),
            slug: doc.slug().to_owned(),
            status: doc.status(),
            created_at: doc.created_at(),
            updated_at: doc.updated_at(),
        }
    }
}

/// Semantic error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Page does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Resource already exists.
    AlreadyExists,
    /// Stored data could not be decoded or breaks document invariants.
    InvalidData,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance.
#[derive(Debug, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    /// Don't retry (not found, corrupt data).
    #[default]
    Permanent,
    /// Retry immediately (timeout, interrupted write).
    Temporary,
    /// Retry with backoff (backend unavailable).
    Persistent,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Retry guidance.
    pub status: ErrorStatus,
    /// Page the operation targeted (if applicable).
    pub id: Option<DocumentId>,
    /// Backend location (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            id: None,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach the page id.
    #[must_use]
    pub fn with_id(mut self, id: DocumentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error for a page.
    #[must_use]
    pub fn not_found(id: DocumentId) -> Self {
        Self::new(StorageErrorKind::NotFound).with_id(id)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => StorageErrorKind::AlreadyExists,
            std::io::ErrorKind::TimedOut => StorageErrorKind::Timeout,
            std::io::ErrorKind::InvalidData => StorageErrorKind::InvalidData,
            _ => StorageErrorKind::Other,
        };
        let status = match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted => {
                ErrorStatus::Temporary
            }
            _ => ErrorStatus::Permanent,
        };
        let mut error = Self::new(kind).with_status(status).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }

    /// Whether the error means the page does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (page: id) (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::AlreadyExists => "Already exists",
            StorageErrorKind::InvalidData => "Invalid data",
            StorageErrorKind::Unavailable => "Unavailable",
            StorageErrorKind::Timeout => "Timeout",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(id) = &self.id {
            write!(f, " (page: {id})")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Storage abstraction for pages.
///
/// A saved page loads back with every block field and the relative order
/// of every sibling sequence unchanged. Implementations must be safe to
/// share between threads.
pub trait Storage: Send + Sync {
    /// Load a page by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if no page has this id, and
    /// [`StorageErrorKind::InvalidData`] if the stored page cannot be decoded
    /// or its block tree is inconsistent.
    fn load(&self, id: DocumentId) -> Result<Document, StorageError>;

    /// Create or replace a page.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the page cannot be written.
    fn save(&self, document: &Document) -> Result<(), StorageError>;

    /// Delete a page.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if no page has this id.
    fn delete(&self, id: DocumentId) -> Result<(), StorageError>;

    /// Summaries of all stored pages, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be enumerated.
    fn list(&self) -> Result<Vec<DocumentSummary>, StorageError>;

    /// Check if a page exists.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, id: DocumentId) -> bool {
        self.load(id).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_summary_from_document() {
        let mut doc = Document::new("About us", "about-us").unwrap();
        doc.publish().unwrap();

        let summary = DocumentSummary::from(&doc);

        assert_eq!(summary.id, doc.id());
        assert_eq!(summary.title, "About us");
        assert_eq!(summary.slug, "about-us");
        assert_eq!(summary.status, PageStatus::Published);
        assert_eq!(summary.updated_at, doc.updated_at());
    }

    #[test]
    fn test_storage_error_new() {
        let err = StorageError::new(StorageErrorKind::NotFound);

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.status, ErrorStatus::Permanent);
        assert!(err.id.is_none());
        assert!(err.path.is_none());
        assert!(err.backend.is_none());
    }

    #[test]
    fn test_storage_error_with_path() {
        let err = StorageError::new(StorageErrorKind::NotFound).with_path("/data/a.json");

        assert_eq!(err.path.as_deref(), Some(Path::new("/data/a.json")));
    }

    #[test]
    fn test_storage_error_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = StorageError::new(StorageErrorKind::NotFound).with_source(io_err);

        assert!(err.downcast_source::<std::io::Error>().is_some());
    }

    #[test]
    fn test_storage_error_not_found() {
        let id = DocumentId::new();
        let err = StorageError::not_found(id);

        assert!(err.is_not_found());
        assert_eq!(err.id, Some(id));
    }

    #[test]
    fn test_storage_error_io_kinds() {
        let cases = [
            (std::io::ErrorKind::NotFound, StorageErrorKind::NotFound),
            (
                std::io::ErrorKind::PermissionDenied,
                StorageErrorKind::PermissionDenied,
            ),
            (std::io::ErrorKind::InvalidData, StorageErrorKind::InvalidData),
            (std::io::ErrorKind::Other, StorageErrorKind::Other),
        ];

        for (io_kind, expected) in cases {
            let err = StorageError::io(std::io::Error::new(io_kind, "boom"), None);
            assert_eq!(err.kind, expected);
            assert_eq!(err.status, ErrorStatus::Permanent);
        }
    }

    #[test]
    fn test_storage_error_io_timeout_is_temporary() {
        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = StorageError::io(io_err, Some(PathBuf::from("/data")));

        assert_eq!(err.kind, StorageErrorKind::Timeout);
        assert_eq!(err.status, ErrorStatus::Temporary);
        assert_eq!(err.path.as_deref(), Some(Path::new("/data")));
    }

    #[test]
    fn test_storage_error_display_simple() {
        let err = StorageError::new(StorageErrorKind::NotFound);

        assert_eq!(err.to_string(), "Not found");
    }

    #[test]
    fn test_storage_error_display_full() {
        let id: DocumentId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = StorageError::new(StorageErrorKind::NotFound)
            .with_backend("Fs")
            .with_id(id)
            .with_path("/data/a.json")
            .with_source(io_err);

        assert_eq!(
            err.to_string(),
            "[Fs] Not found: file not found \
             (page: 67e55044-10b1-426f-9247-bb680e5fe0c8) (path: /data/a.json)"
        );
    }

    #[test]
    fn test_storage_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StorageError>();
    }

    #[test]
    fn test_error_status_default() {
        assert_eq!(ErrorStatus::default(), ErrorStatus::Permanent);
    }
}
