//! Site error type.

use folio_blocks::{DocumentError, DocumentId};
use folio_storage::StorageError;

/// Error returned by page repository and site operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// No page matches the id or slug (or it is not visible on this path).
    #[error("Page not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Slug already in use: {0}")]
    SlugTaken(String),
    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),
    /// The session may not perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),
}

impl SiteError {
    /// Map a storage error for `id`, turning a missing page into [`SiteError::NotFound`].
    pub(crate) fn from_load(id: DocumentId, err: StorageError) -> Self {
        if err.is_not_found() {
            Self::NotFound(id.to_string())
        } else {
            Self::Storage(err)
        }
    }
}
