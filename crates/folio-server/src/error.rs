//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_blocks::DocumentError;
use folio_site::SiteError;
use folio_storage::StorageErrorKind;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Error from the page repository or site.
    #[error(transparent)]
    Site(#[from] SiteError),

    /// Malformed request (bad id, unknown block type, mismatched body).
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<DocumentError> for ServerError {
    fn from(err: DocumentError) -> Self {
        Self::Site(SiteError::Document(err))
    }
}

impl From<folio_storage::StorageError> for ServerError {
    fn from(err: folio_storage::StorageError) -> Self {
        Self::Site(SiteError::Storage(err))
    }
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Site(err) => match err {
                SiteError::NotFound(_) => StatusCode::NOT_FOUND,
                SiteError::Forbidden(_) => StatusCode::FORBIDDEN,
                SiteError::SlugTaken(_) => StatusCode::CONFLICT,
                SiteError::InvalidSlug(_) => StatusCode::BAD_REQUEST,
                SiteError::Document(doc) => match doc {
                    DocumentError::BlockNotFound(_) => StatusCode::NOT_FOUND,
                    DocumentError::InvalidTransition { .. } | DocumentError::DuplicateBlockId(_) => {
                        StatusCode::CONFLICT
                    }
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                },
                SiteError::Storage(e) => match e.kind {
                    StorageErrorKind::NotFound => StatusCode::NOT_FOUND,
                    StorageErrorKind::Unavailable | StorageErrorKind::Timeout => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                },
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = match &self {
            Self::Site(SiteError::Document(DocumentError::Validation(errors))) => {
                let fields: Vec<_> = errors
                    .iter()
                    .map(|e| json!({"key": e.key, "reason": e.reason.to_string()}))
                    .collect();
                json!({"error": "Invalid content", "fields": fields})
            }
            Self::Site(SiteError::NotFound(id)) => json!({"error": "Page not found", "page": id}),
            _ => json!({"error": self.to_string()}),
        };

        (status, axum::Json(body)).into_response()
    }
}
