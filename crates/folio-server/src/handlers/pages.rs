//! Pages API endpoints.
//!
//! Page CRUD, status transitions, full-snapshot saves from the editor and
//! the render tree for the editor canvas.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use folio_blocks::{Document, DocumentError};
use folio_renderer::RenderNode;
use folio_site::{PageMetaUpdate, PageQuery, SaveOutcome};
use folio_storage::DocumentSummary;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::handlers::parse_page_id;
use crate::state::AppState;

/// Request body for POST /api/pages.
#[derive(Deserialize)]
pub(crate) struct CreatePageRequest {
    title: String,
    /// Derived from the title when absent.
    #[serde(default)]
    slug: Option<String>,
}

/// Status transition requested by POST /api/pages/{id}/status.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StatusAction {
    Publish,
    Unpublish,
    Archive,
    Restore,
}

#[derive(Deserialize)]
pub(crate) struct StatusRequest {
    action: StatusAction,
}

/// Response for PUT /api/pages/{id}.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub(crate) enum SaveResponse {
    Saved { revision: u64 },
    Queued { revision: u64 },
    Stale { revision: u64, latest: u64 },
}

impl From<SaveOutcome> for SaveResponse {
    fn from(outcome: SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Saved { revision } => Self::Saved { revision },
            SaveOutcome::Queued { revision } => Self::Queued { revision },
            SaveOutcome::Stale { revision, latest } => Self::Stale { revision, latest },
        }
    }
}

/// Handle GET /api/pages.
pub(crate) async fn list_pages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<DocumentSummary>>, ServerError> {
    state.require_preview()?;
    Ok(Json(state.site.pages().list_pages(&query)?))
}

/// Handle POST /api/pages.
pub(crate) async fn create_page(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePageRequest>,
) -> Result<impl IntoResponse, ServerError> {
    state.require_editor()?;
    let page = state
        .site
        .pages()
        .create_page(&request.title, request.slug.as_deref())?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// Handle GET /api/pages/{id}.
pub(crate) async fn get_page(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Document>, ServerError> {
    state.require_preview()?;
    let id = parse_page_id(&id)?;
    Ok(Json(state.site.pages().get_page(id)?))
}

/// Handle PATCH /api/pages/{id}.
pub(crate) async fn update_page_meta(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<PageMetaUpdate>,
) -> Result<Json<Document>, ServerError> {
    state.require_editor()?;
    let id = parse_page_id(&id)?;
    Ok(Json(state.site.pages().update_page_meta(id, update)?))
}

/// Handle PUT /api/pages/{id}.
///
/// Stores a full page snapshot. A snapshot behind the stored page is
/// reported as stale and not written; status changes are rejected.
pub(crate) async fn save_page(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(document): Json<Document>,
) -> Result<Json<SaveResponse>, ServerError> {
    state.require_editor()?;
    let id = parse_page_id(&id)?;
    if document.id() != id {
        return Err(ServerError::BadRequest(format!(
            "body is page {}, not {id}",
            document.id()
        )));
    }
    let outcome = state
        .site
        .pages()
        .save_snapshot(state.site.registry(), document)?;
    Ok(Json(outcome.into()))
}

/// Handle DELETE /api/pages/{id}.
pub(crate) async fn delete_page(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ServerError> {
    state.require_editor()?;
    let id = parse_page_id(&id)?;
    state.site.pages().delete_page(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle POST /api/pages/{id}/status.
pub(crate) async fn change_status(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Document>, ServerError> {
    state.require_editor()?;
    let id = parse_page_id(&id)?;
    let transition: fn(&mut Document) -> Result<(), DocumentError> = match request.action {
        StatusAction::Publish => Document::publish,
        StatusAction::Unpublish => Document::unpublish,
        StatusAction::Archive => Document::archive,
        StatusAction::Restore => Document::restore,
    };
    let (page, ()) = state.site.pages().edit_page(id, transition)?;
    tracing::info!(page_id = %id, status = %page.status(), "Changed page status");
    Ok(Json(page))
}

/// Handle GET /api/pages/{id}/render.
///
/// Returns the render tree of a page of any status, for the editor canvas.
pub(crate) async fn render_page(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RenderNode>>, ServerError> {
    let id = parse_page_id(&id)?;
    let session = state.preview_session()?;
    let page = state.site.resolve_preview(id, session)?;
    Ok(Json(state.site.renderer().render(&page)))
}
