//! Block API endpoints.
//!
//! The block palette plus block-level edits on a page. Every edit loads the
//! page, applies one document operation and saves it; nothing is saved when
//! the operation fails.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use folio_blocks::{
    Block, BlockDefinition, BlockId, BlockType, Category, Content, Document, DocumentError,
    SchemaError, UpdateMode,
};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::handlers::{parse_block_id, parse_page_id};
use crate::state::AppState;

#[derive(Deserialize)]
pub(crate) struct DefinitionsQuery {
    category: Option<String>,
}

/// Request body for POST /api/pages/{id}/blocks.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddBlockRequest {
    #[serde(rename = "type")]
    block_type: String,
    /// Position among siblings; appended when absent.
    #[serde(default)]
    index: Option<usize>,
    /// Container to add the block to; top level when absent.
    #[serde(default)]
    parent_id: Option<BlockId>,
}

#[derive(Deserialize)]
pub(crate) struct MoveBlockRequest {
    index: usize,
}

/// Response for block edits.
#[derive(Serialize)]
pub(crate) struct BlockResponse {
    block: Block,
    /// Page revision after the edit.
    revision: u64,
}

/// Handle GET /api/blocks.
pub(crate) async fn list_definitions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DefinitionsQuery>,
) -> Result<Json<Vec<BlockDefinition>>, ServerError> {
    let category = query
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    let definitions = state
        .site
        .registry()
        .list_definitions(category)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(definitions))
}

/// Handle POST /api/pages/{id}/blocks.
pub(crate) async fn add_block(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddBlockRequest>,
) -> Result<impl IntoResponse, ServerError> {
    state.require_editor()?;
    let id = parse_page_id(&id)?;
    let block_type: BlockType = request
        .block_type
        .parse()
        .map_err(|e: SchemaError| ServerError::BadRequest(e.to_string()))?;

    let registry = Arc::clone(state.site.registry());
    let (page, block) = state.site.pages().edit_page(id, |doc| match request.parent_id {
        Some(parent) => doc
            .add_child_block(&registry, parent, block_type, request.index)
            .cloned(),
        None => doc.add_block(&registry, block_type, request.index).cloned(),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(BlockResponse {
            block,
            revision: page.revision(),
        }),
    ))
}

/// Handle PATCH /api/pages/{id}/blocks/{block_id}.
///
/// Merges the body into the block's content. Nothing is applied if any
/// field is invalid.
pub(crate) async fn update_block(
    Path((id, block_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(updates): Json<Content>,
) -> Result<Json<BlockResponse>, ServerError> {
    state.require_editor()?;
    let id = parse_page_id(&id)?;
    let block_id = parse_block_id(&block_id)?;

    let registry = Arc::clone(state.site.registry());
    let (page, ()) = state.site.pages().edit_page(id, |doc| {
        doc.update_block_content_with(&registry, block_id, updates, UpdateMode::AllOrNothing)
    })?;

    let block = page
        .find_block(block_id)
        .cloned()
        .ok_or(DocumentError::BlockNotFound(block_id))?;
    Ok(Json(BlockResponse {
        block,
        revision: page.revision(),
    }))
}

/// Handle POST /api/pages/{id}/blocks/{block_id}/move.
pub(crate) async fn move_block(
    Path((id, block_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<MoveBlockRequest>,
) -> Result<Json<Document>, ServerError> {
    state.require_editor()?;
    let id = parse_page_id(&id)?;
    let block_id = parse_block_id(&block_id)?;

    let (page, ()) = state
        .site
        .pages()
        .edit_page(id, |doc| doc.move_block(block_id, request.index))?;
    Ok(Json(page))
}

/// Handle DELETE /api/pages/{id}/blocks/{block_id}.
pub(crate) async fn remove_block(
    Path((id, block_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ServerError> {
    state.require_editor()?;
    let id = parse_page_id(&id)?;
    let block_id = parse_block_id(&block_id)?;

    state
        .site
        .pages()
        .edit_page(id, |doc| doc.remove_block(block_id))?;
    Ok(StatusCode::NO_CONTENT)
}
