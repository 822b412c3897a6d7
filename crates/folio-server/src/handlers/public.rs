//! Public and preview page routes.
//!
//! Both return a complete HTML document. The public route only serves
//! published pages; the preview route serves any status to a session
//! allowed to preview.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use folio_renderer::escape_html;
use folio_site::SiteError;

use crate::error::ServerError;
use crate::handlers::parse_page_id;
use crate::state::AppState;

/// Handle GET /{slug}.
pub(crate) async fn get_page(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    match state.site.render_public(&slug) {
        Ok(page) => Ok((
            [(header::CACHE_CONTROL, "public, max-age=60")],
            Html(page.html),
        )
            .into_response()),
        Err(SiteError::NotFound(_)) => Ok(not_found(&slug)),
        Err(e) => Err(e.into()),
    }
}

/// Handle GET /preview/{id}.
pub(crate) async fn get_preview(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let id = parse_page_id(&id)?;
    let session = state.preview_session()?;
    let page = state.site.render_preview(id, session)?;

    Ok(([(header::CACHE_CONTROL, "no-store")], Html(page.html)).into_response())
}

fn not_found(slug: &str) -> Response {
    let body = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Page not found</title></head>\n<body><h1>Page not found</h1><p>No page at /{}</p></body>\n</html>\n",
        escape_html(slug)
    );
    (StatusCode::NOT_FOUND, Html(body)).into_response()
}
