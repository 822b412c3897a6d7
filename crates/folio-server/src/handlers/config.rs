//! Config API endpoint.
//!
//! Returns site settings and what the current session may do.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use folio_site::User;
use serde::Serialize;

use crate::state::AppState;

/// Response for GET /api/config.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigResponse {
    /// Site name.
    site_name: String,
    /// Page language.
    language: String,
    /// Signed-in user, if any.
    user: Option<User>,
    /// Whether the session may preview unpublished pages.
    can_preview: bool,
    /// Whether the session may modify pages.
    can_edit: bool,
    /// Application version.
    version: String,
}

/// Handle GET /api/config.
pub(crate) async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let settings = state.site.settings();
    let session = state.session.as_ref();
    Json(ConfigResponse {
        site_name: settings.name.clone(),
        language: settings.language.clone(),
        user: session.map(|s| s.user.clone()),
        can_preview: session.is_some_and(folio_site::Session::can_preview),
        can_edit: session.is_some_and(folio_site::Session::can_edit),
        version: state.version.clone(),
    })
}
