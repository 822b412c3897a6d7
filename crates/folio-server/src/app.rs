//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/config", get(handlers::config::get_config))
        .route("/api/blocks", get(handlers::blocks::list_definitions))
        .route(
            "/api/pages",
            get(handlers::pages::list_pages).post(handlers::pages::create_page),
        )
        .route(
            "/api/pages/{id}",
            get(handlers::pages::get_page)
                .patch(handlers::pages::update_page_meta)
                .put(handlers::pages::save_page)
                .delete(handlers::pages::delete_page),
        )
        .route("/api/pages/{id}/status", post(handlers::pages::change_status))
        .route("/api/pages/{id}/render", get(handlers::pages::render_page))
        .route("/api/pages/{id}/blocks", post(handlers::blocks::add_block))
        .route(
            "/api/pages/{id}/blocks/{block_id}",
            patch(handlers::blocks::update_block)
                .delete(handlers::blocks::remove_block),
        )
        .route(
            "/api/pages/{id}/blocks/{block_id}/move",
            post(handlers::blocks::move_block),
        );

    let page_routes = Router::new()
        .route("/preview/{id}", get(handlers::public::get_preview))
        .route("/{slug}", get(handlers::public::get_page));

    Router::new()
        .merge(api_routes)
        .merge(page_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer())
                .layer(security::referrer_policy_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use axum::response::Response;
    use folio_blocks::{BlockType, Document, SchemaRegistry};
    use folio_site::{Role, Session, Site, SiteSettings, User};
    use folio_storage::MockStorage;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn state(role: Option<Role>) -> Arc<AppState> {
        let site = Site::new(
            Arc::new(MockStorage::new()),
            Arc::new(SchemaRegistry::builtin()),
            SiteSettings::default(),
        );
        let session = role.map(|role| {
            Session::new(User {
                id: "u1".to_owned(),
                name: "Ada".to_owned(),
                email: "ada@example.com".to_owned(),
                role,
            })
        });
        Arc::new(AppState::new(site, session, "test".to_owned()))
    }

    async fn send(state: &Arc<AppState>, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        create_router(Arc::clone(state))
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn published_page(state: &AppState, title: &str) -> Document {
        let registry = Arc::clone(state.site.registry());
        let page = state.site.pages().create_page(title, None).unwrap();
        let (page, ()) = state
            .site
            .pages()
            .edit_page(page.id(), |doc| {
                doc.add_block(&registry, BlockType::Heading, None)?;
                doc.publish()
            })
            .unwrap();
        page
    }

    #[tokio::test]
    async fn test_public_page_is_served_with_security_headers() {
        let state = state(None);
        published_page(&state, "About");

        let response = send(&state, Method::GET, "/about", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert!(response.headers().contains_key("content-security-policy"));
        let html = body_text(response).await;
        assert!(html.contains("<title>About</title>"));
        assert!(html.contains("Your Heading Here"));
    }

    #[tokio::test]
    async fn test_draft_is_not_public() {
        let state = state(None);
        state.site.pages().create_page("Draft", None).unwrap();

        let response = send(&state, Method::GET, "/draft", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_preview_requires_editor_session() {
        let anonymous = state(None);
        let page = anonymous.site.pages().create_page("Draft", None).unwrap();
        let uri = format!("/preview/{}", page.id());

        let response = send(&anonymous, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let viewer = state(Some(Role::Viewer));
        let page = viewer.site.pages().create_page("Draft", None).unwrap();
        let uri = format!("/preview/{}", page.id());
        let response = send(&viewer, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let editor = state(Some(Role::Editor));
        let page = editor.site.pages().create_page("Draft", None).unwrap();
        let uri = format!("/preview/{}", page.id());
        let response = send(&editor, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Preview Mode"));
    }

    #[tokio::test]
    async fn test_page_api_hides_drafts_from_non_editors() {
        for role in [None, Some(Role::Viewer)] {
            let state = state(role);
            let page = state.site.pages().create_page("Draft", None).unwrap();

            let response = send(&state, Method::GET, "/api/pages", None).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);

            let uri = format!("/api/pages/{}", page.id());
            let response = send(&state, Method::GET, &uri, None).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }

        let editor = state(Some(Role::Editor));
        let page = editor.site.pages().create_page("Draft", None).unwrap();
        let response = send(&editor, Method::GET, &format!("/api/pages/{}", page.id()), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "draft");
    }

    #[tokio::test]
    async fn test_create_page_requires_editor() {
        let state = state(Some(Role::Viewer));

        let response = send(
            &state,
            Method::POST,
            "/api/pages",
            Some(json!({"title": "About"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_page_lifecycle() {
        let state = state(Some(Role::Admin));

        let response = send(
            &state,
            Method::POST,
            "/api/pages",
            Some(json!({"title": "About Us"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let page = body_json(response).await;
        assert_eq!(page["slug"], "about-us");
        assert_eq!(page["status"], "draft");
        let id = page["id"].as_str().unwrap().to_owned();

        let response = send(
            &state,
            Method::POST,
            &format!("/api/pages/{id}/blocks"),
            Some(json!({"type": "heading"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let added = body_json(response).await;
        assert_eq!(added["block"]["type"], "heading");

        let response = send(
            &state,
            Method::POST,
            &format!("/api/pages/{id}/status"),
            Some(json!({"action": "publish"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "published");

        let response = send(&state, Method::GET, "/about-us", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&state, Method::GET, "/api/pages?status=published", None).await;
        let pages = body_json(response).await;
        assert_eq!(pages.as_array().unwrap().len(), 1);

        let response = send(&state, Method::DELETE, &format!("/api/pages/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&state, Method::GET, &format!("/api/pages/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_transition_is_conflict() {
        let state = state(Some(Role::Editor));
        let page = state.site.pages().create_page("About", None).unwrap();

        let response = send(
            &state,
            Method::POST,
            &format!("/api/pages/{}/status", page.id()),
            Some(json!({"action": "archive"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_block_content_is_rejected() {
        let state = state(Some(Role::Editor));
        let registry = Arc::clone(state.site.registry());
        let page = state.site.pages().create_page("About", None).unwrap();
        let (_, block_id) = state
            .site
            .pages()
            .edit_page(page.id(), |doc| {
                doc.add_block(&registry, BlockType::Heading, None)
                    .map(folio_blocks::Block::id)
            })
            .unwrap();

        let response = send(
            &state,
            Method::PATCH,
            &format!("/api/pages/{}/blocks/{block_id}", page.id()),
            Some(json!({"text": "Welcome", "level": "h7"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["fields"][0]["key"], "level");

        let stored = state.site.pages().get_page(page.id()).unwrap();
        assert_eq!(stored.find_block(block_id).unwrap().text("text"), Some("Your Heading Here"));
    }

    #[tokio::test]
    async fn test_unknown_block_type_is_bad_request() {
        let state = state(Some(Role::Editor));
        let page = state.site.pages().create_page("About", None).unwrap();

        let response = send(
            &state,
            Method::POST,
            &format!("/api/pages/{}/blocks", page.id()),
            Some(json!({"type": "carousel"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_snapshot_save_discards_stale_revision() {
        let state = state(Some(Role::Editor));
        let page = state.site.pages().create_page("About", None).unwrap();
        let uri = format!("/api/pages/{}", page.id());

        let mut newer = page.clone();
        newer.set_title("About us");
        newer.set_title("About the team");
        let mut older = page.clone();
        older.set_title("Stale");

        let response = send(&state, Method::PUT, &uri, Some(serde_json::to_value(&newer).unwrap())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"outcome": "saved", "revision": newer.revision()})
        );

        let response = send(&state, Method::PUT, &uri, Some(serde_json::to_value(&older).unwrap())).await;
        assert_eq!(body_json(response).await["outcome"], "stale");

        let stored = state.site.pages().get_page(page.id()).unwrap();
        assert_eq!(stored.title(), "About the team");
    }

    #[tokio::test]
    async fn test_snapshot_save_cannot_change_status() {
        let state = state(Some(Role::Editor));
        let page = state.site.pages().create_page("About", None).unwrap();
        let uri = format!("/api/pages/{}", page.id());

        let mut snapshot = serde_json::to_value(&page).unwrap();
        snapshot["status"] = json!("archived");
        snapshot["revision"] = json!(1);

        let response = send(&state, Method::PUT, &uri, Some(snapshot)).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(state.site.pages().get_page(page.id()).unwrap(), page);
    }

    #[tokio::test]
    async fn test_snapshot_behind_block_edit_is_stale() {
        let state = state(Some(Role::Editor));
        let page = state.site.pages().create_page("About", None).unwrap();
        let uri = format!("/api/pages/{}", page.id());

        let response = send(
            &state,
            Method::POST,
            &format!("{uri}/blocks"),
            Some(json!({"type": "heading"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(&state, Method::PUT, &uri, Some(serde_json::to_value(&page).unwrap())).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"outcome": "stale", "revision": 0, "latest": 1})
        );
        let stored = state.site.pages().get_page(page.id()).unwrap();
        assert_eq!(stored.blocks().len(), 1);
    }

    #[tokio::test]
    async fn test_block_definitions_by_category() {
        let state = state(None);

        let response = send(&state, Method::GET, "/api/blocks?category=layout", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let definitions = body_json(response).await;
        let types: Vec<_> = definitions
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["category"].as_str().unwrap().to_owned())
            .collect();
        assert!(!types.is_empty());
        assert!(types.iter().all(|c| c == "layout"));

        let response = send(&state, Method::GET, "/api/blocks?category=bogus", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_render_tree_for_editor() {
        let state = state(Some(Role::Editor));
        let page = published_page(&state, "About");

        let response = send(&state, Method::GET, &format!("/api/pages/{}/render", page.id()), None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let nodes = body_json(response).await;
        assert_eq!(nodes[0]["type"], "heading");
    }
}
