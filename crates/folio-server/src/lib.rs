//! HTTP server for Folio.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - Public pages at `/{slug}` (published pages only)
//! - Previews at `/preview/{id}` (any status, for an admin or editor session)
//! - A JSON API for the editor under `/api`
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use folio_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         data_dir: PathBuf::from("data/pages"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (folio-server)
//!                        │
//!                        ├─► /{slug}, /preview/{id} ──► Site (resolve + render HTML)
//!                        │
//!                        └─► /api/* ──► PageRepository / SaveCoordinator
//!                                            │
//!                                            └─► Storage (JSON files)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use folio_blocks::SchemaRegistry;
use folio_site::{Session, Site, SiteSettings};
use folio_storage::{FsStorage, Storage};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding one JSON file per page.
    pub data_dir: PathBuf,
    /// Session file (`None` disables preview and editing).
    pub session_file: Option<PathBuf>,
    /// Site settings for the page head.
    pub site: SiteSettings,
    /// Application version, reported by `/api/config`.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            data_dir: PathBuf::from("data/pages"),
            session_file: None,
            site: SiteSettings::default(),
            version: String::new(),
        }
    }
}

/// Run the server.
///
/// # Errors
///
/// Returns an error if the session file cannot be loaded or the server fails
/// to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let session = config
        .session_file
        .as_deref()
        .map(Session::load)
        .transpose()?;
    match &session {
        Some(session) => {
            tracing::info!(user = %session.user.id, role = %session.user.role, "Session loaded");
        }
        None => tracing::info!("No session configured, preview and editing are disabled"),
    }

    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(config.data_dir.clone()));
    let registry = Arc::new(SchemaRegistry::builtin());
    let site = Site::new(Arc::clone(&storage), registry, config.site.clone());

    let state = Arc::new(AppState::new(site, session, config.version.clone()));
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, data_dir = %config.data_dir.display(), "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Folio config.
#[must_use]
pub fn server_config_from_config(config: &folio_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        data_dir: config.storage_resolved.data_dir.clone(),
        session_file: config.session_resolved.file.clone(),
        site: site_settings_from_config(config),
        version,
    }
}

/// Site settings from the `[site]` section.
#[must_use]
pub fn site_settings_from_config(config: &folio_config::Config) -> SiteSettings {
    SiteSettings {
        name: config.site.name.clone(),
        description: config.site.description.clone(),
        url: config.site.url.clone(),
        language: config.site.language.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_server_config_from_config() {
        let mut config = folio_config::Config::default();
        config.server.host = "0.0.0.0".to_owned();
        config.server.port = 9000;
        config.storage_resolved.data_dir = PathBuf::from("/srv/pages");
        config.session_resolved.file = Some(PathBuf::from("/srv/session.json"));
        config.site.name = "Acme".to_owned();

        let server = server_config_from_config(&config, "1.2.3".to_owned());

        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 9000);
        assert_eq!(server.data_dir, Path::new("/srv/pages"));
        assert_eq!(server.session_file.as_deref(), Some(Path::new("/srv/session.json")));
        assert_eq!(server.site.name, "Acme");
        assert_eq!(server.version, "1.2.3");
    }
}
