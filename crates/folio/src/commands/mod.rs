//! CLI command implementations.

pub(crate) mod block;
pub(crate) mod blocks;
pub(crate) mod page;
pub(crate) mod render;
pub(crate) mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use folio_blocks::{Document, DocumentId, SchemaRegistry};
use folio_config::{CliSettings, Config};
use folio_server::site_settings_from_config;
use folio_site::{Site, SiteError};
use folio_storage::FsStorage;

use crate::error::CliError;

pub(crate) use block::BlockCommand;
pub(crate) use blocks::BlocksArgs;
pub(crate) use page::PageCommand;
pub(crate) use render::RenderArgs;
pub(crate) use serve::ServeArgs;

/// Options shared by every command that opens the page store.
#[derive(Args)]
pub(crate) struct StoreArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page data directory (overrides config).
    #[arg(long, env = "FOLIO_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

impl StoreArgs {
    /// Load configuration, applying `session_file` as an override.
    pub(crate) fn load_config(&self, session_file: Option<PathBuf>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            data_dir: self.data_dir.clone(),
            session_file,
            ..CliSettings::default()
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }

    /// Open the site over the configured file store.
    pub(crate) fn open(&self) -> Result<Site, CliError> {
        let config = self.load_config(None)?;
        Ok(open_site(&config))
    }
}

/// Build a [`Site`] over the file store named by `config`.
pub(crate) fn open_site(config: &Config) -> Site {
    tracing::debug!(data_dir = %config.storage_resolved.data_dir.display(), "Opening page store");
    let storage = Arc::new(FsStorage::new(config.storage_resolved.data_dir.clone()));
    let registry = Arc::new(SchemaRegistry::builtin());
    Site::new(storage, registry, site_settings_from_config(config))
}

/// Find a page by id or, failing that, by slug.
pub(crate) fn find_page(site: &Site, page: &str) -> Result<Document, CliError> {
    if let Ok(id) = page.parse::<DocumentId>() {
        return Ok(site.pages().get_page(id)?);
    }
    tracing::debug!(slug = page, "Looking up page by slug");
    site.pages()
        .find_by_slug(page)?
        .ok_or_else(|| SiteError::NotFound(page.to_owned()).into())
}
