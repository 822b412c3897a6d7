//! CLI error types.

use folio_blocks::SchemaError;
use folio_config::ConfigError;
use folio_site::{SessionError, SiteError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Validation(String),
}
