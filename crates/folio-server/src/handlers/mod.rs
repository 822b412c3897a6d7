//! HTTP request handlers.

pub(crate) mod blocks;
pub(crate) mod config;
pub(crate) mod pages;
pub(crate) mod public;

use folio_blocks::{BlockId, DocumentId};

use crate::error::ServerError;

/// Parse a page id from a path segment.
pub(crate) fn parse_page_id(raw: &str) -> Result<DocumentId, ServerError> {
    raw.parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid page id: {raw}")))
}

/// Parse a block id from a path segment.
pub(crate) fn parse_block_id(raw: &str) -> Result<BlockId, ServerError> {
    raw.parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid block id: {raw}")))
}
