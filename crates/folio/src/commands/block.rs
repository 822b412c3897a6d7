//! `folio block` subcommand group.

use std::sync::Arc;

use clap::{Args, Subcommand};
use folio_blocks::{BlockId, BlockType, Content, UpdateMode};
use serde_json::Value;

use crate::commands::{StoreArgs, find_page};
use crate::error::CliError;
use crate::output::Output;

/// Block editing commands.
#[derive(Subcommand)]
pub(crate) enum BlockCommand {
    /// Add a block with its default content.
    Add(AddArgs),
    /// Move a block to a new position among its siblings.
    Move(MoveArgs),
    /// Remove a block and its children.
    Remove(BlockRef),
    /// Set content fields (`key=value`; values are parsed as JSON when possible).
    Set(SetArgs),
}

#[derive(Args)]
pub(crate) struct AddArgs {
    /// Page id or slug.
    page: String,

    /// Block type (see `folio blocks`).
    block_type: String,

    /// Position among siblings (default: last).
    #[arg(long)]
    index: Option<usize>,

    /// Container block to add into.
    #[arg(long)]
    parent: Option<String>,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args)]
pub(crate) struct MoveArgs {
    /// Page id or slug.
    page: String,

    /// Block id.
    block: String,

    /// New position among siblings.
    index: usize,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args)]
pub(crate) struct BlockRef {
    /// Page id or slug.
    page: String,

    /// Block id.
    block: String,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args)]
pub(crate) struct SetArgs {
    /// Page id or slug.
    page: String,

    /// Block id.
    block: String,

    /// Fields to set, as `key=value`.
    #[arg(required = true)]
    fields: Vec<String>,

    /// Apply valid fields even if others are rejected.
    #[arg(long)]
    partial: bool,

    #[command(flatten)]
    store: StoreArgs,
}

impl BlockCommand {
    /// Execute the block subcommand.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Add(args) => args.execute(),
            Self::Move(args) => args.execute(),
            Self::Remove(args) => args.execute(),
            Self::Set(args) => args.execute(),
        }
    }
}

impl AddArgs {
    fn execute(self) -> Result<(), CliError> {
        let site = self.store.open()?;
        let page = find_page(&site, &self.page)?;
        let block_type: BlockType = self.block_type.parse()?;
        let parent = self.parent.as_deref().map(parse_block_id).transpose()?;

        let registry = Arc::clone(site.registry());
        let (_, block_id) = site.pages().edit_page(page.id(), |doc| {
            let block = match parent {
                Some(parent) => doc.add_child_block(&registry, parent, block_type, self.index)?,
                None => doc.add_block(&registry, block_type, self.index)?,
            };
            Ok(block.id())
        })?;

        Output::new().success(&format!("Added block {block_id}"));
        Ok(())
    }
}

impl MoveArgs {
    fn execute(self) -> Result<(), CliError> {
        let site = self.store.open()?;
        let page = find_page(&site, &self.page)?;
        let block = parse_block_id(&self.block)?;

        site.pages()
            .edit_page(page.id(), |doc| doc.move_block(block, self.index))?;

        Output::new().success(&format!("Moved block {block} to position {}", self.index));
        Ok(())
    }
}

impl BlockRef {
    fn execute(self) -> Result<(), CliError> {
        let site = self.store.open()?;
        let page = find_page(&site, &self.page)?;
        let block = parse_block_id(&self.block)?;

        site.pages()
            .edit_page(page.id(), |doc| doc.remove_block(block))?;

        Output::new().success(&format!("Removed block {block}"));
        Ok(())
    }
}

impl SetArgs {
    fn execute(self) -> Result<(), CliError> {
        let site = self.store.open()?;
        let page = find_page(&site, &self.page)?;
        let block = parse_block_id(&self.block)?;
        let mut updates = Content::new();
        for field in &self.fields {
            let (key, value) = parse_assignment(field)?;
            updates.insert(key, value);
        }
        let mode = if self.partial {
            UpdateMode::Partial
        } else {
            UpdateMode::AllOrNothing
        };

        let registry = Arc::clone(site.registry());
        site.pages().edit_page(page.id(), |doc| {
            doc.update_block_content_with(&registry, block, updates, mode)
        })?;

        Output::new().success(&format!("Updated block {block}"));
        Ok(())
    }
}

fn parse_block_id(raw: &str) -> Result<BlockId, CliError> {
    raw.parse()
        .map_err(|_| CliError::Validation(format!("invalid block id: {raw}")))
}

/// Parse `key=value`. The value is read as JSON when it parses as JSON and
/// kept as a plain string otherwise, so `level=h3` and `height=48` both work.
fn parse_assignment(field: &str) -> Result<(String, Value), CliError> {
    let Some((key, raw)) = field.split_once('=') else {
        return Err(CliError::Validation(format!(
            "expected key=value, got {field:?}"
        )));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::Validation(format!("missing key in {field:?}")));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    Ok((key.to_owned(), value))
}
