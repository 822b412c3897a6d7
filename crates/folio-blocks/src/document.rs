//! Page document: the block tree plus page metadata.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::block::{Block, BlockId, BlockType, Content, ordered};
use crate::ordering::{append_order, assign_order};
use crate::schema::{SchemaError, SchemaRegistry};
use crate::slug::is_valid_slug;
use crate::status::PageStatus;
use crate::validate::ValidationError;

/// Opaque page identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Search-engine metadata attached to a page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Comma-separated keywords.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

/// How a content update treats invalid fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// Apply valid fields, report invalid ones.
    #[default]
    Partial,
    /// Apply nothing if any field is invalid.
    AllOrNothing,
}

/// Error returned by document operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),
    /// One entry per rejected field.
    #[error("Invalid content: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition { from: PageStatus, to: PageStatus },
    #[error("Block {0} cannot contain children")]
    NotAContainer(BlockId),
    #[error("Duplicate block id: {0}")]
    DuplicateBlockId(BlockId),
    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A page: metadata plus an ordered tree of blocks.
///
/// The block tree is only mutated through the methods on this type. Every
/// mutation bumps [`revision`](Self::revision) and `updated_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    id: DocumentId,
    title: String,
    slug: String,
    #[serde(default)]
    status: PageStatus,
    #[serde(default)]
    content: Vec<Block>,
    #[serde(default)]
    seo: Seo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    featured_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    revision: u64,
}

impl Document {
    /// Create an empty draft page.
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Result<Self, DocumentError> {
        let slug = slug.into();
        if !is_valid_slug(&slug) {
            return Err(DocumentError::InvalidSlug(slug));
        }
        let now = Utc::now();
        Ok(Self {
            id: DocumentId::new(),
            title: title.into(),
            slug,
            status: PageStatus::Draft,
            content: Vec::new(),
            seo: Seo::default(),
            author_id: None,
            featured_image: None,
            created_at: now,
            updated_at: now,
            published_at: None,
            revision: 0,
        })
    }

    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn status(&self) -> PageStatus {
        self.status
    }

    #[must_use]
    pub fn seo(&self) -> &Seo {
        &self.seo
    }

    #[must_use]
    pub fn author_id(&self) -> Option<&str> {
        self.author_id.as_deref()
    }

    #[must_use]
    pub fn featured_image(&self) -> Option<&str> {
        self.featured_image.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    /// Mutation counter. Strictly increases with every change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Top-level blocks in storage order.
    ///
    /// Storage order is not display order; use
    /// [`ordered_blocks`](Self::ordered_blocks) for anything user-visible.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.content
    }

    /// Top-level blocks sorted by `order`, ties in insertion sequence.
    #[must_use]
    pub fn ordered_blocks(&self) -> Vec<&Block> {
        ordered(&self.content)
    }

    /// Find a block anywhere in the tree.
    #[must_use]
    pub fn find_block(&self, id: BlockId) -> Option<&Block> {
        find(&self.content, id)
    }

    /// Instantiate a block and place it among the top-level blocks.
    ///
    /// `at_index` is a position in [`ordered_blocks`](Self::ordered_blocks);
    /// `None` appends after the current last block.
    pub fn add_block(
        &mut self,
        registry: &SchemaRegistry,
        block_type: BlockType,
        at_index: Option<usize>,
    ) -> Result<&Block, DocumentError> {
        let mut block = registry.instantiate(&block_type)?;
        let order = match at_index {
            Some(index) => assign_order(&mut self.content, index, None),
            None => append_order(&mut self.content),
        };
        block.order = Some(order);
        tracing::debug!(block_id = %block.id, block_type = %block_type, order, "Added block");

        let idx = self.content.len();
        self.content.push(block);
        self.touch();
        Ok(&self.content[idx])
    }

    /// Instantiate a block as a child of a container block.
    pub fn add_child_block(
        &mut self,
        registry: &SchemaRegistry,
        parent_id: BlockId,
        block_type: BlockType,
        at_index: Option<usize>,
    ) -> Result<&Block, DocumentError> {
        let parent =
            find_mut(&mut self.content, parent_id).ok_or(DocumentError::BlockNotFound(parent_id))?;
        if !parent.block_type.is_container() {
            return Err(DocumentError::NotAContainer(parent_id));
        }

        let mut block = registry.instantiate(&block_type)?;
        let order = match at_index {
            Some(index) => assign_order(&mut parent.children, index, None),
            None => append_order(&mut parent.children),
        };
        block.order = Some(order);
        block.parent_id = Some(parent_id);
        let id = block.id;
        parent.children.push(block);
        tracing::debug!(block_id = %id, parent_id = %parent_id, order, "Added child block");

        self.touch();
        self.find_block(id).ok_or(DocumentError::BlockNotFound(id))
    }

    /// Remove a block (and its children) from the tree.
    ///
    /// Remaining siblings keep their order values.
    pub fn remove_block(&mut self, id: BlockId) -> Result<Block, DocumentError> {
        let block = remove_from(&mut self.content, id).ok_or(DocumentError::BlockNotFound(id))?;
        self.touch();
        Ok(block)
    }

    /// Move a block to `to_index` among its siblings.
    ///
    /// `to_index` is the block's position in the ordered sibling sequence
    /// after the move. Other siblings keep their relative order.
    pub fn move_block(&mut self, id: BlockId, to_index: usize) -> Result<(), DocumentError> {
        let siblings =
            siblings_containing(&mut self.content, id).ok_or(DocumentError::BlockNotFound(id))?;
        let order = assign_order(siblings, to_index, Some(id));
        if let Some(block) = siblings.iter_mut().find(|b| b.id == id) {
            block.order = Some(order);
        }
        tracing::debug!(block_id = %id, to_index, order, "Moved block");

        self.touch();
        Ok(())
    }

    /// Merge `updates` into a block's content, validating each field.
    ///
    /// Valid fields are applied even when others fail; the failures are
    /// returned together as [`DocumentError::Validation`].
    pub fn update_block_content(
        &mut self,
        registry: &SchemaRegistry,
        id: BlockId,
        updates: Content,
    ) -> Result<(), DocumentError> {
        self.update_block_content_with(registry, id, updates, UpdateMode::Partial)
    }

    /// Merge `updates` into a block's content with an explicit [`UpdateMode`].
    pub fn update_block_content_with(
        &mut self,
        registry: &SchemaRegistry,
        id: BlockId,
        updates: Content,
        mode: UpdateMode,
    ) -> Result<(), DocumentError> {
        let block = find_mut(&mut self.content, id).ok_or(DocumentError::BlockNotFound(id))?;
        let definition = registry.get_definition(&block.block_type)?;

        let mut accepted = Vec::with_capacity(updates.len());
        let mut errors = Vec::new();
        for (key, value) in updates {
            match definition.validate_field(&key, &value) {
                Ok(()) => accepted.push((key, value)),
                Err(e) => errors.push(e),
            }
        }

        if mode == UpdateMode::AllOrNothing && !errors.is_empty() {
            return Err(DocumentError::Validation(errors));
        }

        let changed = !accepted.is_empty();
        for (key, value) in accepted {
            block.content.insert(key, value);
        }
        if changed {
            self.touch();
        }

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(block_id = %id, rejected = errors.len(), "Rejected block fields");
            Err(DocumentError::Validation(errors))
        }
    }

    /// Check tree invariants of a document read from outside.
    ///
    /// Block ids must be unique across the whole tree and only container
    /// types may have children.
    pub fn validate_structure(&self) -> Result<(), DocumentError> {
        let mut seen = HashSet::new();
        check_tree(&self.content, &mut seen)
    }

    /// Check every block's content against its definition.
    ///
    /// Blocks that appear unchanged in `baseline` (same id, type and
    /// content) are trusted as stored. A field holding its type's default
    /// value is accepted. Rejected fields are reported together with keys of
    /// the form `<block id>.<field>`.
    pub fn validate_content(
        &self,
        registry: &SchemaRegistry,
        baseline: Option<&Document>,
    ) -> Result<(), DocumentError> {
        let mut errors = Vec::new();
        check_content(&self.content, registry, baseline, &mut errors)?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DocumentError::Validation(errors))
        }
    }

    /// draft → published. Records the publication time.
    pub fn publish(&mut self) -> Result<(), DocumentError> {
        self.transition(PageStatus::Draft, PageStatus::Published)?;
        self.published_at = Some(self.updated_at);
        Ok(())
    }

    /// published → draft.
    pub fn unpublish(&mut self) -> Result<(), DocumentError> {
        self.transition(PageStatus::Published, PageStatus::Draft)
    }

    /// published → archived.
    pub fn archive(&mut self) -> Result<(), DocumentError> {
        self.transition(PageStatus::Published, PageStatus::Archived)
    }

    /// archived → draft.
    pub fn restore(&mut self) -> Result<(), DocumentError> {
        self.transition(PageStatus::Archived, PageStatus::Draft)
    }

    fn transition(&mut self, from: PageStatus, to: PageStatus) -> Result<(), DocumentError> {
        if self.status != from || !from.can_transition_to(to) {
            return Err(DocumentError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        tracing::debug!(page_id = %self.id, from = %from, to = %to, "Status changed");
        self.status = to;
        self.touch();
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) -> Result<(), DocumentError> {
        let slug = slug.into();
        if !is_valid_slug(&slug) {
            return Err(DocumentError::InvalidSlug(slug));
        }
        self.slug = slug;
        self.touch();
        Ok(())
    }

    pub fn set_seo(&mut self, seo: Seo) {
        self.seo = seo;
        self.touch();
    }

    pub fn set_author_id(&mut self, author_id: Option<String>) {
        self.author_id = author_id;
        self.touch();
    }

    pub fn set_featured_image(&mut self, featured_image: Option<String>) {
        self.featured_image = featured_image;
        self.touch();
    }

    fn touch(&mut self) {
        self.revision = self.revision.saturating_add(1);
        self.updated_at = Utc::now();
    }
}

fn find(blocks: &[Block], id: BlockId) -> Option<&Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find(&block.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_mut(blocks: &mut [Block], id: BlockId) -> Option<&mut Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find_mut(&mut block.children, id) {
            return Some(found);
        }
    }
    None
}

/// Sibling list holding the block with `id`.
fn siblings_containing(blocks: &mut Vec<Block>, id: BlockId) -> Option<&mut Vec<Block>> {
    if blocks.iter().any(|b| b.id == id) {
        return Some(blocks);
    }
    blocks
        .iter_mut()
        .find_map(|b| siblings_containing(&mut b.children, id))
}

fn remove_from(blocks: &mut Vec<Block>, id: BlockId) -> Option<Block> {
    if let Some(pos) = blocks.iter().position(|b| b.id == id) {
        return Some(blocks.remove(pos));
    }
    blocks
        .iter_mut()
        .find_map(|b| remove_from(&mut b.children, id))
}

fn check_tree(blocks: &[Block], seen: &mut HashSet<BlockId>) -> Result<(), DocumentError> {
    for block in blocks {
        if !seen.insert(block.id) {
            return Err(DocumentError::DuplicateBlockId(block.id));
        }
        if !block.children.is_empty()
            && block.block_type.is_known()
            && !block.block_type.is_container()
        {
            return Err(DocumentError::NotAContainer(block.id));
        }
        check_tree(&block.children, seen)?;
    }
    Ok(())
}

fn check_content(
    blocks: &[Block],
    registry: &SchemaRegistry,
    baseline: Option<&Document>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), DocumentError> {
    for block in blocks {
        let unchanged = baseline
            .and_then(|doc| doc.find_block(block.id))
            .is_some_and(|old| old.block_type == block.block_type && old.content == block.content);
        if !unchanged {
            let definition = registry.get_definition(&block.block_type)?;
            for (key, value) in &block.content {
                if definition.default_content.get(key) == Some(value) {
                    continue;
                }
                if let Err(e) = definition.validate_field(key, value) {
                    errors.push(ValidationError::new(format!("{}.{key}", block.id), e.reason));
                }
            }
        }
        check_content(&block.children, registry, baseline, errors)?;
    }
    Ok(())
}
