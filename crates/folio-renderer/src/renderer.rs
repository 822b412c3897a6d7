//! Block renderer with a per-type dispatch table.

use std::collections::HashMap;
use std::sync::Arc;

use folio_blocks::{Block, BlockType, Document, SchemaRegistry};
use serde_json::Value;

use crate::node::RenderNode;
use crate::rules;

/// Rendering rule for one block type.
///
/// Returns `None` when the block is malformed; the block is then skipped.
pub type RenderRule = fn(&Block, &RenderContext<'_>) -> Option<RenderNode>;

/// Read access for rules: content lookup with schema defaults, and recursion
/// into container children.
pub struct RenderContext<'a> {
    renderer: &'a Renderer,
}

impl RenderContext<'_> {
    /// Content value for `key`, falling back to the type's default content.
    #[must_use]
    pub fn value<'b>(&'b self, block: &'b Block, key: &str) -> Option<&'b Value> {
        block.content().get(key).or_else(|| {
            self.renderer
                .registry
                .get_definition(block.block_type())
                .ok()
                .and_then(|d| d.default_content.get(key))
        })
    }

    /// String value for `key`. `None` if absent or not a string.
    #[must_use]
    pub fn text<'b>(&'b self, block: &'b Block, key: &str) -> Option<&'b str> {
        self.value(block, key).and_then(Value::as_str)
    }

    /// Render a container's children in their canonical order.
    #[must_use]
    pub fn render_children(&self, block: &Block) -> Vec<RenderNode> {
        self.renderer.render_sequence(&block.ordered_children(), self)
    }

    /// Render one block, or `None` if it is skipped.
    #[must_use]
    pub fn render_block(&self, block: &Block) -> Option<RenderNode> {
        self.renderer.render_one(block, self)
    }
}

/// Maps each block type to its rendering rule.
///
/// The renderer never mutates the document and never fails as a whole:
/// blocks of unknown type, and blocks a rule rejects as malformed, are
/// omitted from the output.
#[derive(Clone)]
pub struct Renderer {
    registry: Arc<SchemaRegistry>,
    rules: HashMap<BlockType, RenderRule>,
}

impl Renderer {
    /// Create a renderer with rules for all built-in block types.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            rules: rules::builtin(),
        }
    }

    /// Register or replace the rule for a block type.
    #[must_use]
    pub fn with_rule(mut self, block_type: BlockType, rule: RenderRule) -> Self {
        self.rules.insert(block_type, rule);
        self
    }

    /// The schema registry rules read defaults from.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Render a document's top-level blocks in their canonical order.
    #[must_use]
    pub fn render(&self, document: &Document) -> Vec<RenderNode> {
        let ctx = RenderContext { renderer: self };
        self.render_sequence(&document.ordered_blocks(), &ctx)
    }

    fn render_sequence(&self, blocks: &[&Block], ctx: &RenderContext<'_>) -> Vec<RenderNode> {
        blocks
            .iter()
            .filter_map(|block| self.render_one(block, ctx))
            .collect()
    }

    fn render_one(&self, block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
        let Some(rule) = self.rules.get(block.block_type()) else {
            tracing::warn!(
                block_id = %block.id(),
                block_type = %block.block_type(),
                "Skipping block with no rendering rule"
            );
            return None;
        };

        let node = rule(block, ctx);
        if node.is_none() {
            tracing::warn!(
                block_id = %block.id(),
                block_type = %block.block_type(),
                "Skipping malformed block"
            );
        }
        node
    }
}
