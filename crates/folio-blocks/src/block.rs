//! Block identifiers, block types, and the block record itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::schema::SchemaError;

/// Block content: field key to JSON value.
pub type Content = Map<String, Value>;

/// Opaque block identifier.
///
/// Assigned once when the block is instantiated and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Uuid);

impl BlockId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BlockId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Kind of content block.
///
/// The set of known kinds is closed. Tags that are not recognised (for example
/// from data written by a newer version) are kept as [`BlockType::Unknown`]
/// so they survive a storage round trip; the renderer skips them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Heading,
    Text,
    Image,
    Button,
    Separator,
    Video,
    Form,
    Gallery,
    Spacer,
    Columns,
    Hero,
    Testimonial,
    Accordion,
    Tabs,
    /// Unrecognised tag, preserved verbatim.
    Unknown(String),
}

impl BlockType {
    /// All known block types, in palette order.
    pub const ALL: [Self; 14] = [
        Self::Heading,
        Self::Text,
        Self::Image,
        Self::Button,
        Self::Separator,
        Self::Video,
        Self::Form,
        Self::Gallery,
        Self::Spacer,
        Self::Columns,
        Self::Hero,
        Self::Testimonial,
        Self::Accordion,
        Self::Tabs,
    ];

    /// Wire name of the type (e.g., `"heading"`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heading => "heading",
            Self::Text => "text",
            Self::Image => "image",
            Self::Button => "button",
            Self::Separator => "separator",
            Self::Video => "video",
            Self::Form => "form",
            Self::Gallery => "gallery",
            Self::Spacer => "spacer",
            Self::Columns => "columns",
            Self::Hero => "hero",
            Self::Testimonial => "testimonial",
            Self::Accordion => "accordion",
            Self::Tabs => "tabs",
            Self::Unknown(name) => name,
        }
    }

    /// Whether blocks of this type may own children.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Columns | Self::Accordion | Self::Tabs)
    }

    /// Whether this is one of the built-in kinds.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for BlockType {
    fn from(name: String) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .unwrap_or(Self::Unknown(name))
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Unknown(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl FromStr for BlockType {
    type Err = SchemaError;

    /// Parse a known block type. Unknown names are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from(s.to_owned()) {
            Self::Unknown(name) => Err(SchemaError::UnknownBlockType(name)),
            known => Ok(known),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed unit of page content.
///
/// Fields are read-only outside this crate: all mutation goes through
/// [`Document`](crate::Document).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub(crate) id: BlockId,
    #[serde(rename = "type")]
    pub(crate) block_type: BlockType,
    #[serde(default)]
    pub(crate) content: Content,
    /// Sort key among siblings. `None` until the block is placed in a document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) parent_id: Option<BlockId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) children: Vec<Block>,
}

impl Block {
    pub(crate) fn new(block_type: BlockType, content: Content) -> Self {
        Self {
            id: BlockId::new(),
            block_type,
            content,
            order: None,
            parent_id: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[must_use]
    pub fn block_type(&self) -> &BlockType {
        &self.block_type
    }

    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    #[must_use]
    pub fn order(&self) -> Option<i64> {
        self.order
    }

    #[must_use]
    pub fn parent_id(&self) -> Option<BlockId> {
        self.parent_id
    }

    /// Children in storage order. Use [`ordered_children`](Self::ordered_children) for display.
    #[must_use]
    pub fn children(&self) -> &[Block] {
        &self.children
    }

    /// Children sorted by the same contract as top-level blocks.
    #[must_use]
    pub fn ordered_children(&self) -> Vec<&Block> {
        ordered(&self.children)
    }

    /// String value of a content field, if present and a string.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.content.get(key).and_then(Value::as_str)
    }
}

/// Sort key for a block. Unplaced blocks sort last.
pub(crate) fn sort_key(block: &Block) -> i64 {
    block.order.unwrap_or(i64::MAX)
}

/// Sort sibling blocks ascending by `order`.
///
/// The sort is stable, so blocks with equal `order` keep their insertion
/// sequence.
#[must_use]
pub fn ordered(blocks: &[Block]) -> Vec<&Block> {
    let mut sorted: Vec<&Block> = blocks.iter().collect();
    sorted.sort_by_key(|b| sort_key(b));
    sorted
}
