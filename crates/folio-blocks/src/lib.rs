//! Block document model for Folio.
//!
//! A page is a [`Document`]: an ordered collection of typed [`Block`]s. Each
//! block type has a [`BlockDefinition`] in the [`SchemaRegistry`] that fixes
//! its default content and the fields an editor may set.
//!
//! # Architecture
//!
//! - [`SchemaRegistry`]: catalog of block types, built once at startup and
//!   shared read-only (usually behind an `Arc`)
//! - [`Document`]: owns its blocks and exposes the only sanctioned mutation
//!   surface (`add_block`, `remove_block`, `move_block`, `update_block_content`)
//! - [`Document::ordered_blocks`]: the canonical read order for consumers
//!
//! # Example
//!
//! ```
//! use folio_blocks::{BlockType, Document, SchemaRegistry};
//!
//! let registry = SchemaRegistry::builtin();
//! let mut doc = Document::new("Welcome", "welcome").unwrap();
//!
//! doc.add_block(&registry, BlockType::Heading, None).unwrap();
//! doc.add_block(&registry, BlockType::Text, None).unwrap();
//!
//! let types: Vec<_> = doc.ordered_blocks().iter().map(|b| b.block_type().clone()).collect();
//! assert_eq!(types, vec![BlockType::Heading, BlockType::Text]);
//! ```

mod block;
mod builtin;
mod document;
mod ordering;
mod schema;
mod slug;
mod status;
mod validate;

pub use block::{Block, BlockId, BlockType, Content, ordered};
pub use document::{Document, DocumentError, DocumentId, Seo, UpdateMode};
pub use ordering::ORDER_STEP;
pub use schema::{
    BlockDefinition, Category, FieldDescriptor, FieldKind, FieldValidation, SchemaError,
    SchemaRegistry,
};
pub use slug::{is_valid_slug, slugify};
pub use status::{PageStatus, ParseStatusError};
pub use validate::{ValidationError, ValidationReason};
