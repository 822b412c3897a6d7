//! Block renderer with pluggable output backends.
//!
//! [`Renderer`] turns a [`Document`](folio_blocks::Document) into a tree of
//! [`RenderNode`]s by looking up one [`RenderRule`] per block type. The tree
//! is then formatted by a [`RenderBackend`]:
//! - [`HtmlBackend`]: semantic HTML5 for the public site and previews
//! - [`TextBackend`]: plain-text outline for the terminal
//!
//! Rich text from `text` blocks is passed through [`sanitize_html`] before it
//! reaches any backend.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use folio_blocks::{BlockType, Document, SchemaRegistry};
//! use folio_renderer::{HtmlBackend, Renderer, emit};
//!
//! let registry = Arc::new(SchemaRegistry::builtin());
//! let mut doc = Document::new("Welcome", "welcome").unwrap();
//! doc.add_block(&registry, BlockType::Heading, None).unwrap();
//!
//! let nodes = Renderer::new(Arc::clone(&registry)).render(&doc);
//! let html = emit::<HtmlBackend>(&nodes);
//! assert!(html.contains("Your Heading Here"));
//! ```

mod backend;
mod html;
mod node;
mod renderer;
mod rules;
mod sanitize;
mod text;

pub use backend::{RenderBackend, emit};
pub use html::HtmlBackend;
pub use node::{
    AccordionNode, Alignment, ButtonNode, ButtonSize, ButtonStyle, ColumnsNode, FormNode,
    GalleryNode, HeadingNode, HeroNode, ImageNode, LineStyle, Link, Panel, RenderNode,
    RichTextNode, SeparatorNode, SpacerNode, TabsNode, TestimonialNode, VideoNode,
};
pub use renderer::{RenderContext, RenderRule, Renderer};
pub use sanitize::{escape_html, safe_url, sanitize_html, strip_tags};
pub use text::TextBackend;
