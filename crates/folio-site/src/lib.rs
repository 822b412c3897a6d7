//! Page repository, public resolution and page rendering for Folio.
//!
//! This crate provides:
//! - [`PageRepository`]: page CRUD with slug uniqueness, filtering and sorting
//! - [`Site`]: published-only public resolution, session-gated preview, and
//!   rendering to a complete HTML page
//! - [`SaveCoordinator`]: per-page save coalescing with stale-save discard
//! - [`Session`]: the signed-in user, loaded once at startup
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use folio_blocks::{BlockType, SchemaRegistry};
//! use folio_site::{Site, SiteSettings};
//! use folio_storage::FsStorage;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let storage = Arc::new(FsStorage::new(dir.path().to_path_buf()));
//! let registry = Arc::new(SchemaRegistry::builtin());
//! let site = Site::new(storage, Arc::clone(&registry), SiteSettings::default());
//!
//! let page = site.pages().create_page("Hello world", None).unwrap();
//! site.pages()
//!     .edit_page(page.id(), |doc| {
//!         doc.add_block(&registry, BlockType::Heading, None)?;
//!         doc.publish()
//!     })
//!     .unwrap();
//!
//! let rendered = site.render_public("hello-world").unwrap();
//! assert!(rendered.html.contains("<title>Hello world</title>"));
//! ```

mod error;
mod repository;
mod save;
mod session;
mod shell;
mod site;

pub use error::SiteError;
pub use repository::{PageMetaUpdate, PageQuery, PageRepository, PageSort};
pub use save::{SaveCoordinator, SaveOutcome};
pub use session::{Role, Session, SessionError, User};
pub use site::{RenderedPage, Site, SiteSettings};
