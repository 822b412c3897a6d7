//! Public and preview page resolution and rendering.
//!
//! Provides [`Site`], the facade used by the server and the CLI. It owns the
//! [`PageRepository`], the shared [`SchemaRegistry`] and a [`Renderer`].
//!
//! # Visibility
//!
//! - [`Site::resolve_by_slug`] is the public path: only published pages
//!   resolve; drafts and archived pages are reported as not found
//! - [`Site::resolve_preview`] is the editor path: any status resolves, but
//!   only for a session allowed to preview
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use folio_blocks::SchemaRegistry;
//! use folio_site::{Site, SiteSettings};
//! use folio_storage::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("data/pages")));
//! let registry = Arc::new(SchemaRegistry::builtin());
//! let site = Site::new(storage, registry, SiteSettings::default());
//!
//! let page = site.render_public("about")?;
//! ```

use std::sync::Arc;

use folio_blocks::{Document, DocumentId, PageStatus, SchemaRegistry};
use folio_renderer::{HtmlBackend, RenderNode, Renderer, emit};
use folio_storage::Storage;

use crate::error::SiteError;
use crate::repository::PageRepository;
use crate::session::Session;
use crate::shell::page_shell;

/// Site-wide settings used in the page head.
#[derive(Clone, Debug)]
pub struct SiteSettings {
    /// Site name (`og:site_name`).
    pub name: String,
    /// Fallback meta description for pages without one.
    pub description: String,
    /// Public base URL, used for `og:url`.
    pub url: Option<String>,
    /// Value of `<html lang>`.
    pub language: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            name: "Folio".to_owned(),
            description: String::new(),
            url: None,
            language: "en".to_owned(),
        }
    }
}

/// A rendered page.
#[derive(Clone, Debug)]
pub struct RenderedPage {
    pub document: Document,
    /// Render tree, in display order.
    pub nodes: Vec<RenderNode>,
    /// Complete HTML document.
    pub html: String,
}

/// Page resolution and rendering facade.
pub struct Site {
    pages: PageRepository,
    registry: Arc<SchemaRegistry>,
    renderer: Renderer,
    settings: SiteSettings,
}

impl Site {
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        registry: Arc<SchemaRegistry>,
        settings: SiteSettings,
    ) -> Self {
        Self {
            pages: PageRepository::new(storage),
            renderer: Renderer::new(Arc::clone(&registry)),
            registry,
            settings,
        }
    }

    /// Replace the renderer, e.g. one with custom rules.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    #[must_use]
    pub fn pages(&self) -> &PageRepository {
        &self.pages
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    #[must_use]
    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    /// Resolve a public slug. Only published pages are visible.
    pub fn resolve_by_slug(&self, slug: &str) -> Result<Document, SiteError> {
        match self.pages.find_by_slug(slug)? {
            Some(document) if document.status() == PageStatus::Published => Ok(document),
            Some(document) => {
                tracing::debug!(slug, status = %document.status(), "Hiding unpublished page");
                Err(SiteError::NotFound(slug.to_owned()))
            }
            None => Err(SiteError::NotFound(slug.to_owned())),
        }
    }

    /// Resolve a page of any status for an editor.
    pub fn resolve_preview(&self, id: DocumentId, session: &Session) -> Result<Document, SiteError> {
        if !session.can_preview() {
            tracing::warn!(user = %session.user.id, role = %session.user.role, "Preview denied");
            return Err(SiteError::Forbidden("preview requires an admin or editor"));
        }
        self.pages.get_page(id)
    }

    /// Resolve and render a published page.
    pub fn render_public(&self, slug: &str) -> Result<RenderedPage, SiteError> {
        let document = self.resolve_by_slug(slug)?;
        Ok(self.render_document(document, false))
    }

    /// Resolve and render any page with the preview banner.
    pub fn render_preview(
        &self,
        id: DocumentId,
        session: &Session,
    ) -> Result<RenderedPage, SiteError> {
        let document = self.resolve_preview(id, session)?;
        Ok(self.render_document(document, true))
    }

    /// Render a document into a full HTML page.
    #[must_use]
    pub fn render_document(&self, document: Document, preview: bool) -> RenderedPage {
        let nodes = self.renderer.render(&document);
        let body = emit::<HtmlBackend>(&nodes);
        let html = page_shell(&document, &body, &self.settings, preview);
        RenderedPage {
            document,
            nodes,
            html,
        }
    }
}
