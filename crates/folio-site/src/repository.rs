//! Page repository: create, edit, list and delete pages on top of a
//! [`Storage`] backend.

use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use folio_blocks::{
    Document, DocumentError, DocumentId, PageStatus, SchemaRegistry, Seo, is_valid_slug, slugify,
};
use folio_storage::{DocumentSummary, Storage};
use serde::Deserialize;

use crate::error::SiteError;
use crate::save::{SaveCoordinator, SaveOutcome};

/// Sort order for [`PageRepository::list_pages`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSort {
    /// Alphabetical by title, case-insensitive.
    Title,
    /// Most recently updated first.
    #[default]
    #[serde(rename = "updated")]
    UpdatedNewest,
    /// Most recently created first.
    #[serde(rename = "created")]
    CreatedNewest,
}

impl FromStr for PageSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "updated" => Ok(Self::UpdatedNewest),
            "created" => Ok(Self::CreatedNewest),
            other => Err(format!(
                "unknown sort {other:?} (expected title, updated or created)"
            )),
        }
    }
}

/// Filter and sort options for listing pages.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    /// Only pages with this status.
    pub status: Option<PageStatus>,
    /// Case-insensitive substring of the title or slug.
    pub search: Option<String>,
    pub sort: PageSort,
}

impl PageQuery {
    fn matches(&self, page: &DocumentSummary) -> bool {
        if self.status.is_some_and(|s| s != page.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                page.title.to_lowercase().contains(&term) || page.slug.contains(&term)
            }
        }
    }
}

/// Page metadata changes. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageMetaUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub seo: Option<Seo>,
    pub author_id: Option<String>,
    pub featured_image: Option<String>,
}

/// Page CRUD with slug uniqueness.
///
/// Every write goes through a single lock so that the checks made against
/// the stored page and the save they guard cannot interleave with another
/// writer in this process.
pub struct PageRepository {
    storage: Arc<dyn Storage>,
    saves: SaveCoordinator,
    write_lock: Mutex<()>,
}

impl PageRepository {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            saves: SaveCoordinator::new(Arc::clone(&storage)),
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying storage.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Create and save an empty draft page.
    ///
    /// When `slug` is `None` it is derived from the title.
    pub fn create_page(&self, title: &str, slug: Option<&str>) -> Result<Document, SiteError> {
        let slug = slug.map_or_else(|| slugify(title), str::to_owned);
        if !is_valid_slug(&slug) {
            return Err(SiteError::InvalidSlug(slug));
        }

        let _guard = self.lock();
        self.ensure_slug_free(&slug, None)?;
        let document = Document::new(title, slug)?;
        self.storage.save(&document)?;

        tracing::info!(page_id = %document.id(), slug = %document.slug(), "Created page");
        Ok(document)
    }

    pub fn get_page(&self, id: DocumentId) -> Result<Document, SiteError> {
        self.storage
            .load(id)
            .map_err(|e| SiteError::from_load(id, e))
    }

    /// Find a page by slug regardless of status.
    pub fn find_by_slug(&self, slug: &str) -> Result<Option<Document>, SiteError> {
        let Some(summary) = self.storage.list()?.into_iter().find(|p| p.slug == slug) else {
            return Ok(None);
        };
        self.get_page(summary.id).map(Some)
    }

    /// Apply metadata changes and save.
    pub fn update_page_meta(
        &self,
        id: DocumentId,
        update: PageMetaUpdate,
    ) -> Result<Document, SiteError> {
        let _guard = self.lock();
        let mut document = self.get_page(id)?;

        if let Some(slug) = update.slug
            && slug != document.slug()
        {
            if !is_valid_slug(&slug) {
                return Err(SiteError::InvalidSlug(slug));
            }
            self.ensure_slug_free(&slug, Some(id))?;
            document.set_slug(slug)?;
        }
        if let Some(title) = update.title {
            document.set_title(title);
        }
        if let Some(seo) = update.seo {
            document.set_seo(seo);
        }
        if let Some(author_id) = update.author_id {
            document.set_author_id(Some(author_id));
        }
        if let Some(featured_image) = update.featured_image {
            document.set_featured_image(Some(featured_image));
        }

        self.storage.save(&document)?;
        Ok(document)
    }

    /// Load a page, apply `edit` and save the result.
    ///
    /// Nothing is saved when `edit` fails.
    pub fn edit_page<T>(
        &self,
        id: DocumentId,
        edit: impl FnOnce(&mut Document) -> Result<T, DocumentError>,
    ) -> Result<(Document, T), SiteError> {
        let _guard = self.lock();
        let mut document = self.get_page(id)?;
        let value = edit(&mut document)?;
        self.storage.save(&document)?;
        Ok((document, value))
    }

    /// Save a full page snapshot from the editor as-is.
    ///
    /// A snapshot whose revision is behind the stored page, or that forks
    /// from it at the same revision, is discarded as [`SaveOutcome::Stale`].
    /// Otherwise the snapshot must keep the stored status (status changes
    /// go through [`Document::publish`] and friends), have a well-formed
    /// block tree and a free slug, and every changed block must pass its
    /// definition.
    pub fn save_snapshot(
        &self,
        registry: &SchemaRegistry,
        document: Document,
    ) -> Result<SaveOutcome, SiteError> {
        let id = document.id();
        let _guard = self.lock();
        let stored = self.get_page(id)?;

        let revision = document.revision();
        if revision < stored.revision() || (revision == stored.revision() && document != stored) {
            tracing::warn!(
                page_id = %id,
                revision,
                latest = stored.revision(),
                "Discarding snapshot behind stored page"
            );
            return Ok(SaveOutcome::Stale {
                revision,
                latest: stored.revision(),
            });
        }
        if revision == stored.revision() {
            return Ok(SaveOutcome::Saved { revision });
        }

        self.check_snapshot(registry, &document, &stored)?;
        Ok(self.saves.request_save(document)?)
    }

    fn check_snapshot(
        &self,
        registry: &SchemaRegistry,
        document: &Document,
        stored: &Document,
    ) -> Result<(), SiteError> {
        if document.status() != stored.status() {
            return Err(DocumentError::InvalidTransition {
                from: stored.status(),
                to: document.status(),
            }
            .into());
        }
        document.validate_structure()?;
        document.validate_content(registry, Some(stored))?;
        if !is_valid_slug(document.slug()) {
            return Err(SiteError::InvalidSlug(document.slug().to_owned()));
        }
        self.ensure_slug_free(document.slug(), Some(document.id()))
    }

    pub fn delete_page(&self, id: DocumentId) -> Result<(), SiteError> {
        let _guard = self.lock();
        self.storage
            .delete(id)
            .map_err(|e| SiteError::from_load(id, e))?;
        self.saves.forget(id);
        tracing::info!(page_id = %id, "Deleted page");
        Ok(())
    }

    /// Summaries of the pages matching `query`, sorted.
    pub fn list_pages(&self, query: &PageQuery) -> Result<Vec<DocumentSummary>, SiteError> {
        let mut pages: Vec<_> = self
            .storage
            .list()?
            .into_iter()
            .filter(|p| query.matches(p))
            .collect();

        match query.sort {
            PageSort::Title => pages.sort_by(|a, b| {
                a.title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.slug.cmp(&b.slug))
            }),
            PageSort::UpdatedNewest => pages.sort_by(|a, b| {
                b.updated_at
                    .cmp(&a.updated_at)
                    .then_with(|| a.slug.cmp(&b.slug))
            }),
            PageSort::CreatedNewest => pages.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| a.slug.cmp(&b.slug))
            }),
        }

        Ok(pages)
    }

    fn ensure_slug_free(&self, slug: &str, except: Option<DocumentId>) -> Result<(), SiteError> {
        let taken = self
            .storage
            .list()?
            .iter()
            .any(|p| p.slug == slug && Some(p.id) != except);
        if taken {
            return Err(SiteError::SlugTaken(slug.to_owned()));
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
