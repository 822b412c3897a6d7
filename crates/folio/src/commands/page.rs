//! `folio page` subcommand group.

use clap::{Args, Subcommand};
use folio_blocks::{Document, DocumentError, PageStatus, Seo};
use folio_site::{PageMetaUpdate, PageQuery, PageSort};

use crate::commands::{StoreArgs, find_page};
use crate::error::CliError;
use crate::output::Output;

/// Page commands.
#[derive(Subcommand)]
pub(crate) enum PageCommand {
    /// Create an empty draft page.
    New(NewArgs),
    /// List pages.
    List(ListArgs),
    /// Show a page's metadata and block outline.
    Show(PageRef),
    /// Change title, slug or SEO fields.
    Edit(EditArgs),
    /// Publish a draft.
    Publish(PageRef),
    /// Return a published page to draft.
    Unpublish(PageRef),
    /// Archive a published page.
    Archive(PageRef),
    /// Return an archived page to draft.
    Restore(PageRef),
    /// Delete a page.
    Delete(PageRef),
}

#[derive(Args)]
pub(crate) struct NewArgs {
    /// Page title.
    title: String,

    /// URL slug (default: derived from the title).
    #[arg(long)]
    slug: Option<String>,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args)]
pub(crate) struct ListArgs {
    /// Only pages with this status (draft, published, archived).
    #[arg(long)]
    status: Option<String>,

    /// Case-insensitive search in title and slug.
    #[arg(long)]
    search: Option<String>,

    /// Sort order (title, updated, created).
    #[arg(long, default_value = "updated")]
    sort: String,

    #[command(flatten)]
    store: StoreArgs,
}

/// A page given by id or slug.
#[derive(Args)]
pub(crate) struct PageRef {
    /// Page id or slug.
    page: String,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args)]
pub(crate) struct EditArgs {
    /// Page id or slug.
    page: String,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    slug: Option<String>,

    #[arg(long)]
    seo_title: Option<String>,

    #[arg(long)]
    seo_description: Option<String>,

    #[arg(long)]
    seo_keywords: Option<String>,

    #[command(flatten)]
    store: StoreArgs,
}

impl PageCommand {
    /// Execute the page subcommand.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::New(args) => args.execute(),
            Self::List(args) => args.execute(),
            Self::Show(page) => page.show(),
            Self::Edit(args) => args.execute(),
            Self::Publish(page) => page.transition(Document::publish),
            Self::Unpublish(page) => page.transition(Document::unpublish),
            Self::Archive(page) => page.transition(Document::archive),
            Self::Restore(page) => page.transition(Document::restore),
            Self::Delete(page) => page.delete(),
        }
    }
}

impl NewArgs {
    fn execute(self) -> Result<(), CliError> {
        let site = self.store.open()?;
        let page = site.pages().create_page(&self.title, self.slug.as_deref())?;

        Output::new().success(&format!("Created page /{} ({})", page.slug(), page.id()));
        Ok(())
    }
}

impl ListArgs {
    fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let site = self.store.open()?;
        let query = PageQuery {
            status: self
                .status
                .as_deref()
                .map(str::parse::<PageStatus>)
                .transpose()
                .map_err(|e| CliError::Validation(e.to_string()))?,
            search: self.search,
            sort: self.sort.parse::<PageSort>().map_err(CliError::Validation)?,
        };

        let pages = site.pages().list_pages(&query)?;
        if pages.is_empty() {
            output.info("No pages");
            return Ok(());
        }
        for page in pages {
            output.print(&format!(
                "{:<10} {:<30} /{}",
                page.status.as_str(),
                page.title,
                page.slug
            ));
            output.detail(&format!(
                "           {}  updated {}",
                page.id,
                page.updated_at.format("%Y-%m-%d %H:%M")
            ));
        }
        Ok(())
    }
}

impl PageRef {
    fn show(self) -> Result<(), CliError> {
        let output = Output::new();
        let site = self.store.open()?;
        let page = find_page(&site, &self.page)?;

        output.heading(page.title());
        output.print(&format!("id:       {}", page.id()));
        output.print(&format!("slug:     /{}", page.slug()));
        output.print(&format!("status:   {}", page.status()));
        output.print(&format!("revision: {}", page.revision()));
        if let Some(published_at) = page.published_at() {
            output.print(&format!("published: {}", published_at.to_rfc3339()));
        }
        output.print("blocks:");
        for line in outline(&page) {
            output.print(&line);
        }
        Ok(())
    }

    fn transition(
        self,
        change: fn(&mut Document) -> Result<(), DocumentError>,
    ) -> Result<(), CliError> {
        let site = self.store.open()?;
        let page = find_page(&site, &self.page)?;
        let (page, ()) = site.pages().edit_page(page.id(), change)?;

        Output::new().success(&format!("/{} is now {}", page.slug(), page.status()));
        Ok(())
    }

    fn delete(self) -> Result<(), CliError> {
        let site = self.store.open()?;
        let page = find_page(&site, &self.page)?;
        site.pages().delete_page(page.id())?;

        Output::new().success(&format!("Deleted /{}", page.slug()));
        Ok(())
    }
}

impl EditArgs {
    fn execute(self) -> Result<(), CliError> {
        let site = self.store.open()?;
        let page = find_page(&site, &self.page)?;

        let seo = if self.seo_title.is_some()
            || self.seo_description.is_some()
            || self.seo_keywords.is_some()
        {
            let current = page.seo();
            Some(Seo {
                title: self.seo_title.or_else(|| current.title.clone()),
                description: self
                    .seo_description
                    .or_else(|| current.description.clone()),
                keywords: self.seo_keywords.or_else(|| current.keywords.clone()),
            })
        } else {
            None
        };
        let update = PageMetaUpdate {
            title: self.title,
            slug: self.slug,
            seo,
            ..PageMetaUpdate::default()
        };

        let page = site.pages().update_page_meta(page.id(), update)?;
        Output::new().success(&format!("Updated /{} (revision {})", page.slug(), page.revision()));
        Ok(())
    }
}

/// Indented block outline in display order, one line per block.
pub(crate) fn outline(page: &Document) -> Vec<String> {
    fn walk(blocks: Vec<&folio_blocks::Block>, depth: usize, lines: &mut Vec<String>) {
        for (index, block) in blocks.into_iter().enumerate() {
            let label = block
                .text("text")
                .or_else(|| block.text("title"))
                .map(|t| format!(" {t:?}"))
                .unwrap_or_default();
            lines.push(format!(
                "{}{index}. {} {}{label}",
                "  ".repeat(depth + 1),
                block.block_type(),
                block.id()
            ));
            walk(block.ordered_children(), depth + 1, lines);
        }
    }

    let mut lines = Vec::new();
    walk(page.ordered_blocks(), 0, &mut lines);
    lines
}

#[cfg(test)]
mod tests {
    use folio_blocks::{BlockType, SchemaRegistry};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_outline_follows_display_order() {
        let registry = SchemaRegistry::builtin();
        let mut page = Document::new("Home", "home").unwrap();
        let spacer = page.add_block(&registry, BlockType::Spacer, None).unwrap().id();
        let heading = page
            .add_block(&registry, BlockType::Heading, Some(0))
            .unwrap()
            .id();

        let lines = outline(&page);

        assert_eq!(
            lines,
            vec![
                format!("  0. heading {heading} \"Your Heading Here\""),
                format!("  1. spacer {spacer}"),
            ]
        );
    }
}
