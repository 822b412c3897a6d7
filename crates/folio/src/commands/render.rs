//! `folio render` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use folio_renderer::{TextBackend, emit};
use folio_site::{RenderedPage, Session, Site, SiteError};

use crate::commands::{StoreArgs, find_page, open_site};
use crate::error::CliError;
use crate::output::Output;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Complete HTML page.
    #[default]
    Html,
    /// Plain-text outline.
    Text,
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Page id or slug.
    page: String,

    /// Render any status with the preview banner (requires a session).
    #[arg(long)]
    preview: bool,

    /// Session file for preview (overrides config).
    #[arg(long, env = "FOLIO_SESSION")]
    session: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    format: Format,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    store: StoreArgs,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.store.load_config(self.session.clone())?;
        let site = open_site(&config);

        let rendered = if self.preview {
            let file = config.session_resolved.file.as_deref().ok_or_else(|| {
                CliError::Validation(
                    "preview requires a session (--session or [session] file)".to_owned(),
                )
            })?;
            let session = Session::load(file)?;
            render_preview(&site, &self.page, &session)?
        } else {
            render_public(&site, &self.page)?
        };

        let text = match self.format {
            Format::Html => rendered.html,
            Format::Text => emit::<TextBackend>(&rendered.nodes),
        };

        match &self.output {
            Some(path) => {
                std::fs::write(path, &text)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => output.print(&text),
        }
        Ok(())
    }
}

fn render_public(site: &Site, page: &str) -> Result<RenderedPage, CliError> {
    let document = find_page(site, page)?;
    match site.render_public(document.slug()) {
        Err(SiteError::NotFound(_)) => Err(CliError::Validation(format!(
            "/{} is {}; only published pages render publicly (use --preview)",
            document.slug(),
            document.status()
        ))),
        result => Ok(result?),
    }
}

fn render_preview(site: &Site, page: &str, session: &Session) -> Result<RenderedPage, CliError> {
    let document = find_page(site, page)?;
    Ok(site.render_preview(document.id(), session)?)
}
