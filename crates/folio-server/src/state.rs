//! Application state.
//!
//! Shared state for all request handlers.

use folio_site::{Session, Site, SiteError};

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Page resolution, rendering and the page repository.
    pub(crate) site: Site,
    /// Signed-in user, loaded once at startup.
    pub(crate) session: Option<Session>,
    /// Application version.
    pub(crate) version: String,
}

impl AppState {
    #[must_use]
    pub(crate) fn new(site: Site, session: Option<Session>, version: String) -> Self {
        Self {
            site,
            session,
            version,
        }
    }

    /// Session allowed to preview pages.
    pub(crate) fn preview_session(&self) -> Result<&Session, SiteError> {
        self.session
            .as_ref()
            .ok_or(SiteError::Forbidden("preview requires a session"))
    }

    /// Check that the session may see pages of any status.
    pub(crate) fn require_preview(&self) -> Result<&Session, SiteError> {
        match &self.session {
            Some(session) if session.can_preview() => Ok(session),
            Some(_) => Err(SiteError::Forbidden("viewing drafts requires an admin or editor")),
            None => Err(SiteError::Forbidden("viewing drafts requires a session")),
        }
    }

    /// Check that the session may modify pages.
    pub(crate) fn require_editor(&self) -> Result<&Session, SiteError> {
        match &self.session {
            Some(session) if session.can_edit() => Ok(session),
            Some(_) => Err(SiteError::Forbidden("editing requires an admin or editor")),
            None => Err(SiteError::Forbidden("editing requires a session")),
        }
    }
}
