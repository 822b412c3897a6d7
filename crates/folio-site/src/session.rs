//! Editor session.
//!
//! The session is read once at startup from a JSON file and then passed
//! explicitly to the operations that need it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Role of the signed-in user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Signed-in user context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
}

/// Error loading a session file.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to read session file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid session file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Session {
    #[must_use]
    pub fn new(user: User) -> Self {
        Self { user }
    }

    /// Read a session from a JSON file of the form `{"user": {...}}`.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SessionError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether the user may view unpublished pages.
    #[must_use]
    pub fn can_preview(&self) -> bool {
        matches!(self.user.role, Role::Admin | Role::Editor)
    }

    /// Whether the user may change pages.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.can_preview()
    }
}
