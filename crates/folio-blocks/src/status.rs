//! Page publication status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Publication status of a page.
///
/// Permitted transitions: draft to published (publish), published to draft
/// (unpublish), published to archived (archive), and archived to draft
/// (restore). Only published pages are publicly visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PageStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    /// Whether moving from `self` to `to` is a permitted transition.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Draft, Self::Published)
                | (Self::Published, Self::Draft | Self::Archived)
                | (Self::Archived, Self::Draft)
        )
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised status name.
#[derive(Debug, thiserror::Error)]
#[error("Unknown page status: {0}")]
pub struct ParseStatusError(String);

impl FromStr for PageStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(ParseStatusError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_permitted_transitions() {
        use PageStatus::{Archived, Draft, Published};

        let permitted = [
            (Draft, Published),
            (Published, Draft),
            (Published, Archived),
            (Archived, Draft),
        ];
        for from in [Draft, Published, Archived] {
            for to in [Draft, Published, Archived] {
                assert_eq!(
                    from.can_transition_to(to),
                    permitted.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("archived".parse::<PageStatus>().unwrap(), PageStatus::Archived);
        assert_eq!(PageStatus::Published.to_string(), "published");
        assert!("deleted".parse::<PageStatus>().is_err());
    }

    #[test]
    fn test_default_is_draft() {
        assert_eq!(PageStatus::default(), PageStatus::Draft);
    }
}
