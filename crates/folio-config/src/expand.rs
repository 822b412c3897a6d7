//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// Returns the original string unchanged if no `${` is present. Bare `$VAR`
/// is left alone so that literal dollar signs in URLs survive.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("FOLIO_TEST_HOST", "example.com");
        }
        let result = expand_env("https://${FOLIO_TEST_HOST}/site", "site.url").unwrap();
        assert_eq!(result, "https://example.com/site");
        unsafe {
            std::env::remove_var("FOLIO_TEST_HOST");
        }
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("FOLIO_TEST_MISSING");
        }
        let err = expand_env("${FOLIO_TEST_MISSING}", "storage.data_dir").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("FOLIO_TEST_MISSING"));
        assert!(err.to_string().contains("storage.data_dir"));
    }

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(expand_env("data/pages", "f").unwrap(), "data/pages");
        assert_eq!(expand_env("$HOME/pages", "f").unwrap(), "$HOME/pages");
    }
}
