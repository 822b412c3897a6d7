//! Field-level validation of block content.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::schema::{FieldDescriptor, FieldKind, FieldValidation};

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#[0-9a-fA-F]{3,8}|[a-zA-Z]+)$").unwrap());

/// Why a field value was rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationReason {
    /// Key is not declared by the block definition.
    UnknownField,
    /// Required field is missing or empty.
    Required,
    /// Value has the wrong JSON type for the field kind.
    WrongType { expected: &'static str },
    /// Select value is not one of the declared options.
    NotAnOption { allowed: Vec<String> },
    BelowMin { min: f64 },
    AboveMax { max: f64 },
    TooShort { min: usize },
    TooLong { max: usize },
    PatternMismatch { pattern: String },
    /// Declared pattern does not compile.
    InvalidPattern { pattern: String },
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField => f.write_str("field is not declared for this block type"),
            Self::Required => f.write_str("value is required"),
            Self::WrongType { expected } => write!(f, "expected {expected}"),
            Self::NotAnOption { allowed } => write!(f, "must be one of: {}", allowed.join(", ")),
            Self::BelowMin { min } => write!(f, "must be at least {min}"),
            Self::AboveMax { max } => write!(f, "must be at most {max}"),
            Self::TooShort { min } => write!(f, "must be at least {min} characters"),
            Self::TooLong { max } => write!(f, "must be at most {max} characters"),
            Self::PatternMismatch { pattern } => write!(f, "must match {pattern}"),
            Self::InvalidPattern { pattern } => write!(f, "invalid pattern {pattern}"),
        }
    }
}

/// Rejected field value.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{key}: {reason}")]
pub struct ValidationError {
    pub key: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub(crate) fn new(key: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            key: key.into(),
            reason,
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Check a value against a field descriptor.
pub(crate) fn validate_value(
    descriptor: &FieldDescriptor,
    value: &Value,
) -> Result<(), ValidationReason> {
    if is_empty(value) {
        return if descriptor.required {
            Err(ValidationReason::Required)
        } else {
            Ok(())
        };
    }

    check_kind(descriptor, value)?;

    match &descriptor.validation {
        Some(rules) => check_rules(rules, value),
        None => Ok(()),
    }
}

fn check_kind(descriptor: &FieldDescriptor, value: &Value) -> Result<(), ValidationReason> {
    match descriptor.kind {
        FieldKind::Text
        | FieldKind::Textarea
        | FieldKind::Image
        | FieldKind::Url => {
            if value.is_string() {
                Ok(())
            } else {
                Err(ValidationReason::WrongType { expected: "string" })
            }
        }
        FieldKind::Number => {
            if value.is_number() {
                Ok(())
            } else {
                Err(ValidationReason::WrongType { expected: "number" })
            }
        }
        FieldKind::Checkbox => {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(ValidationReason::WrongType { expected: "boolean" })
            }
        }
        FieldKind::Color => match value.as_str() {
            Some(s) if COLOR_RE.is_match(s) => Ok(()),
            Some(_) => Err(ValidationReason::WrongType {
                expected: "color (#hex or name)",
            }),
            None => Err(ValidationReason::WrongType { expected: "string" }),
        },
        FieldKind::Select => match value.as_str() {
            Some(s) if descriptor.options.iter().any(|o| o == s) => Ok(()),
            Some(_) => Err(ValidationReason::NotAnOption {
                allowed: descriptor.options.clone(),
            }),
            None => Err(ValidationReason::WrongType { expected: "string" }),
        },
    }
}

fn check_rules(rules: &FieldValidation, value: &Value) -> Result<(), ValidationReason> {
    if let Some(n) = value.as_f64() {
        if let Some(min) = rules.min
            && n < min
        {
            return Err(ValidationReason::BelowMin { min });
        }
        if let Some(max) = rules.max
            && n > max
        {
            return Err(ValidationReason::AboveMax { max });
        }
    }

    if let Some(s) = value.as_str() {
        let len = s.chars().count();
        if let Some(min) = rules.min_length
            && len < min
        {
            return Err(ValidationReason::TooShort { min });
        }
        if let Some(max) = rules.max_length
            && len > max
        {
            return Err(ValidationReason::TooLong { max });
        }
        if let Some(pattern) = &rules.pattern {
            let re = Regex::new(pattern).map_err(|_| ValidationReason::InvalidPattern {
                pattern: pattern.clone(),
            })?;
            if !re.is_match(s) {
                return Err(ValidationReason::PatternMismatch {
                    pattern: pattern.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn text_field() -> FieldDescriptor {
        FieldDescriptor::new("text", "Text", FieldKind::Text)
    }

    #[test]
    fn test_required_rejects_blank() {
        let field = text_field().required();

        assert_eq!(validate_value(&field, &json!("   ")), Err(ValidationReason::Required));
        assert_eq!(validate_value(&field, &Value::Null), Err(ValidationReason::Required));
        assert_eq!(validate_value(&field, &json!("hi")), Ok(()));
    }

    #[test]
    fn test_optional_empty_skips_checks() {
        let field = text_field().validation(FieldValidation {
            min_length: Some(3),
            ..FieldValidation::default()
        });

        assert_eq!(validate_value(&field, &json!("")), Ok(()));
    }

    #[test]
    fn test_wrong_type() {
        let number = FieldDescriptor::new("n", "N", FieldKind::Number);
        let flag = FieldDescriptor::new("f", "F", FieldKind::Checkbox);

        assert_eq!(
            validate_value(&number, &json!("12")),
            Err(ValidationReason::WrongType { expected: "number" })
        );
        assert_eq!(
            validate_value(&flag, &json!(1)),
            Err(ValidationReason::WrongType { expected: "boolean" })
        );
        assert_eq!(
            validate_value(&text_field(), &json!(3)),
            Err(ValidationReason::WrongType { expected: "string" })
        );
    }

    #[test]
    fn test_select_requires_declared_option() {
        let field = FieldDescriptor::new("level", "Level", FieldKind::Select).options(&["h1", "h2"]);

        assert_eq!(validate_value(&field, &json!("h2")), Ok(()));
        assert_eq!(
            validate_value(&field, &json!("h9")),
            Err(ValidationReason::NotAnOption {
                allowed: vec!["h1".to_owned(), "h2".to_owned()]
            })
        );
    }

    #[test]
    fn test_color_accepts_hex_and_names() {
        let field = FieldDescriptor::new("color", "Color", FieldKind::Color);

        assert_eq!(validate_value(&field, &json!("#e5e7eb")), Ok(()));
        assert_eq!(validate_value(&field, &json!("#fff")), Ok(()));
        assert_eq!(validate_value(&field, &json!("rebeccapurple")), Ok(()));
        assert!(validate_value(&field, &json!("url(javascript:x)")).is_err());
    }

    #[test]
    fn test_numeric_range() {
        let field = FieldDescriptor::new("columns", "Columns", FieldKind::Number).validation(
            FieldValidation {
                min: Some(1.0),
                max: Some(6.0),
                ..FieldValidation::default()
            },
        );

        assert_eq!(validate_value(&field, &json!(3)), Ok(()));
        assert_eq!(
            validate_value(&field, &json!(0)),
            Err(ValidationReason::BelowMin { min: 1.0 })
        );
        assert_eq!(
            validate_value(&field, &json!(7)),
            Err(ValidationReason::AboveMax { max: 6.0 })
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let field = text_field().validation(FieldValidation {
            max_length: Some(3),
            ..FieldValidation::default()
        });

        assert_eq!(validate_value(&field, &json!("äöü")), Ok(()));
        assert_eq!(
            validate_value(&field, &json!("abcd")),
            Err(ValidationReason::TooLong { max: 3 })
        );
    }

    #[test]
    fn test_pattern() {
        let field = text_field().validation(FieldValidation {
            pattern: Some(r"^\d+(px|%)?$".to_owned()),
            ..FieldValidation::default()
        });

        assert_eq!(validate_value(&field, &json!("100%")), Ok(()));
        assert_eq!(
            validate_value(&field, &json!("wide")),
            Err(ValidationReason::PatternMismatch {
                pattern: r"^\d+(px|%)?$".to_owned()
            })
        );
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let field = text_field().validation(FieldValidation {
            pattern: Some("(".to_owned()),
            ..FieldValidation::default()
        });

        assert_eq!(
            validate_value(&field, &json!("x")),
            Err(ValidationReason::InvalidPattern {
                pattern: "(".to_owned()
            })
        );
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::new("level", ValidationReason::Required);

        assert_eq!(err.to_string(), "level: value is required");
    }
}
