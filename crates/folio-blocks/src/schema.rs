//! Block schema registry.
//!
//! Each block type is described by a [`BlockDefinition`]: display metadata,
//! the content a fresh block starts with, and the fields an editor may set.
//! The definition is the single source of truth for what valid content means
//! for its type.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::{Block, BlockType, Content};
use crate::validate::{ValidationError, ValidationReason, validate_value};

/// Error returned by registry lookups.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Block type is not registered.
    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),
    /// Category name is not recognised.
    #[error("Unknown block category: {0}")]
    UnknownCategory(String),
    #[error("Invalid field {0}")]
    Validation(#[from] ValidationError),
}

/// Palette category of a block type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Content,
    Media,
    Layout,
    Forms,
    Advanced,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Media => "media",
            Self::Layout => "layout",
            Self::Forms => "forms",
            Self::Advanced => "advanced",
        }
    }
}

impl FromStr for Category {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(Self::Content),
            "media" => Ok(Self::Media),
            "layout" => Ok(Self::Layout),
            "forms" => Ok(Self::Forms),
            "advanced" => Ok(Self::Advanced),
            other => Err(SchemaError::UnknownCategory(other.to_owned())),
        }
    }
}

/// Editor widget kind for a field. Also determines the accepted JSON type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Select,
    Checkbox,
    Color,
    Image,
    Url,
}

/// Declared constraints on a field value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    /// Minimum numeric value (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum numeric value (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regular expression a string value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Minimum string length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum string length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// Editable field of a block type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Allowed values for [`FieldKind::Select`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: false,
            options: Vec::new(),
            placeholder: None,
            validation: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|&o| o.to_owned()).collect();
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }
}

/// Schema registry entry for one block type.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDefinition {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Display name for the palette.
    pub name: String,
    /// Icon identifier for the palette.
    pub icon: String,
    pub category: Category,
    /// Content assigned to a freshly instantiated block.
    pub default_content: Content,
    /// Editable fields in display order.
    pub editable_fields: Vec<FieldDescriptor>,
    /// Keys written by the system rather than the editor. Tolerated in
    /// content without a field descriptor.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub computed_keys: Vec<String>,
}

impl BlockDefinition {
    #[must_use]
    pub fn new(
        block_type: BlockType,
        name: impl Into<String>,
        icon: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            block_type,
            name: name.into(),
            icon: icon.into(),
            category,
            default_content: Content::new(),
            editable_fields: Vec::new(),
            computed_keys: Vec::new(),
        }
    }

    /// Add an editable field together with its default value.
    #[must_use]
    pub fn field(mut self, descriptor: FieldDescriptor, default: Value) -> Self {
        self.default_content.insert(descriptor.key.clone(), default);
        self.editable_fields.push(descriptor);
        self
    }

    #[must_use]
    pub fn computed_key(mut self, key: impl Into<String>) -> Self {
        self.computed_keys.push(key.into());
        self
    }

    /// Look up an editable field by key.
    #[must_use]
    pub fn descriptor(&self, key: &str) -> Option<&FieldDescriptor> {
        self.editable_fields.iter().find(|f| f.key == key)
    }

    /// Whether `key` may appear in content of this type.
    #[must_use]
    pub fn declares(&self, key: &str) -> bool {
        self.descriptor(key).is_some() || self.computed_keys.iter().any(|k| k == key)
    }

    /// Validate one field value against this definition.
    ///
    /// Computed keys are accepted as-is. Undeclared keys are rejected.
    pub fn validate_field(&self, key: &str, value: &Value) -> Result<(), ValidationError> {
        match self.descriptor(key) {
            Some(descriptor) => validate_value(descriptor, value)
                .map_err(|reason| ValidationError::new(key, reason)),
            None if self.declares(key) => Ok(()),
            None => Err(ValidationError::new(key, ValidationReason::UnknownField)),
        }
    }
}

/// Catalog of block types.
///
/// Definitions are kept in registration order; lookups go through an index.
/// Build the registry at startup and share it by reference afterwards.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    definitions: Vec<BlockDefinition>,
    index: HashMap<BlockType, usize>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in block types.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for definition in crate::builtin::definitions() {
            registry.register(definition);
        }
        registry
    }

    /// Register a definition.
    ///
    /// Re-registering a type replaces its definition in place, keeping its
    /// palette position.
    pub fn register(&mut self, definition: BlockDefinition) {
        if let Some(&idx) = self.index.get(&definition.block_type) {
            self.definitions[idx] = definition;
            return;
        }
        self.index
            .insert(definition.block_type.clone(), self.definitions.len());
        self.definitions.push(definition);
    }

    /// Look up the definition for a block type.
    pub fn get_definition(&self, block_type: &BlockType) -> Result<&BlockDefinition, SchemaError> {
        self.index
            .get(block_type)
            .map(|&idx| &self.definitions[idx])
            .ok_or_else(|| SchemaError::UnknownBlockType(block_type.as_str().to_owned()))
    }

    /// List definitions in registration order, optionally filtered by category.
    #[must_use]
    pub fn list_definitions(&self, category: Option<Category>) -> Vec<&BlockDefinition> {
        self.definitions
            .iter()
            .filter(|d| category.is_none_or(|c| d.category == c))
            .collect()
    }

    /// Create a new block of the given type.
    ///
    /// The block gets a fresh id and a deep copy of the default content. Its
    /// `order` is left unset for the caller to assign.
    pub fn instantiate(&self, block_type: &BlockType) -> Result<Block, SchemaError> {
        let definition = self.get_definition(block_type)?;
        Ok(Block::new(
            block_type.clone(),
            definition.default_content.clone(),
        ))
    }

    /// Validate one field value for a block type.
    pub fn validate_field(
        &self,
        block_type: &BlockType,
        key: &str,
        value: &Value,
    ) -> Result<(), SchemaError> {
        self.get_definition(block_type)?
            .validate_field(key, value)
            .map_err(SchemaError::from)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_builtin_registers_every_known_type() {
        let registry = SchemaRegistry::builtin();

        assert_eq!(registry.len(), BlockType::ALL.len());
        for block_type in BlockType::ALL {
            assert!(registry.get_definition(&block_type).is_ok(), "{block_type}");
        }
    }

    #[test]
    fn test_get_definition_unknown_type() {
        let registry = SchemaRegistry::builtin();

        let err = registry
            .get_definition(&BlockType::Unknown("carousel".to_owned()))
            .unwrap_err();

        assert!(matches!(err, SchemaError::UnknownBlockType(name) if name == "carousel"));
    }

    #[test]
    fn test_list_definitions_keeps_registration_order() {
        let registry = SchemaRegistry::builtin();

        let types: Vec<_> = registry
            .list_definitions(None)
            .iter()
            .map(|d| d.block_type.clone())
            .collect();

        assert_eq!(types, BlockType::ALL.to_vec());
    }

    #[test]
    fn test_list_definitions_filters_by_category() {
        let registry = SchemaRegistry::builtin();

        let media: Vec<_> = registry
            .list_definitions(Some(Category::Media))
            .iter()
            .map(|d| d.block_type.clone())
            .collect();

        assert_eq!(
            media,
            vec![BlockType::Image, BlockType::Video, BlockType::Gallery]
        );
    }

    #[test]
    fn test_instantiate_copies_default_content() {
        let registry = SchemaRegistry::builtin();

        let a = registry.instantiate(&BlockType::Heading).unwrap();
        let b = registry.instantiate(&BlockType::Heading).unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(a.order(), None);
        assert_eq!(a.content(), &registry.get_definition(&BlockType::Heading).unwrap().default_content);
        assert_eq!(a.text("level"), Some("h2"));
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = SchemaRegistry::builtin();
        let replacement = BlockDefinition::new(BlockType::Text, "Paragraph", "Pilcrow", Category::Content)
            .field(FieldDescriptor::new("text", "Body", FieldKind::Textarea), json!(""));

        registry.register(replacement);

        let listed = registry.list_definitions(None);
        assert_eq!(registry.len(), BlockType::ALL.len());
        assert_eq!(listed[1].name, "Paragraph");
    }

    #[test]
    fn test_validate_field_undeclared_key() {
        let registry = SchemaRegistry::builtin();
        let heading = registry.get_definition(&BlockType::Heading).unwrap();

        let err = heading.validate_field("colour", &json!("red")).unwrap_err();

        assert_eq!(err.key, "colour");
        assert_eq!(err.reason, ValidationReason::UnknownField);
    }

    #[test]
    fn test_validate_field_computed_key_accepted() {
        let registry = SchemaRegistry::builtin();
        let video = registry.get_definition(&BlockType::Video).unwrap();

        assert!(video.declares("thumbnail"));
        assert!(video.validate_field("thumbnail", &json!(42)).is_ok());
    }

    #[test]
    fn test_registry_validate_field() {
        let registry = SchemaRegistry::builtin();

        assert!(
            registry
                .validate_field(&BlockType::Heading, "level", &json!("h2"))
                .is_ok()
        );
        let err = registry
            .validate_field(&BlockType::Heading, "level", &json!("h9"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::Validation(e) if e.key == "level"));
        let err = registry
            .validate_field(&BlockType::Unknown("carousel".to_owned()), "text", &json!("x"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownBlockType(_)));
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("layout".parse::<Category>().unwrap(), Category::Layout);
        assert!("widgets".parse::<Category>().is_err());
    }
}
