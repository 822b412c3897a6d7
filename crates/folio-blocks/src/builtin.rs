//! Built-in block definitions.

use serde_json::json;

use crate::block::BlockType;
use crate::schema::{BlockDefinition, Category, FieldDescriptor, FieldKind, FieldValidation};

const ALIGNMENTS: &[&str] = &["left", "center", "right"];

fn alignment() -> FieldDescriptor {
    FieldDescriptor::new("alignment", "Alignment", FieldKind::Select).options(ALIGNMENTS)
}

fn range(min: f64, max: f64) -> FieldValidation {
    FieldValidation {
        min: Some(min),
        max: Some(max),
        ..FieldValidation::default()
    }
}

fn max_length(max: usize) -> FieldValidation {
    FieldValidation {
        max_length: Some(max),
        ..FieldValidation::default()
    }
}

fn css_size() -> FieldValidation {
    FieldValidation {
        pattern: Some(r"^\d+(px|%)?$".to_owned()),
        ..FieldValidation::default()
    }
}

/// Definitions for every known block type, in palette order.
pub(crate) fn definitions() -> Vec<BlockDefinition> {
    vec![
        heading(),
        text(),
        image(),
        button(),
        separator(),
        video(),
        form(),
        gallery(),
        spacer(),
        columns(),
        hero(),
        testimonial(),
        accordion(),
        tabs(),
    ]
}

fn heading() -> BlockDefinition {
    BlockDefinition::new(BlockType::Heading, "Heading", "Heading", Category::Content)
        .field(
            FieldDescriptor::new("text", "Text", FieldKind::Text)
                .required()
                .placeholder("Enter heading text")
                .validation(max_length(200)),
            json!("Your Heading Here"),
        )
        .field(
            FieldDescriptor::new("level", "Level", FieldKind::Select)
                .required()
                .options(&["h1", "h2", "h3", "h4", "h5", "h6"]),
            json!("h2"),
        )
        .field(alignment(), json!("left"))
}

fn text() -> BlockDefinition {
    BlockDefinition::new(BlockType::Text, "Text", "Type", Category::Content)
        .field(
            FieldDescriptor::new("text", "Content", FieldKind::Textarea)
                .required()
                .placeholder("Start writing..."),
            json!("<p>Start writing your content here...</p>"),
        )
        .field(alignment(), json!("left"))
}

fn image() -> BlockDefinition {
    BlockDefinition::new(BlockType::Image, "Image", "Image", Category::Media)
        .field(
            FieldDescriptor::new("src", "Image", FieldKind::Image).required(),
            json!(""),
        )
        .field(
            FieldDescriptor::new("alt", "Alt text", FieldKind::Text)
                .required()
                .placeholder("Describe the image"),
            json!(""),
        )
        .field(
            FieldDescriptor::new("caption", "Caption", FieldKind::Text),
            json!(""),
        )
        .field(
            FieldDescriptor::new("width", "Width", FieldKind::Text).validation(css_size()),
            json!("100%"),
        )
        .field(alignment(), json!("center"))
}

fn button() -> BlockDefinition {
    BlockDefinition::new(BlockType::Button, "Button", "MousePointer", Category::Content)
        .field(
            FieldDescriptor::new("text", "Label", FieldKind::Text)
                .required()
                .validation(max_length(80)),
            json!("Click me"),
        )
        .field(
            FieldDescriptor::new("url", "Link", FieldKind::Url).required(),
            json!("#"),
        )
        .field(
            FieldDescriptor::new("style", "Style", FieldKind::Select)
                .options(&["primary", "secondary", "outline"]),
            json!("primary"),
        )
        .field(
            FieldDescriptor::new("size", "Size", FieldKind::Select).options(&["sm", "md", "lg"]),
            json!("md"),
        )
        .field(alignment(), json!("left"))
}

fn separator() -> BlockDefinition {
    BlockDefinition::new(BlockType::Separator, "Separator", "Minus", Category::Layout)
        .field(
            FieldDescriptor::new("style", "Style", FieldKind::Select)
                .options(&["solid", "dashed", "dotted"]),
            json!("solid"),
        )
        .field(
            FieldDescriptor::new("width", "Width", FieldKind::Text).validation(css_size()),
            json!("100%"),
        )
        .field(
            FieldDescriptor::new("color", "Color", FieldKind::Color),
            json!("#e5e7eb"),
        )
}

fn video() -> BlockDefinition {
    BlockDefinition::new(BlockType::Video, "Video", "Video", Category::Media)
        .field(
            FieldDescriptor::new("url", "Video URL", FieldKind::Url)
                .required()
                .placeholder("https://www.youtube.com/watch?v=..."),
            json!(""),
        )
        .field(FieldDescriptor::new("title", "Title", FieldKind::Text), json!(""))
        .field(
            FieldDescriptor::new("autoplay", "Autoplay", FieldKind::Checkbox),
            json!(false),
        )
        .field(
            FieldDescriptor::new("controls", "Show controls", FieldKind::Checkbox),
            json!(true),
        )
        .computed_key("thumbnail")
}

fn form() -> BlockDefinition {
    BlockDefinition::new(BlockType::Form, "Form", "FileText", Category::Forms)
        .field(
            FieldDescriptor::new("formId", "Form", FieldKind::Text).placeholder("contact"),
            json!(""),
        )
        .field(FieldDescriptor::new("title", "Title", FieldKind::Text), json!("Contact us"))
        .field(
            FieldDescriptor::new("submitText", "Submit label", FieldKind::Text),
            json!("Submit"),
        )
}

fn gallery() -> BlockDefinition {
    BlockDefinition::new(BlockType::Gallery, "Gallery", "Images", Category::Media)
        .field(
            FieldDescriptor::new("images", "Image URLs (one per line)", FieldKind::Textarea),
            json!(""),
        )
        .field(
            FieldDescriptor::new("columns", "Columns", FieldKind::Number)
                .validation(range(1.0, 6.0)),
            json!(3),
        )
}

fn spacer() -> BlockDefinition {
    BlockDefinition::new(BlockType::Spacer, "Spacer", "MoveVertical", Category::Layout).field(
        FieldDescriptor::new("height", "Height (px)", FieldKind::Number)
            .validation(range(0.0, 400.0)),
        json!(32),
    )
}

fn columns() -> BlockDefinition {
    BlockDefinition::new(BlockType::Columns, "Columns", "Columns", Category::Layout)
        .field(
            FieldDescriptor::new("count", "Columns", FieldKind::Number).validation(range(1.0, 4.0)),
            json!(2),
        )
        .field(FieldDescriptor::new("gap", "Gap", FieldKind::Text), json!("1rem"))
}

fn hero() -> BlockDefinition {
    BlockDefinition::new(BlockType::Hero, "Hero", "Layout", Category::Advanced)
        .field(
            FieldDescriptor::new("title", "Title", FieldKind::Text)
                .required()
                .validation(max_length(120)),
            json!("Welcome"),
        )
        .field(
            FieldDescriptor::new("subtitle", "Subtitle", FieldKind::Textarea),
            json!(""),
        )
        .field(
            FieldDescriptor::new("backgroundImage", "Background image", FieldKind::Image),
            json!(""),
        )
        .field(
            FieldDescriptor::new("ctaText", "Button label", FieldKind::Text),
            json!(""),
        )
        .field(FieldDescriptor::new("ctaUrl", "Button link", FieldKind::Url), json!(""))
        .field(alignment(), json!("center"))
}

fn testimonial() -> BlockDefinition {
    BlockDefinition::new(BlockType::Testimonial, "Testimonial", "Quote", Category::Content)
        .field(
            FieldDescriptor::new("quote", "Quote", FieldKind::Textarea).required(),
            json!("This product changed the way we work."),
        )
        .field(
            FieldDescriptor::new("author", "Author", FieldKind::Text),
            json!("Jane Doe"),
        )
        .field(FieldDescriptor::new("role", "Role", FieldKind::Text), json!(""))
        .field(FieldDescriptor::new("avatar", "Avatar", FieldKind::Image), json!(""))
}

fn accordion() -> BlockDefinition {
    BlockDefinition::new(BlockType::Accordion, "Accordion", "ChevronDown", Category::Layout)
        .field(
            FieldDescriptor::new("labels", "Item labels (one per line)", FieldKind::Textarea),
            json!("Item 1\nItem 2"),
        )
        .field(
            FieldDescriptor::new("allowMultiple", "Allow several open", FieldKind::Checkbox),
            json!(false),
        )
}

fn tabs() -> BlockDefinition {
    BlockDefinition::new(BlockType::Tabs, "Tabs", "PanelTop", Category::Advanced).field(
        FieldDescriptor::new("labels", "Tab labels (one per line)", FieldKind::Textarea),
        json!("Tab 1\nTab 2"),
    )
}
