//! Output tree produced by the renderer.
//!
//! Nodes hold display-ready values: URLs are already checked, rich text is
//! already sanitized, and every enumerated attribute has been resolved to a
//! known variant.

use folio_blocks::BlockId;
#[cfg(feature = "serde")]
use serde::Serialize;

/// Horizontal alignment of a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Parse an alignment name, falling back to [`Alignment::Left`].
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("center") => Self::Center,
            Some("right") => Self::Right,
            _ => Self::Left,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Visual style of a button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Outline,
}

impl ButtonStyle {
    /// Parse a style name. Unrecognised values fall back to [`ButtonStyle::Outline`].
    #[must_use]
    pub fn parse_or_outline(value: Option<&str>) -> Self {
        match value {
            Some("primary") => Self::Primary,
            Some("secondary") => Self::Secondary,
            _ => Self::Outline,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Outline => "outline",
        }
    }
}

/// Button size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum ButtonSize {
    Sm,
    #[default]
    Md,
    Lg,
}

impl ButtonSize {
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("sm") => Self::Sm,
            Some("lg") => Self::Lg,
            _ => Self::Md,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
        }
    }
}

/// Line style of a separator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("dashed") => Self::Dashed,
            Some("dotted") => Self::Dotted,
            _ => Self::Solid,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct HeadingNode {
    pub block_id: BlockId,
    /// 1 through 6.
    pub level: u8,
    pub text: String,
    pub alignment: Alignment,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct RichTextNode {
    pub block_id: BlockId,
    /// Sanitized markup.
    pub html: String,
    pub alignment: Alignment,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct ImageNode {
    pub block_id: BlockId,
    pub src: String,
    /// Always present; empty when the editor left it blank.
    pub alt: String,
    pub caption: Option<String>,
    pub width: String,
    pub alignment: Alignment,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct ButtonNode {
    pub block_id: BlockId,
    pub text: String,
    pub url: String,
    pub style: ButtonStyle,
    pub size: ButtonSize,
    pub alignment: Alignment,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct SeparatorNode {
    pub block_id: BlockId,
    pub style: LineStyle,
    pub width: String,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct VideoNode {
    pub block_id: BlockId,
    pub url: String,
    /// Player URL for recognised hosts.
    pub embed_url: Option<String>,
    pub title: String,
    pub autoplay: bool,
    pub controls: bool,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct FormNode {
    pub block_id: BlockId,
    pub form_id: String,
    pub title: String,
    pub submit_text: String,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct GalleryNode {
    pub block_id: BlockId,
    pub images: Vec<String>,
    pub columns: u8,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct SpacerNode {
    pub block_id: BlockId,
    /// Pixels.
    pub height: u32,
}

/// Call-to-action link.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct Link {
    pub text: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct HeroNode {
    pub block_id: BlockId,
    pub title: String,
    pub subtitle: String,
    pub background_image: Option<String>,
    pub cta: Option<Link>,
    pub alignment: Alignment,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct TestimonialNode {
    pub block_id: BlockId,
    pub quote: String,
    pub author: String,
    pub role: String,
    pub avatar: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct ColumnsNode {
    pub block_id: BlockId,
    pub count: u8,
    pub gap: String,
    pub children: Vec<RenderNode>,
}

/// One labelled section of an accordion or tab set.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct Panel {
    pub label: String,
    pub content: RenderNode,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct AccordionNode {
    pub block_id: BlockId,
    pub allow_multiple: bool,
    pub panels: Vec<Panel>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct TabsNode {
    pub block_id: BlockId,
    pub panels: Vec<Panel>,
}

/// One rendered block.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum RenderNode {
    Heading(HeadingNode),
    RichText(RichTextNode),
    Image(ImageNode),
    Button(ButtonNode),
    Separator(SeparatorNode),
    Video(VideoNode),
    Form(FormNode),
    Gallery(GalleryNode),
    Spacer(SpacerNode),
    Hero(HeroNode),
    Testimonial(TestimonialNode),
    Columns(ColumnsNode),
    Accordion(AccordionNode),
    Tabs(TabsNode),
}

impl RenderNode {
    /// Id of the block this node was rendered from.
    #[must_use]
    pub fn block_id(&self) -> BlockId {
        match self {
            Self::Heading(n) => n.block_id,
            Self::RichText(n) => n.block_id,
            Self::Image(n) => n.block_id,
            Self::Button(n) => n.block_id,
            Self::Separator(n) => n.block_id,
            Self::Video(n) => n.block_id,
            Self::Form(n) => n.block_id,
            Self::Gallery(n) => n.block_id,
            Self::Spacer(n) => n.block_id,
            Self::Hero(n) => n.block_id,
            Self::Testimonial(n) => n.block_id,
            Self::Columns(n) => n.block_id,
            Self::Accordion(n) => n.block_id,
            Self::Tabs(n) => n.block_id,
        }
    }
}
