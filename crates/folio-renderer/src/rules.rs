//! Rendering rules for the built-in block types.

use std::collections::HashMap;
use std::sync::LazyLock;

use folio_blocks::{Block, BlockType};
use regex::Regex;
use serde_json::Value;

use crate::node::{
    AccordionNode, Alignment, ButtonNode, ButtonSize, ButtonStyle, ColumnsNode, FormNode,
    GalleryNode, HeadingNode, HeroNode, ImageNode, LineStyle, Link, Panel, RenderNode,
    RichTextNode, SeparatorNode, SpacerNode, TabsNode, TestimonialNode, VideoNode,
};
use crate::renderer::{RenderContext, RenderRule};
use crate::sanitize::{safe_url, sanitize_html};

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.|m\.)?(?:youtube\.com/watch\?(?:[^#]*&)?v=|youtu\.be/|youtube\.com/embed/)([A-Za-z0-9_-]{6,})",
    )
    .unwrap()
});

static VIMEO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(?:www\.)?vimeo\.com/(\d+)").unwrap());

static CSS_LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?(px|%|rem|em)?$").unwrap());

static CSS_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#[0-9a-fA-F]{3,8}|[a-zA-Z]+)$").unwrap());

pub(crate) fn builtin() -> HashMap<BlockType, RenderRule> {
    let rules: [(BlockType, RenderRule); 14] = [
        (BlockType::Heading, heading),
        (BlockType::Text, text),
        (BlockType::Image, image),
        (BlockType::Button, button),
        (BlockType::Separator, separator),
        (BlockType::Video, video),
        (BlockType::Form, form),
        (BlockType::Gallery, gallery),
        (BlockType::Spacer, spacer),
        (BlockType::Columns, columns),
        (BlockType::Hero, hero),
        (BlockType::Testimonial, testimonial),
        (BlockType::Accordion, accordion),
        (BlockType::Tabs, tabs),
    ];
    rules.into_iter().collect()
}

fn alignment(block: &Block, ctx: &RenderContext<'_>) -> Alignment {
    Alignment::parse_or_default(ctx.text(block, "alignment"))
}

/// Optional string field; blank strings count as absent.
fn optional(block: &Block, ctx: &RenderContext<'_>, key: &str) -> Option<String> {
    ctx.text(block, key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

fn string_or_empty(block: &Block, ctx: &RenderContext<'_>, key: &str) -> String {
    ctx.text(block, key).unwrap_or_default().to_owned()
}

/// Optional URL field; unsafe or blank URLs count as absent.
fn optional_url(block: &Block, ctx: &RenderContext<'_>, key: &str) -> Option<String> {
    ctx.text(block, key)
        .and_then(safe_url)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

/// Link target; unsafe or blank URLs become `#`.
fn link_url(block: &Block, ctx: &RenderContext<'_>, key: &str) -> String {
    optional_url(block, ctx, key).unwrap_or_else(|| "#".to_owned())
}

/// Integer field clamped to `min..=max`.
fn bounded(block: &Block, ctx: &RenderContext<'_>, key: &str, min: u64, max: u64, default: u64) -> u64 {
    ctx.value(block, key)
        .and_then(Value::as_u64)
        .unwrap_or(default)
        .clamp(min, max)
}

fn flag(block: &Block, ctx: &RenderContext<'_>, key: &str, default: bool) -> bool {
    ctx.value(block, key)
        .and_then(Value::as_bool)
        .unwrap_or(default)
}

/// CSS length, with bare numbers read as pixels.
fn css_length(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if CSS_LENGTH_RE.is_match(v) => {
            if v.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
                format!("{v}px")
            } else {
                v.to_owned()
            }
        }
        _ => default.to_owned(),
    }
}

/// Heading level from `"h1"`..`"h6"` or `1`..`6`.
fn heading_level(value: Option<&Value>) -> u8 {
    let level = match value {
        Some(Value::String(s)) => s.strip_prefix('h').and_then(|n| n.parse::<u8>().ok()),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        _ => None,
    };
    level.filter(|l| (1..=6).contains(l)).unwrap_or(2)
}

/// Player URL for YouTube and Vimeo links.
pub(crate) fn embed_url(url: &str) -> Option<String> {
    if let Some(caps) = YOUTUBE_RE.captures(url) {
        return Some(format!("https://www.youtube.com/embed/{}", &caps[1]));
    }
    VIMEO_RE
        .captures(url)
        .map(|caps| format!("https://player.vimeo.com/video/{}", &caps[1]))
}

/// Panels for a tabbed or collapsible container.
///
/// Labels come from the newline-separated `labels` field, matched to the
/// ordered children by position; missing labels fall back to
/// `"{fallback} {n}"`.
fn panels(block: &Block, ctx: &RenderContext<'_>, fallback: &str) -> Vec<Panel> {
    let labels: Vec<&str> = ctx
        .text(block, "labels")
        .map(|s| s.lines().map(str::trim).collect())
        .unwrap_or_default();

    block
        .ordered_children()
        .into_iter()
        .enumerate()
        .filter_map(|(idx, child)| {
            let content = ctx.render_block(child)?;
            let label = labels
                .get(idx)
                .filter(|l| !l.is_empty())
                .map_or_else(|| format!("{fallback} {}", idx + 1), |l| (*l).to_owned());
            Some(Panel { label, content })
        })
        .collect()
}

fn heading(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    Some(RenderNode::Heading(HeadingNode {
        block_id: block.id(),
        level: heading_level(ctx.value(block, "level")),
        text: ctx.text(block, "text")?.to_owned(),
        alignment: alignment(block, ctx),
    }))
}

fn text(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    Some(RenderNode::RichText(RichTextNode {
        block_id: block.id(),
        html: sanitize_html(ctx.text(block, "text")?),
        alignment: alignment(block, ctx),
    }))
}

fn image(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    Some(RenderNode::Image(ImageNode {
        block_id: block.id(),
        src: optional_url(block, ctx, "src").unwrap_or_default(),
        alt: string_or_empty(block, ctx, "alt"),
        caption: optional(block, ctx, "caption"),
        width: css_length(ctx.text(block, "width"), "100%"),
        alignment: alignment(block, ctx),
    }))
}

fn button(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    Some(RenderNode::Button(ButtonNode {
        block_id: block.id(),
        text: ctx.text(block, "text")?.to_owned(),
        url: link_url(block, ctx, "url"),
        style: ButtonStyle::parse_or_outline(ctx.text(block, "style")),
        size: ButtonSize::parse_or_default(ctx.text(block, "size")),
        alignment: alignment(block, ctx),
    }))
}

fn separator(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    let color = ctx
        .text(block, "color")
        .filter(|c| CSS_COLOR_RE.is_match(c))
        .unwrap_or("#e5e7eb");
    Some(RenderNode::Separator(SeparatorNode {
        block_id: block.id(),
        style: LineStyle::parse_or_default(ctx.text(block, "style")),
        width: css_length(ctx.text(block, "width"), "100%"),
        color: color.to_owned(),
    }))
}

fn video(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    let url = optional_url(block, ctx, "url").unwrap_or_default();
    Some(RenderNode::Video(VideoNode {
        block_id: block.id(),
        embed_url: embed_url(&url),
        url,
        title: string_or_empty(block, ctx, "title"),
        autoplay: flag(block, ctx, "autoplay", false),
        controls: flag(block, ctx, "controls", true),
    }))
}

fn form(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    Some(RenderNode::Form(FormNode {
        block_id: block.id(),
        form_id: string_or_empty(block, ctx, "formId"),
        title: string_or_empty(block, ctx, "title"),
        submit_text: optional(block, ctx, "submitText").unwrap_or_else(|| "Submit".to_owned()),
    }))
}

fn gallery(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    let images = match ctx.value(block, "images") {
        Some(Value::String(s)) => s
            .lines()
            .filter_map(safe_url)
            .filter(|u| !u.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(safe_url)
            .filter(|u| !u.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        _ => Vec::new(),
    };
    let columns = bounded(block, ctx, "columns", 1, 6, 3);
    Some(RenderNode::Gallery(GalleryNode {
        block_id: block.id(),
        images,
        columns: u8::try_from(columns).unwrap_or(3),
    }))
}

fn spacer(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    let height = bounded(block, ctx, "height", 0, 400, 32);
    Some(RenderNode::Spacer(SpacerNode {
        block_id: block.id(),
        height: u32::try_from(height).unwrap_or(32),
    }))
}

fn columns(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    let count = bounded(block, ctx, "count", 1, 4, 2);
    Some(RenderNode::Columns(ColumnsNode {
        block_id: block.id(),
        count: u8::try_from(count).unwrap_or(2),
        gap: css_length(ctx.text(block, "gap"), "1rem"),
        children: ctx.render_children(block),
    }))
}

fn hero(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    let cta = optional(block, ctx, "ctaText").map(|text| Link {
        text,
        url: link_url(block, ctx, "ctaUrl"),
    });
    Some(RenderNode::Hero(HeroNode {
        block_id: block.id(),
        title: ctx.text(block, "title")?.to_owned(),
        subtitle: string_or_empty(block, ctx, "subtitle"),
        background_image: optional_url(block, ctx, "backgroundImage"),
        cta,
        alignment: alignment(block, ctx),
    }))
}

fn testimonial(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    Some(RenderNode::Testimonial(TestimonialNode {
        block_id: block.id(),
        quote: ctx.text(block, "quote")?.to_owned(),
        author: string_or_empty(block, ctx, "author"),
        role: string_or_empty(block, ctx, "role"),
        avatar: optional_url(block, ctx, "avatar"),
    }))
}

fn accordion(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    Some(RenderNode::Accordion(AccordionNode {
        block_id: block.id(),
        allow_multiple: flag(block, ctx, "allowMultiple", false),
        panels: panels(block, ctx, "Item"),
    }))
}

fn tabs(block: &Block, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    Some(RenderNode::Tabs(TabsNode {
        block_id: block.id(),
        panels: panels(block, ctx, "Tab"),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use folio_blocks::{Document, SchemaRegistry};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::Renderer;

    fn render_one(block_type: BlockType, content: Value) -> RenderNode {
        let registry = Arc::new(SchemaRegistry::builtin());
        let mut doc = Document::new("Page", "page").unwrap();
        doc.add_block(&registry, block_type, None).unwrap();
        let mut value = serde_json::to_value(&doc).unwrap();
        if let Value::Object(fields) = content {
            for (key, field) in fields {
                value["content"][0]["content"][key] = field;
            }
        }
        let doc: Document = serde_json::from_value(value).unwrap();
        Renderer::new(registry).render(&doc).remove(0)
    }

    #[test]
    fn test_heading_level_forms() {
        assert_eq!(heading_level(Some(&json!("h4"))), 4);
        assert_eq!(heading_level(Some(&json!(3))), 3);
        assert_eq!(heading_level(Some(&json!("h9"))), 2);
        assert_eq!(heading_level(Some(&json!(0))), 2);
        assert_eq!(heading_level(None), 2);
    }

    #[test]
    fn test_css_length() {
        assert_eq!(css_length(Some("50%"), "100%"), "50%");
        assert_eq!(css_length(Some("320"), "100%"), "320px");
        assert_eq!(css_length(Some("1.5rem"), "1rem"), "1.5rem");
        assert_eq!(css_length(Some("calc(1px)"), "100%"), "100%");
        assert_eq!(css_length(None, "1rem"), "1rem");
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ".to_owned())
        );
        assert_eq!(
            embed_url("https://youtu.be/dQw4w9WgXcQ"),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ".to_owned())
        );
        assert_eq!(
            embed_url("https://vimeo.com/76979871"),
            Some("https://player.vimeo.com/video/76979871".to_owned())
        );
        assert_eq!(embed_url("https://example.com/clip.mp4"), None);
    }

    #[test]
    fn test_gallery_splits_lines_and_drops_unsafe() {
        let node = render_one(
            BlockType::Gallery,
            json!({"images": "/a.png\n\njavascript:x\nhttps://cdn.example.com/b.jpg", "columns": 9}),
        );

        let RenderNode::Gallery(gallery) = node else {
            panic!("expected gallery");
        };
        assert_eq!(gallery.images, vec!["/a.png", "https://cdn.example.com/b.jpg"]);
        assert_eq!(gallery.columns, 6);
    }

    #[test]
    fn test_hero_cta_only_with_text() {
        let without = render_one(BlockType::Hero, json!({}));
        let with = render_one(BlockType::Hero, json!({"ctaText": "Start", "ctaUrl": "/signup"}));

        let RenderNode::Hero(without) = without else {
            panic!("expected hero");
        };
        let RenderNode::Hero(with) = with else {
            panic!("expected hero");
        };
        assert_eq!(without.cta, None);
        assert_eq!(
            with.cta,
            Some(Link {
                text: "Start".to_owned(),
                url: "/signup".to_owned()
            })
        );
    }

    #[test]
    fn test_separator_rejects_css_injection() {
        let node = render_one(
            BlockType::Separator,
            json!({"color": "red; background:url(x)", "style": "wavy"}),
        );

        let RenderNode::Separator(separator) = node else {
            panic!("expected separator");
        };
        assert_eq!(separator.color, "#e5e7eb");
        assert_eq!(separator.style, LineStyle::Solid);
    }

    #[test]
    fn test_missing_keys_use_schema_defaults() {
        let registry = Arc::new(SchemaRegistry::builtin());
        let mut doc = Document::new("Page", "page").unwrap();
        doc.add_block(&registry, BlockType::Spacer, None).unwrap();
        let mut value = serde_json::to_value(&doc).unwrap();
        value["content"][0]["content"] = json!({});
        let doc: Document = serde_json::from_value(value).unwrap();

        let nodes = Renderer::new(registry).render(&doc);

        let RenderNode::Spacer(spacer) = &nodes[0] else {
            panic!("expected spacer");
        };
        assert_eq!(spacer.height, 32);
    }

    #[test]
    fn test_tabs_labels() {
        let registry = Arc::new(SchemaRegistry::builtin());
        let mut doc = Document::new("Page", "page").unwrap();
        let tabs = doc.add_block(&registry, BlockType::Tabs, None).unwrap().id();
        for _ in 0..3 {
            doc.add_child_block(&registry, tabs, BlockType::Text, None)
                .unwrap();
        }

        let nodes = Renderer::new(registry).render(&doc);

        let RenderNode::Tabs(node) = &nodes[0] else {
            panic!("expected tabs");
        };
        let labels: Vec<_> = node.panels.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Tab 1", "Tab 2", "Tab 3"]);
    }
}
