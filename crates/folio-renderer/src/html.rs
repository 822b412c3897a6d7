//! HTML backend.
//!
//! Produces semantic HTML5. Every block is wrapped in an element carrying
//! `folio-block`, a per-type class and a `data-block-id` attribute. All
//! attribute values and text are escaped; rich text is emitted as-is since
//! the renderer has already sanitized it.

use std::fmt::Write;

use crate::backend::RenderBackend;
use crate::node::{
    AccordionNode, Alignment, ButtonNode, ColumnsNode, FormNode, GalleryNode, HeadingNode,
    HeroNode, ImageNode, RichTextNode, SeparatorNode, SpacerNode, TabsNode, TestimonialNode,
    VideoNode,
};
use crate::sanitize::escape_html;

/// HTML render backend.
pub struct HtmlBackend;

fn align_class(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "align-left",
        Alignment::Center => "align-center",
        Alignment::Right => "align-right",
    }
}

/// Encode a URL for use inside CSS `url('...')`.
fn css_url(url: &str) -> String {
    let mut encoded = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '\'' => encoded.push_str("%27"),
            '"' => encoded.push_str("%22"),
            '(' => encoded.push_str("%28"),
            ')' => encoded.push_str("%29"),
            '\\' => encoded.push_str("%5C"),
            c if c.is_whitespace() => encoded.push_str("%20"),
            c => encoded.push(c),
        }
    }
    encoded
}

impl RenderBackend for HtmlBackend {
    fn heading(node: &HeadingNode, out: &mut String) {
        write!(
            out,
            r#"<h{level} class="folio-block folio-heading {align}" data-block-id="{id}">{text}</h{level}>"#,
            level = node.level,
            align = align_class(node.alignment),
            id = node.block_id,
            text = escape_html(&node.text),
        )
        .unwrap();
    }

    fn rich_text(node: &RichTextNode, out: &mut String) {
        write!(
            out,
            r#"<div class="folio-block folio-text {}" data-block-id="{}">{}</div>"#,
            align_class(node.alignment),
            node.block_id,
            node.html
        )
        .unwrap();
    }

    fn image(node: &ImageNode, out: &mut String) {
        write!(
            out,
            r#"<figure class="folio-block folio-image {}" data-block-id="{}">"#,
            align_class(node.alignment),
            node.block_id
        )
        .unwrap();
        out.push_str("<img");
        if !node.src.is_empty() {
            write!(out, r#" src="{}""#, escape_html(&node.src)).unwrap();
        }
        write!(
            out,
            r#" alt="{}" style="width: {}" loading="lazy">"#,
            escape_html(&node.alt),
            escape_html(&node.width)
        )
        .unwrap();
        if let Some(caption) = &node.caption {
            write!(out, "<figcaption>{}</figcaption>", escape_html(caption)).unwrap();
        }
        out.push_str("</figure>");
    }

    fn button(node: &ButtonNode, out: &mut String) {
        write!(
            out,
            r#"<div class="folio-block folio-button {}" data-block-id="{}"><a class="btn btn-{} btn-{}" href="{}">{}</a></div>"#,
            align_class(node.alignment),
            node.block_id,
            node.style.as_str(),
            node.size.as_str(),
            escape_html(&node.url),
            escape_html(&node.text)
        )
        .unwrap();
    }

    fn separator(node: &SeparatorNode, out: &mut String) {
        write!(
            out,
            r#"<hr class="folio-block folio-separator" data-block-id="{}" style="border-top: 1px {} {}; width: {}">"#,
            node.block_id,
            node.style.as_str(),
            escape_html(&node.color),
            escape_html(&node.width)
        )
        .unwrap();
    }

    fn video(node: &VideoNode, out: &mut String) {
        write!(
            out,
            r#"<div class="folio-block folio-video" data-block-id="{}">"#,
            node.block_id
        )
        .unwrap();
        if let Some(embed) = &node.embed_url {
            let src = format!(
                "{embed}?autoplay={}&controls={}",
                u8::from(node.autoplay),
                u8::from(node.controls)
            );
            write!(
                out,
                r#"<iframe src="{}" title="{}" allow="autoplay; encrypted-media" allowfullscreen loading="lazy"></iframe>"#,
                escape_html(&src),
                escape_html(&node.title)
            )
            .unwrap();
        } else if !node.url.is_empty() {
            write!(out, r#"<video src="{}""#, escape_html(&node.url)).unwrap();
            if node.controls {
                out.push_str(" controls");
            }
            if node.autoplay {
                out.push_str(" autoplay muted");
            }
            write!(out, r#" title="{}"></video>"#, escape_html(&node.title)).unwrap();
        }
        out.push_str("</div>");
    }

    fn form(node: &FormNode, out: &mut String) {
        write!(
            out,
            r#"<form class="folio-block folio-form" data-block-id="{}" data-form-id="{}" method="post">"#,
            node.block_id,
            escape_html(&node.form_id)
        )
        .unwrap();
        if !node.title.is_empty() {
            write!(out, "<h3>{}</h3>", escape_html(&node.title)).unwrap();
        }
        write!(
            out,
            r#"<button type="submit">{}</button></form>"#,
            escape_html(&node.submit_text)
        )
        .unwrap();
    }

    fn gallery(node: &GalleryNode, out: &mut String) {
        write!(
            out,
            r#"<div class="folio-block folio-gallery" data-block-id="{}" style="grid-template-columns: repeat({}, 1fr)">"#,
            node.block_id, node.columns
        )
        .unwrap();
        for src in &node.images {
            write!(out, r#"<img src="{}" alt="" loading="lazy">"#, escape_html(src)).unwrap();
        }
        out.push_str("</div>");
    }

    fn spacer(node: &SpacerNode, out: &mut String) {
        write!(
            out,
            r#"<div class="folio-block folio-spacer" data-block-id="{}" style="height: {}px" aria-hidden="true"></div>"#,
            node.block_id, node.height
        )
        .unwrap();
    }

    fn hero(node: &HeroNode, out: &mut String) {
        write!(
            out,
            r#"<section class="folio-block folio-hero {}" data-block-id="{}""#,
            align_class(node.alignment),
            node.block_id
        )
        .unwrap();
        if let Some(image) = &node.background_image {
            write!(
                out,
                r#" style="background-image: url('{}')""#,
                escape_html(&css_url(image))
            )
            .unwrap();
        }
        write!(out, "><h1>{}</h1>", escape_html(&node.title)).unwrap();
        if !node.subtitle.is_empty() {
            write!(out, "<p>{}</p>", escape_html(&node.subtitle)).unwrap();
        }
        if let Some(cta) = &node.cta {
            write!(
                out,
                r#"<a class="btn btn-primary btn-lg" href="{}">{}</a>"#,
                escape_html(&cta.url),
                escape_html(&cta.text)
            )
            .unwrap();
        }
        out.push_str("</section>");
    }

    fn testimonial(node: &TestimonialNode, out: &mut String) {
        write!(
            out,
            r#"<blockquote class="folio-block folio-testimonial" data-block-id="{}"><p>{}</p><footer>"#,
            node.block_id,
            escape_html(&node.quote)
        )
        .unwrap();
        if let Some(avatar) = &node.avatar {
            write!(
                out,
                r#"<img class="avatar" src="{}" alt="{}">"#,
                escape_html(avatar),
                escape_html(&node.author)
            )
            .unwrap();
        }
        write!(out, "<cite>{}</cite>", escape_html(&node.author)).unwrap();
        if !node.role.is_empty() {
            write!(out, r#"<span class="role">{}</span>"#, escape_html(&node.role)).unwrap();
        }
        out.push_str("</footer></blockquote>");
    }

    fn columns(node: &ColumnsNode, children: &[String], out: &mut String) {
        write!(
            out,
            r#"<div class="folio-block folio-columns" data-block-id="{}" style="grid-template-columns: repeat({}, 1fr); gap: {}">"#,
            node.block_id,
            node.count,
            escape_html(&node.gap)
        )
        .unwrap();
        for child in children {
            write!(out, r#"<div class="folio-column">{child}</div>"#).unwrap();
        }
        out.push_str("</div>");
    }

    fn accordion(node: &AccordionNode, bodies: &[String], out: &mut String) {
        write!(
            out,
            r#"<div class="folio-block folio-accordion" data-block-id="{}">"#,
            node.block_id
        )
        .unwrap();
        for (panel, body) in node.panels.iter().zip(bodies) {
            out.push_str("<details");
            if !node.allow_multiple {
                write!(out, r#" name="accordion-{}""#, node.block_id).unwrap();
            }
            write!(
                out,
                "><summary>{}</summary>{body}</details>",
                escape_html(&panel.label)
            )
            .unwrap();
        }
        out.push_str("</div>");
    }

    fn tabs(node: &TabsNode, bodies: &[String], out: &mut String) {
        let id = node.block_id;
        write!(
            out,
            r#"<div class="folio-block folio-tabs" data-block-id="{id}"><div role="tablist">"#
        )
        .unwrap();
        for (idx, panel) in node.panels.iter().enumerate() {
            write!(
                out,
                r#"<button role="tab" id="tab-{id}-{idx}" aria-controls="panel-{id}-{idx}" aria-selected="{}">{}</button>"#,
                idx == 0,
                escape_html(&panel.label)
            )
            .unwrap();
        }
        out.push_str("</div>");
        for (idx, body) in bodies.iter().enumerate() {
            write!(
                out,
                r#"<div role="tabpanel" id="panel-{id}-{idx}" aria-labelledby="tab-{id}-{idx}"{}>{body}</div>"#,
                if idx == 0 { "" } else { " hidden" }
            )
            .unwrap();
        }
        out.push_str("</div>");
    }
}
