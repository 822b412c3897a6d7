//! Plain-text backend.
//!
//! Produces a readable outline of a page, one block per paragraph. Used by
//! the CLI to inspect pages without a browser.

use std::fmt::Write;

use crate::backend::RenderBackend;
use crate::node::{
    AccordionNode, ButtonNode, ColumnsNode, FormNode, GalleryNode, HeadingNode, HeroNode,
    ImageNode, RichTextNode, SeparatorNode, SpacerNode, TabsNode, TestimonialNode, VideoNode,
};
use crate::sanitize::strip_tags;

/// Plain-text render backend.
pub struct TextBackend;

fn indent(text: &str, out: &mut String) {
    for line in text.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            writeln!(out, "  {line}").unwrap();
        }
    }
}

impl RenderBackend for TextBackend {
    fn heading(node: &HeadingNode, out: &mut String) {
        let marks = "#".repeat(usize::from(node.level));
        writeln!(out, "{marks} {}\n", node.text).unwrap();
    }

    fn rich_text(node: &RichTextNode, out: &mut String) {
        writeln!(out, "{}\n", strip_tags(&node.html)).unwrap();
    }

    fn image(node: &ImageNode, out: &mut String) {
        if node.alt.is_empty() {
            out.push_str("[image]");
        } else {
            write!(out, "[image: {}]", node.alt).unwrap();
        }
        if !node.src.is_empty() {
            write!(out, " {}", node.src).unwrap();
        }
        out.push_str("\n\n");
    }

    fn button(node: &ButtonNode, out: &mut String) {
        writeln!(out, "[{}] -> {}\n", node.text, node.url).unwrap();
    }

    fn separator(_node: &SeparatorNode, out: &mut String) {
        out.push_str("---\n\n");
    }

    fn video(node: &VideoNode, out: &mut String) {
        if node.title.is_empty() {
            writeln!(out, "[video] {}\n", node.url).unwrap();
        } else {
            writeln!(out, "[video: {}] {}\n", node.title, node.url).unwrap();
        }
    }

    fn form(node: &FormNode, out: &mut String) {
        writeln!(out, "[form: {}] ({})\n", node.title, node.submit_text).unwrap();
    }

    fn gallery(node: &GalleryNode, out: &mut String) {
        writeln!(out, "[gallery: {} images]", node.images.len()).unwrap();
        for src in &node.images {
            writeln!(out, "  - {src}").unwrap();
        }
        out.push('\n');
    }

    fn spacer(_node: &SpacerNode, out: &mut String) {
        out.push('\n');
    }

    fn hero(node: &HeroNode, out: &mut String) {
        writeln!(out, "== {} ==", node.title).unwrap();
        if !node.subtitle.is_empty() {
            writeln!(out, "{}", node.subtitle).unwrap();
        }
        if let Some(cta) = &node.cta {
            writeln!(out, "[{}] -> {}", cta.text, cta.url).unwrap();
        }
        out.push('\n');
    }

    fn testimonial(node: &TestimonialNode, out: &mut String) {
        writeln!(out, "> {}", node.quote).unwrap();
        if node.role.is_empty() {
            writeln!(out, ">   - {}\n", node.author).unwrap();
        } else {
            writeln!(out, ">   - {}, {}\n", node.author, node.role).unwrap();
        }
    }

    fn columns(node: &ColumnsNode, children: &[String], out: &mut String) {
        writeln!(out, "[columns: {}]", node.count).unwrap();
        for child in children {
            indent(child, out);
        }
    }

    fn accordion(node: &AccordionNode, bodies: &[String], out: &mut String) {
        out.push_str("[accordion]\n");
        for (panel, body) in node.panels.iter().zip(bodies) {
            writeln!(out, "  {}:", panel.label).unwrap();
            let mut nested = String::new();
            indent(body, &mut nested);
            indent(&nested, out);
        }
    }

    fn tabs(node: &TabsNode, bodies: &[String], out: &mut String) {
        out.push_str("[tabs]\n");
        for (panel, body) in node.panels.iter().zip(bodies) {
            writeln!(out, "  [{}]", panel.label).unwrap();
            let mut nested = String::new();
            indent(body, &mut nested);
            indent(&nested, out);
        }
    }
}
