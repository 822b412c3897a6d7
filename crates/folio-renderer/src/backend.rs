//! Output backend trait and the generic tree walker.
//!
//! Backends only format single nodes. Container nodes receive their
//! children already formatted, so a backend never recurses itself.

use crate::node::{
    AccordionNode, ButtonNode, ColumnsNode, FormNode, GalleryNode, HeadingNode, HeroNode,
    ImageNode, RenderNode, RichTextNode, SeparatorNode, SpacerNode, TabsNode, TestimonialNode,
    VideoNode,
};

/// Format-specific output for each node kind.
pub trait RenderBackend {
    fn heading(node: &HeadingNode, out: &mut String);

    /// `node.html` is already sanitized.
    fn rich_text(node: &RichTextNode, out: &mut String);

    fn image(node: &ImageNode, out: &mut String);

    fn button(node: &ButtonNode, out: &mut String);

    fn separator(node: &SeparatorNode, out: &mut String);

    fn video(node: &VideoNode, out: &mut String);

    fn form(node: &FormNode, out: &mut String);

    fn gallery(node: &GalleryNode, out: &mut String);

    fn spacer(node: &SpacerNode, out: &mut String);

    fn hero(node: &HeroNode, out: &mut String);

    fn testimonial(node: &TestimonialNode, out: &mut String);

    /// `children[i]` is the formatted output of `node.children[i]`.
    fn columns(node: &ColumnsNode, children: &[String], out: &mut String);

    /// `bodies[i]` is the formatted content of `node.panels[i]`.
    fn accordion(node: &AccordionNode, bodies: &[String], out: &mut String);

    /// `bodies[i]` is the formatted content of `node.panels[i]`.
    fn tabs(node: &TabsNode, bodies: &[String], out: &mut String);
}

/// Format a node sequence with backend `B`.
#[must_use]
pub fn emit<B: RenderBackend>(nodes: &[RenderNode]) -> String {
    let mut out = String::with_capacity(4096);
    for node in nodes {
        emit_node::<B>(node, &mut out);
    }
    out
}

fn emit_to_string<B: RenderBackend>(node: &RenderNode) -> String {
    let mut out = String::new();
    emit_node::<B>(node, &mut out);
    out
}

fn emit_node<B: RenderBackend>(node: &RenderNode, out: &mut String) {
    match node {
        RenderNode::Heading(n) => B::heading(n, out),
        RenderNode::RichText(n) => B::rich_text(n, out),
        RenderNode::Image(n) => B::image(n, out),
        RenderNode::Button(n) => B::button(n, out),
        RenderNode::Separator(n) => B::separator(n, out),
        RenderNode::Video(n) => B::video(n, out),
        RenderNode::Form(n) => B::form(n, out),
        RenderNode::Gallery(n) => B::gallery(n, out),
        RenderNode::Spacer(n) => B::spacer(n, out),
        RenderNode::Hero(n) => B::hero(n, out),
        RenderNode::Testimonial(n) => B::testimonial(n, out),
        RenderNode::Columns(n) => {
            let children: Vec<String> = n.children.iter().map(emit_to_string::<B>).collect();
            B::columns(n, &children, out);
        }
        RenderNode::Accordion(n) => {
            let bodies: Vec<String> = n
                .panels
                .iter()
                .map(|p| emit_to_string::<B>(&p.content))
                .collect();
            B::accordion(n, &bodies, out);
        }
        RenderNode::Tabs(n) => {
            let bodies: Vec<String> = n
                .panels
                .iter()
                .map(|p| emit_to_string::<B>(&p.content))
                .collect();
            B::tabs(n, &bodies, out);
        }
    }
}
