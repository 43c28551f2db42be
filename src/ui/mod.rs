//! Stateless egui helpers that draw `DomNode` trees.
//!
//! Handle links carrying the mention or commenter marker report themselves
//! as hover triggers so the app can feed them to the popup engine.

use eframe::egui;
use thread_kaizen::dom::{DomNode, NodeType};
use thread_kaizen::popup::target::HoverTarget;
use thread_kaizen::thread::render::COMMENTER_CLASS;
use thread_kaizen::thread::MENTION_CLASS;

/// The trigger element under the pointer this frame.
#[derive(Debug, Clone)]
pub struct HoveredTrigger {
    pub id: egui::Id,
    pub target: HoverTarget,
}

/// Per-pass drawing context.
pub struct NodeCtx<'a> {
    pub section_id: Option<&'a str>,
    pub inside_popup: bool,
    pub hovered: &'a mut Option<HoveredTrigger>,
}

const INLINE_TAGS: &[&str] = &["a", "span", "strong", "em", "b", "i", "code", "small", "img"];

fn is_inline(node: &DomNode) -> bool {
    node.node_type == NodeType::Text || INLINE_TAGS.contains(&node.tag.as_str())
}

/// Recursively draw a `DomNode` tree.
pub fn render_node(ui: &mut egui::Ui, node: &DomNode, ctx: &mut NodeCtx<'_>) {
    match node.node_type {
        NodeType::Text => {
            let text = node.text.trim();
            if !text.is_empty() {
                ui.label(text);
            }
            return;
        }
        NodeType::Document => {
            render_children(ui, node, ctx);
            return;
        }
        NodeType::Element => {}
    }

    match node.tag.as_str() {
        "h1" | "h2" | "h3" => {
            let size = match node.tag.as_str() {
                "h1" => 26.0,
                "h2" => 21.0,
                _ => 18.0,
            };
            ui.heading(egui::RichText::new(node.text_content().trim()).size(size).strong());
            ui.add_space(6.0);
        }
        "a" => render_link(ui, node, ctx),
        "img" => {
            ui.colored_label(egui::Color32::GRAY, "[Image]");
        }
        "hr" => {
            ui.separator();
        }
        "br" => {
            ui.add_space(4.0);
        }
        "section" => {
            let id = node.id();
            let mut inner = NodeCtx {
                section_id: id.or(ctx.section_id),
                inside_popup: ctx.inside_popup,
                hovered: &mut *ctx.hovered,
            };
            ui.group(|ui| {
                ui.set_width(ui.available_width());
                render_children(ui, node, &mut inner);
            });
            ui.add_space(6.0);
        }
        _ => {
            let response = render_children(ui, node, ctx);
            if let (Some(title), Some(response)) = (node.attr("title"), response) {
                response.on_hover_text(title);
            }
        }
    }
}

/// Draw children, wrapping runs of inline content on one line.
fn render_children(
    ui: &mut egui::Ui,
    node: &DomNode,
    ctx: &mut NodeCtx<'_>,
) -> Option<egui::Response> {
    if node.children.is_empty() {
        return None;
    }
    let inner = if node.children.iter().all(is_inline) {
        ui.horizontal_wrapped(|ui| {
            for child in &node.children {
                render_node(ui, child, ctx);
            }
        })
    } else {
        ui.vertical(|ui| {
            for child in &node.children {
                render_node(ui, child, ctx);
            }
        })
    };
    Some(inner.response)
}

fn render_link(ui: &mut egui::Ui, node: &DomNode, ctx: &mut NodeCtx<'_>) {
    let text = node.text_content();
    let text = text.trim();
    if text.is_empty() {
        // avatar links and the like
        render_children(ui, node, ctx);
        return;
    }

    let is_trigger = node.has_class(MENTION_CLASS) || node.has_class(COMMENTER_CLASS);
    let mut rt = egui::RichText::new(text).color(egui::Color32::from_rgb(0, 100, 200));
    if is_trigger {
        rt = rt.underline();
    }
    let link = ui.add(egui::Label::new(rt).sense(egui::Sense::hover()));

    if is_trigger && link.hovered() {
        let target = HoverTarget::from_node(node, ctx.section_id, ctx.inside_popup);
        // a trigger inside the popup goes away with the popup it spawns
        let target = if ctx.inside_popup { target.detached() } else { target };
        *ctx.hovered = Some(HoveredTrigger { id: link.id, target });
    }
    if let Some(href) = node.attr("href") {
        link.on_hover_cursor(egui::CursorIcon::PointingHand)
            .on_hover_text(href);
    }
}

/// Truncate `s` to at most `max_chars` Unicode scalar values, appending `"..."` if truncated.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let t: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", t)
    }
}
