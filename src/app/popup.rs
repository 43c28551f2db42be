//! Popup measurement and drawing for `ViewerApp`.
//!
//! egui lays widgets out in the same pass that paints them, so placement
//! runs against an estimate: each entry's height comes from its text length
//! at the popup width.

use eframe::egui;

use thread_kaizen::popup::extract::PopupEntry;
use thread_kaizen::popup::position::{
    ContentMetrics, PopupLayout, PopupStyle, Pointer, Rect, Viewport,
};
use thread_kaizen::popup::target::HoverTarget;
use thread_kaizen::popup::HoverEvent;

use crate::ui::{render_node, HoveredTrigger, NodeCtx};

use super::ViewerApp;

const NATURAL_WIDTH: f32 = 520.0;
const LINE_HEIGHT: f32 = 18.0;
const CHAR_WIDTH: f32 = 13.0;
/// Handle row, group frame and spacing around each entry.
const ENTRY_CHROME: f32 = 48.0;

/// Text-length based stand-in for a real layout pass.
pub struct EstimatedLayout {
    viewport: Viewport,
}

impl EstimatedLayout {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    fn width(&self, style: &PopupStyle) -> f32 {
        style
            .width
            .unwrap_or(NATURAL_WIDTH)
            .min(self.viewport.width)
    }

    fn entry_heights(&self, width: f32, entries: &[PopupEntry]) -> Vec<f32> {
        let per_line = (width / CHAR_WIDTH).max(1.0);
        entries
            .iter()
            .map(|e| {
                let chars = e.node.text_content().chars().count() as f32;
                (chars / per_line).ceil().max(1.0) * LINE_HEIGHT + ENTRY_CHROME
            })
            .collect()
    }

    fn height(&self, style: &PopupStyle, entries: &[PopupEntry]) -> (f32, f32) {
        let content: f32 = self.entry_heights(self.width(style), entries).iter().sum();
        let visible = style.max_height.map_or(content, |m| content.min(m));
        (content, visible)
    }
}

impl PopupLayout for EstimatedLayout {
    fn bounding_rect(&mut self, style: &PopupStyle, entries: &[PopupEntry]) -> Rect {
        let vp = self.viewport;
        let width = self.width(style);
        let (_, height) = self.height(style, entries);
        let left = match (style.left, style.right) {
            (Some(l), _) => l - vp.scroll_x,
            (None, Some(r)) => vp.width - r - width,
            (None, None) => 0.0,
        };
        let top = match (style.top, style.bottom) {
            (Some(t), _) => t - vp.scroll_y,
            (None, Some(b)) => vp.height - b - height - vp.scroll_y,
            (None, None) => 0.0,
        };
        Rect {
            left,
            top,
            width,
            height,
        }
    }

    fn content_metrics(&mut self, style: &PopupStyle, entries: &[PopupEntry]) -> ContentMetrics {
        let heights = self.entry_heights(self.width(style), entries);
        let (content, visible) = self.height(style, entries);
        let entry_offsets = heights
            .iter()
            .scan(0.0, |acc, h| {
                let offset = *acc;
                *acc += h;
                Some(offset)
            })
            .collect();
        ContentMetrics {
            scroll_height: content,
            client_height: visible,
            entry_offsets,
        }
    }
}

/// Viewport of the thread view as seen by the popup engine.
pub fn viewport(ctx: &egui::Context, scroll_y: f32) -> Viewport {
    let screen = ctx.screen_rect();
    Viewport {
        width: screen.width(),
        height: screen.height(),
        scroll_x: 0.0,
        scroll_y,
        rem_px: egui::TextStyle::Body.resolve(&ctx.style()).size,
    }
}

pub fn hover_event(ctx: &egui::Context, target: HoverTarget, pos: egui::Pos2, scroll_y: f32) -> HoverEvent {
    let viewport = viewport(ctx, scroll_y);
    HoverEvent {
        target,
        pointer: Pointer::at(pos.x, pos.y, &viewport),
        viewport,
    }
}

impl ViewerApp {
    /// Draw the open popup, if any. Returns true when the pointer is over it.
    pub fn draw_popup(&mut self, ctx: &egui::Context, hovered: &mut Option<HoveredTrigger>) -> bool {
        let Some(popup) = self.session.popup() else {
            return false;
        };
        let mut layout = EstimatedLayout::new(viewport(ctx, self.scroll_y));
        let rect = layout.bounding_rect(&popup.placement.style, &popup.entries);
        let initial_scroll = self
            .popup_scroll_pending
            .then_some(popup.placement.scroll_top);

        let pointer = ctx.input(|i| i.pointer.hover_pos());
        let pressed = ctx.input(|i| i.pointer.primary_clicked());
        let mut clicked: Option<String> = None;

        let area = egui::Area::new(egui::Id::new(popup.element_id()))
            .order(egui::Order::Foreground)
            .fixed_pos(egui::pos2(rect.left, rect.top))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(rect.width);
                    let mut scroll = egui::ScrollArea::vertical().max_height(rect.height);
                    if let Some(offset) = initial_scroll {
                        scroll = scroll.vertical_scroll_offset(offset);
                    }
                    scroll.show(ui, |ui| {
                        for entry in &popup.entries {
                            let response = draw_entry(ui, entry, hovered);
                            let hit = pointer.is_some_and(|p| response.rect.contains(p));
                            if pressed && hit {
                                clicked = Some(entry.comment_id.clone());
                            }
                        }
                    });
                });
            });

        self.popup_scroll_pending = false;
        if clicked.is_some() {
            self.click_popup_entry(clicked.as_deref());
        }
        pointer.is_some_and(|p| area.response.rect.contains(p))
    }
}

fn draw_entry(
    ui: &mut egui::Ui,
    entry: &PopupEntry,
    hovered: &mut Option<HoveredTrigger>,
) -> egui::Response {
    let mut ctx = NodeCtx {
        section_id: Some(&entry.comment_id),
        inside_popup: true,
        hovered,
    };
    ui.scope(|ui| render_node(ui, &entry.node, &mut ctx)).response
}
