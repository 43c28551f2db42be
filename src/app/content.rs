//! Content-area rendering for `ViewerApp`: the summary header followed by
//! the comment thread, inside one scroll area.

use eframe::egui;

use crate::ui::{render_node, HoveredTrigger, NodeCtx};

use super::ViewerApp;

impl ViewerApp {
    pub fn draw_content(&mut self, ui: &mut egui::Ui, hovered: &mut Option<HoveredTrigger>) {
        let mut area = egui::ScrollArea::vertical().auto_shrink([false, false]);
        if let Some(offset) = self.navigator.restore_scroll.take() {
            area = area.vertical_scroll_offset(offset);
        }

        let scroll_target = self.navigator.scroll_target.take();
        let page = self.session.page();

        let output = area.show(ui, |ui| {
            if let Some(header) = &page.header {
                let mut ctx = NodeCtx {
                    section_id: None,
                    inside_popup: false,
                    hovered: &mut *hovered,
                };
                render_node(ui, header, &mut ctx);
                ui.separator();
            }

            if page.thread.is_none() {
                ui.colored_label(egui::Color32::GRAY, "No comment thread on this page");
                return;
            }

            for section in page.sections() {
                let mut ctx = NodeCtx {
                    section_id: section.id(),
                    inside_popup: false,
                    hovered: &mut *hovered,
                };
                let response = ui.scope(|ui| render_node(ui, section, &mut ctx)).response;
                if scroll_target.is_some() && section.id() == scroll_target.as_deref() {
                    response.scroll_to_me(Some(egui::Align::TOP));
                }
            }

            if let Some(toc) = &page.toc {
                ui.separator();
                for entry in &toc.appended {
                    let mut ctx = NodeCtx {
                        section_id: None,
                        inside_popup: false,
                        hovered: &mut *hovered,
                    };
                    render_node(ui, entry, &mut ctx);
                }
            }
        });

        self.scroll_y = output.state.offset.y;
        self.navigator.current_scroll = self.scroll_y;
    }
}
