//! Toolbar rendering for `ViewerApp`.
//!
//! Draws the back button, pagination and re-annotation controls, the
//! current URL fragment, and the annotation status.

use eframe::egui;
use thread_kaizen::thread::annotate::AnnotationOutcome;

use super::ViewerApp;

impl ViewerApp {
    /// Render the top toolbar strip.
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);

            let can_back = !self.navigator.history.is_empty();
            if ui
                .add_enabled(
                    can_back,
                    egui::Button::new("\u{25C0}").min_size(egui::vec2(28.0, 24.0)),
                )
                .clicked()
            {
                self.go_back();
            }

            let url = match &self.navigator.fragment {
                Some(fragment) => format!("{}#{}", self.session.page().url, fragment),
                None => self.session.page().url.to_string(),
            };
            ui.monospace(crate::ui::truncate_str(&url, 80));

            ui.separator();

            let pending = self.pending_pages.len();
            if ui
                .add_enabled(pending > 0, egui::Button::new(format!("Load more ({})", pending)))
                .clicked()
            {
                self.load_more();
            }
            if ui.button("Reannotate").clicked() {
                self.session.reannotate();
            }

            ui.separator();
            ui.label(status_text(self.session.last_outcome()));

            let dark_label = if self.dark_mode { "\u{263E}" } else { "\u{2600}" };
            if ui.button(dark_label).clicked() {
                self.dark_mode = !self.dark_mode;
            }
        });
    }
}

fn status_text(outcome: Option<&AnnotationOutcome>) -> String {
    match outcome {
        None => "waiting for the thread to settle".to_string(),
        Some(AnnotationOutcome::NoThread) => "no comment thread".to_string(),
        Some(AnnotationOutcome::Loading) => "comments loading".to_string(),
        Some(AnnotationOutcome::Annotated {
            comments,
            author_comments,
            positive,
        }) => format!(
            "{} comments, {} by author, {} positive",
            comments, author_comments, positive
        ),
    }
}
