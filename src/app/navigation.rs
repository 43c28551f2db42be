//! Navigation methods for `ViewerApp`.
//!
//! Covers the in-page history stack that popup clicks push onto, and the
//! simulated pagination that appends further comment pages.

use thread_kaizen::engine::detector::MutationKind;
use thread_kaizen::popup::Navigator;

use super::ViewerApp;

/// In-page navigation state driven by popup clicks.
#[derive(Debug, Default)]
pub struct ViewerNavigator {
    /// Scroll offsets to return to, most recent last.
    pub history: Vec<f32>,
    /// Scroll offset of the thread view as of the last frame.
    pub current_scroll: f32,
    /// Comment to bring into view on the next frame.
    pub scroll_target: Option<String>,
    /// Scroll offset to restore on the next frame.
    pub restore_scroll: Option<f32>,
    pub fragment: Option<String>,
}

impl Navigator for ViewerNavigator {
    fn push_history(&mut self) {
        self.history.push(self.current_scroll);
    }

    fn scroll_to_comment(&mut self, comment_id: &str) {
        self.scroll_target = Some(comment_id.to_string());
    }

    fn replace_fragment(&mut self, fragment: &str) {
        log::debug!("fragment set to #{}", fragment);
        self.fragment = Some(fragment.to_string());
    }
}

impl ViewerApp {
    /// Return to the scroll position before the last popup click.
    pub fn go_back(&mut self) {
        if let Some(offset) = self.navigator.history.pop() {
            self.navigator.restore_scroll = Some(offset);
            self.navigator.fragment = None;
        }
    }

    /// Append the next pagination fragment the way the host page would.
    pub fn load_more(&mut self) {
        if self.pending_pages.is_empty() {
            return;
        }
        let html = self.pending_pages.remove(0);
        let now = self.now();
        let page = self.session.page_mut();
        let added = page.append_sections(&html);
        page.finish_loading();
        log::info!("appended {} comment sections", added);

        let disposition = self.session.on_mutations(now, &[MutationKind::ChildList]);
        if disposition.is_dropped() {
            log::debug!("pagination batch {:?}, annotating now", disposition);
            self.session.reannotate();
        }
    }

    /// Click landed inside the popup on the clone of `comment_id`.
    pub fn click_popup_entry(&mut self, comment_id: Option<&str>) {
        self.session.on_popup_click(comment_id, &mut self.navigator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_navigation_records_history_and_target() {
        let mut nav = ViewerNavigator {
            current_scroll: 420.0,
            ..Default::default()
        };
        nav.push_history();
        nav.scroll_to_comment("comment-3");
        nav.replace_fragment("comment-3");
        assert_eq!(nav.history, vec![420.0]);
        assert_eq!(nav.scroll_target.as_deref(), Some("comment-3"));
        assert_eq!(nav.fragment.as_deref(), Some("comment-3"));
    }
}
