//! One augmented page: the thread state, the quiescence detector driving
//! its annotation, and the hover popup engine.
//!
//! The host owns the clock and the event loop. It feeds mutation batches
//! and pointer events in, calls [`Session::turn`] at the start of every
//! scheduling turn, and sleeps until [`Session::next_deadline`].

use std::time::Duration;

use crate::config::KaizenConfig;
use crate::engine::detector::{BatchDisposition, MutationKind, QuiescenceDetector, QuiescenceTarget};
use crate::engine::timer::earliest;
use crate::popup::position::PopupLayout;
use crate::popup::{HoverEvent, HoverOutcome, Navigator, Popup, PopupEngine};
use crate::thread::annotate::{AnnotationOutcome, Annotator};
use crate::thread::indexer::CommentIndex;
use crate::thread::page::Page;
use crate::thread::render::{QiitaMarkup, Renderer};

/// Page plus the most recent annotation results.
pub struct ThreadState<R: Renderer = QiitaMarkup> {
    page: Page,
    annotator: Annotator<R>,
    index: CommentIndex,
    last_outcome: Option<AnnotationOutcome>,
}

impl<R: Renderer> QuiescenceTarget for ThreadState<R> {
    fn has_loaded_comment(&self) -> bool {
        self.page.has_loaded_comment()
    }

    fn annotate(&mut self) {
        let pass = self.annotator.annotate(&mut self.page);
        log::debug!("annotation pass: {:?}", pass.outcome);
        if let Some(index) = pass.index {
            self.index = index;
        }
        self.last_outcome = Some(pass.outcome);
    }
}

/// What one scheduling turn did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// The previous pass's suppression window was closed.
    pub released: bool,
    pub annotated: bool,
    pub popup_expired: bool,
}

pub struct Session<R: Renderer = QiitaMarkup> {
    detector: QuiescenceDetector,
    popups: PopupEngine,
    thread: ThreadState<R>,
}

impl Session<QiitaMarkup> {
    pub fn new(page: Page, config: KaizenConfig) -> Self {
        Self::with_renderer(page, config, QiitaMarkup)
    }
}

impl<R: Renderer> Session<R> {
    pub fn with_renderer(page: Page, config: KaizenConfig, renderer: R) -> Self {
        Self {
            detector: QuiescenceDetector::new(config.quiet_interval),
            popups: PopupEngine::new(&config),
            thread: ThreadState {
                page,
                annotator: Annotator::with_renderer(renderer),
                index: CommentIndex::default(),
                last_outcome: None,
            },
        }
    }

    /// Begin observing. The first pass runs one quiet interval after `now`
    /// unless more mutations arrive.
    pub fn setup(&mut self, now: Duration) {
        log::debug!("session setup for {}", self.thread.page.url);
        self.detector.start(now);
    }

    pub fn on_mutations(&mut self, now: Duration, records: &[MutationKind]) -> BatchDisposition {
        self.detector.on_mutations(now, records)
    }

    /// Start of a scheduling turn.
    pub fn turn(&mut self, now: Duration) -> TurnReport {
        let released = self.detector.begin_turn();
        let annotated = self.detector.poll(now, &mut self.thread);
        let popup_expired = self.popups.tick(now);
        TurnReport {
            released,
            annotated,
            popup_expired,
        }
    }

    /// Annotate again right away, e.g. after pagination that arrived once
    /// observation had stopped.
    pub fn reannotate(&mut self) {
        self.detector.run_now(&mut self.thread);
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        earliest([self.detector.next_deadline(), self.popups.next_deadline()])
    }

    pub fn on_hover<L: PopupLayout>(
        &mut self,
        now: Duration,
        event: &HoverEvent,
        layout: &mut L,
    ) -> HoverOutcome {
        self.popups
            .on_hover(now, event, &self.thread.page, &self.thread.index, layout)
    }

    pub fn on_trigger_leave(&mut self, now: Duration) {
        self.popups.on_trigger_leave(now);
    }

    pub fn on_popup_enter(&mut self) {
        self.popups.on_popup_enter();
    }

    pub fn on_popup_leave(&mut self, now: Duration) {
        self.popups.on_popup_leave(now);
    }

    pub fn on_popup_click<N: Navigator>(&mut self, comment_id: Option<&str>, navigator: &mut N) -> bool {
        self.popups
            .on_popup_click(comment_id, &self.thread.page, navigator)
    }

    pub fn page(&self) -> &Page {
        &self.thread.page
    }

    /// Host-side writes (pagination, loading finished). Report them through
    /// [`Session::on_mutations`] afterwards.
    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.thread.page
    }

    pub fn index(&self) -> &CommentIndex {
        &self.thread.index
    }

    pub fn last_outcome(&self) -> Option<&AnnotationOutcome> {
        self.thread.last_outcome.as_ref()
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popups.popup()
    }

    pub fn detector(&self) -> &QuiescenceDetector {
        &self.detector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::popup::position::tests::{viewport, BoxLayout};
    use crate::popup::position::Pointer;
    use crate::popup::target::HoverTarget;
    use crate::thread::render::ORDINAL_BADGE_CLASS;
    use crate::thread::{LOADING_SENTINEL, MENTION_CLASS};

    const URL: &str = "https://qiita.com/alice/items/0123abcd";

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn comment(id: &str, who: &str, body: &str) -> String {
        format!(
            r#"<section id="{id}"><div><a href="/{who}"><img src="{who}.png"></a><a href="/{who}">@{who}</a></div><div><p>{body}</p></div><div class="reactions">LGTM</div></section>"#
        )
    }

    fn page(body: &str) -> Page {
        let html = format!(
            r#"<html><body><h1>A</h1><div id="comments">{}</div></body></html>"#,
            body
        );
        Page::parse(&html, URL).unwrap()
    }

    fn loaded_session() -> Session {
        let body = [
            comment("comment-1", "bob", "質問です"),
            comment("comment-2", "alice", r#"<a class="user-mention" href="/bob">@bob</a> 良いですね"#),
        ]
        .concat();
        Session::new(page(&body), KaizenConfig::default())
    }

    #[test]
    fn annotates_once_the_page_settles() {
        let mut session = loaded_session();
        session.setup(ms(0));
        assert_eq!(session.next_deadline(), Some(ms(1000)));

        assert!(!session.turn(ms(500)).annotated);
        let report = session.turn(ms(1000));
        assert!(report.annotated);
        assert_eq!(session.index().len(), 2);
        assert_eq!(
            session.last_outcome(),
            Some(&AnnotationOutcome::Annotated {
                comments: 2,
                author_comments: 1,
                positive: 1,
            })
        );
        assert!(session.page().section("comment-1").unwrap().contains(|n| n.has_class(ORDINAL_BADGE_CLASS)));

        // observation stopped with the pass, its own writes are not seen
        assert_eq!(session.on_mutations(ms(1000), &[MutationKind::ChildList]), BatchDisposition::Disconnected);
        assert!(session.turn(ms(1016)).released);
        assert!(!session.detector().is_connected());
    }

    #[test]
    fn loading_thread_is_annotated_after_comments_arrive() {
        let loading = format!(r#"<div>{}</div>"#, LOADING_SENTINEL);
        let mut session = Session::new(page(&loading), KaizenConfig::default());
        session.setup(ms(0));
        session.turn(ms(1000));
        assert_eq!(session.last_outcome(), Some(&AnnotationOutcome::Loading));
        assert!(session.detector().is_connected());
        session.turn(ms(1016));

        let appended = session
            .page_mut()
            .append_sections(&comment("comment-1", "bob", "質問です"));
        assert_eq!(appended, 1);
        session.page_mut().finish_loading();
        assert_eq!(session.on_mutations(ms(1500), &[MutationKind::ChildList]), BatchDisposition::Debounced);

        assert!(session.turn(ms(2500)).annotated);
        assert!(matches!(
            session.last_outcome(),
            Some(AnnotationOutcome::Annotated { comments: 1, .. })
        ));
    }

    #[test]
    fn late_pagination_needs_a_manual_rerun() {
        let mut session = loaded_session();
        session.setup(ms(0));
        session.turn(ms(1000));
        session.turn(ms(1016));

        session
            .page_mut()
            .append_sections(&comment("comment-3", "eve", "追加"));
        assert_eq!(session.on_mutations(ms(2000), &[MutationKind::ChildList]), BatchDisposition::Disconnected);
        assert_eq!(session.index().len(), 2);

        session.reannotate();
        assert_eq!(session.index().len(), 3);
        assert!(session.turn(ms(2016)).released);
    }

    #[test]
    fn pagination_inside_the_suppression_window_needs_a_manual_rerun() {
        let loading = format!(r#"<div>{}</div>"#, LOADING_SENTINEL);
        let mut session = Session::new(page(&loading), KaizenConfig::default());
        session.setup(ms(0));
        session.turn(ms(1000));
        assert!(session.detector().is_connected());

        // same turn as the loading pass: the batch is swallowed
        session
            .page_mut()
            .append_sections(&comment("comment-1", "bob", "質問です"));
        session.page_mut().finish_loading();
        let disposition = session.on_mutations(ms(1000), &[MutationKind::ChildList]);
        assert_eq!(disposition, BatchDisposition::Suppressed);
        assert!(disposition.is_dropped());
        assert_eq!(session.next_deadline(), None);

        session.reannotate();
        assert_eq!(session.index().len(), 1);
    }

    #[test]
    fn hover_and_expiry_through_turns() {
        let mut session = loaded_session();
        session.setup(ms(0));
        session.turn(ms(1000));

        let vp = viewport();
        let event = HoverEvent {
            target: HoverTarget {
                classes: vec![MENTION_CLASS.to_string()],
                href: Some("/bob".into()),
                section_id: Some("comment-2".into()),
                inside_popup: false,
                connected: true,
            },
            pointer: Pointer::at(1000.0, 600.0, &vp),
            viewport: vp,
        };
        let mut layout = BoxLayout::new(vp, 300.0, 200.0);
        assert_eq!(session.on_hover(ms(1100), &event, &mut layout), HoverOutcome::Shown { entries: 1 });

        session.on_trigger_leave(ms(1200));
        assert_eq!(session.next_deadline(), Some(ms(1700)));
        assert!(session.turn(ms(1700)).popup_expired);
        assert!(session.popup().is_none());
    }
}
