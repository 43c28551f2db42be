//! `ViewerApp`: the top-level egui application state.
//!
//! This module declares the `ViewerApp` struct, its constructor, and the
//! per-frame `update`. Drawing is split across the sibling sub-modules:
//!
//! - `navigation`: pagination and in-page history
//! - `toolbar`: controls and annotation status
//! - `content`: the comment thread
//! - `popup`: popup measurement and drawing

pub mod content;
pub mod navigation;
pub mod popup;
pub mod toolbar;

use std::time::{Duration, Instant};

use eframe::egui;

use thread_kaizen::config::KaizenConfig;
use thread_kaizen::session::Session;
use thread_kaizen::thread::page::PageError;

use crate::ui::HoveredTrigger;
use navigation::ViewerNavigator;

// ─── Application state ───────────────────────────────────────────────────────

pub struct ViewerApp {
    pub session: Session,
    /// Pagination fragments not appended yet.
    pub pending_pages: Vec<String>,
    pub navigator: ViewerNavigator,
    pub dark_mode: bool,
    pub app_start: Instant,
    /// Trigger under the pointer during the previous frame.
    pub last_trigger: Option<egui::Id>,
    pub pointer_in_popup: bool,
    /// Apply the popup's computed scroll offset on the next frame.
    pub popup_scroll_pending: bool,
    /// Vertical scroll offset of the thread view.
    pub scroll_y: f32,
}

impl ViewerApp {
    /// `page_html` is the thread page markup, `url` its address, `more` any
    /// later pagination fragments.
    pub fn new(page_html: &str, url: &str, more: Vec<String>, config: KaizenConfig) -> Result<Self, PageError> {
        let page = thread_kaizen::thread::page::Page::parse(page_html, url)?;
        let mut session = Session::new(page, config);
        session.setup(Duration::ZERO);
        Ok(Self {
            session,
            pending_pages: more,
            navigator: ViewerNavigator::default(),
            dark_mode: false,
            app_start: Instant::now(),
            last_trigger: None,
            pointer_in_popup: false,
            popup_scroll_pending: false,
            scroll_y: 0.0,
        })
    }

    /// Time on the session clock.
    pub fn now(&self) -> Duration {
        self.app_start.elapsed()
    }

    /// Feed this frame's trigger hover into the session.
    fn handle_trigger(&mut self, ctx: &egui::Context, hovered: Option<HoveredTrigger>) {
        let now = self.now();
        match hovered {
            Some(trigger) if self.last_trigger != Some(trigger.id) => {
                if self.last_trigger.is_some() {
                    self.session.on_trigger_leave(now);
                }
                self.last_trigger = Some(trigger.id);
                let Some(pos) = ctx.input(|i| i.pointer.hover_pos()) else {
                    return;
                };
                let event = popup::hover_event(ctx, trigger.target, pos, self.scroll_y);
                let mut layout = popup::EstimatedLayout::new(event.viewport);
                let outcome = self.session.on_hover(now, &event, &mut layout);
                log::debug!("hover: {:?}", outcome);
                if matches!(outcome, thread_kaizen::popup::HoverOutcome::Shown { .. }) {
                    self.popup_scroll_pending = true;
                }
            }
            Some(_) => {}
            None => {
                if self.last_trigger.take().is_some() {
                    self.session.on_trigger_leave(now);
                }
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        let report = self.session.turn(self.now());
        if report.annotated {
            log::info!("thread annotated: {:?}", self.session.last_outcome());
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        let mut hovered = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_content(ui, &mut hovered);
        });

        let popup_hovered = self.draw_popup(ctx, &mut hovered);
        self.handle_trigger(ctx, hovered);

        let now = self.now();
        match (self.pointer_in_popup, popup_hovered) {
            (false, true) => self.session.on_popup_enter(),
            (true, false) => self.session.on_popup_leave(now),
            _ => {}
        }
        self.pointer_in_popup = popup_hovered;

        if let Some(deadline) = self.session.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_sub(now));
        }
    }
}
