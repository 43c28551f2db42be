//! Hover popup engine: Classify → Extract → Place → Expire
//!
//! At most one popup exists. Two expiry tasks govern it: the trigger grace
//! (pointer left the hovered element, or the element was already detached)
//! and the popup grace (pointer left the popup). Entering the popup cancels
//! both.

pub mod extract;
pub mod position;
pub mod target;

use std::time::Duration;

use crate::config::KaizenConfig;
use crate::engine::timer::{earliest, DelayedTask};
use crate::thread::indexer::CommentIndex;
use crate::thread::page::Page;
use crate::thread::render::POPUP_ID;

use extract::{collect_matches, resolve_href, PopupEntry};
use position::{place, Placement, PopupLayout, Pointer, Viewport};
use target::{classify, HoverTarget, TargetKind};

/// A pointer-over event as delivered by the host.
#[derive(Debug, Clone)]
pub struct HoverEvent {
    pub target: HoverTarget,
    pub pointer: Pointer,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverOutcome {
    /// Not a mention or commenter label.
    Ignored,
    /// Link destination or enclosing comment could not be resolved.
    Unresolved,
    /// Nothing to show.
    NoMatches,
    /// A commenter label whose only match is the hovered comment itself.
    LoneSelfReference,
    Shown { entries: usize },
}

/// Host-side navigation performed when a popup entry is clicked.
pub trait Navigator {
    /// Push a no-op history entry so Back returns to the pre-click position.
    fn push_history(&mut self);
    fn scroll_to_comment(&mut self, comment_id: &str);
    /// Replace the current history entry's URL fragment.
    fn replace_fragment(&mut self, fragment: &str);
}

#[derive(Debug, Clone)]
pub struct Popup {
    pub kind: TargetKind,
    /// Ordinal of the comment the trigger sits in, when known.
    pub origin_ordinal: Option<usize>,
    pub entries: Vec<PopupEntry>,
    pub placement: Placement,
}

impl Popup {
    /// Reserved element id of the popup container.
    pub fn element_id(&self) -> &'static str {
        POPUP_ID
    }

    pub fn contains(&self, comment_id: &str) -> bool {
        self.entries.iter().any(|e| e.comment_id == comment_id)
    }
}

pub struct PopupEngine {
    trigger_grace: Duration,
    detached_grace: Duration,
    popup_grace: Duration,
    popup: Option<Popup>,
    trigger_timer: DelayedTask,
    popup_timer: DelayedTask,
    /// The trigger is attached and its first leave has not been seen yet.
    awaiting_trigger_leave: bool,
}

impl PopupEngine {
    pub fn new(config: &KaizenConfig) -> Self {
        Self {
            trigger_grace: config.trigger_grace,
            detached_grace: config.detached_grace,
            popup_grace: config.popup_grace,
            popup: None,
            trigger_timer: DelayedTask::new(),
            popup_timer: DelayedTask::new(),
            awaiting_trigger_leave: false,
        }
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        earliest([self.trigger_timer.deadline(), self.popup_timer.deadline()])
    }

    pub fn on_hover<L: PopupLayout>(
        &mut self,
        now: Duration,
        event: &HoverEvent,
        page: &Page,
        index: &CommentIndex,
        layout: &mut L,
    ) -> HoverOutcome {
        let target = &event.target;
        let Some(kind) = classify(target) else {
            return HoverOutcome::Ignored;
        };

        let Some(profile) = target
            .href
            .as_deref()
            .and_then(|href| resolve_href(&page.url, href))
        else {
            log::debug!("hover target has no resolvable link");
            return HoverOutcome::Unresolved;
        };

        let origin_ordinal = target
            .section_id
            .as_deref()
            .and_then(|id| index.ordinal_of(id));
        if kind == TargetKind::Mention && origin_ordinal.is_none() {
            log::debug!("mention outside an indexed comment");
            return HoverOutcome::Unresolved;
        }

        let entries = collect_matches(page, index, kind, &profile, origin_ordinal.unwrap_or(0));
        if entries.is_empty() {
            return HoverOutcome::NoMatches;
        }
        if kind == TargetKind::Commenter && entries.len() == 1 {
            return HoverOutcome::LoneSelfReference;
        }

        self.trigger_timer.cancel();
        self.popup_timer.cancel();
        if self.popup.take().is_some() {
            log::debug!("replacing open popup");
        }

        let destination = match kind {
            TargetKind::Commenter => {
                entries.iter().position(|e| Some(e.ordinal) == origin_ordinal)
            }
            TargetKind::Mention => Some(entries.len() - 1),
        };
        let placement = place(layout, &event.viewport, &event.pointer, &entries, destination);

        if target.connected {
            self.awaiting_trigger_leave = true;
        } else {
            // A detached trigger never reports a leave
            self.awaiting_trigger_leave = false;
            self.trigger_timer.schedule(now, self.detached_grace);
        }

        let shown = entries.len();
        self.popup = Some(Popup {
            kind,
            origin_ordinal,
            entries,
            placement,
        });
        HoverOutcome::Shown { entries: shown }
    }

    /// Pointer left the element that opened the popup. Only the first leave counts.
    pub fn on_trigger_leave(&mut self, now: Duration) {
        if self.popup.is_some() && self.awaiting_trigger_leave {
            self.awaiting_trigger_leave = false;
            self.trigger_timer.schedule(now, self.trigger_grace);
        }
    }

    pub fn on_popup_enter(&mut self) {
        if self.popup.is_some() {
            self.trigger_timer.cancel();
            self.popup_timer.cancel();
        }
    }

    pub fn on_popup_leave(&mut self, now: Duration) {
        if self.popup.is_some() {
            self.popup_timer.schedule(now, self.popup_grace);
        }
    }

    /// Click inside the popup on the clone of `comment_id` (`None` when the
    /// click landed outside every clone). Returns true when it navigated.
    pub fn on_popup_click<N: Navigator>(
        &mut self,
        comment_id: Option<&str>,
        page: &Page,
        navigator: &mut N,
    ) -> bool {
        let Some(popup) = self.popup.as_ref() else {
            return false;
        };
        let Some(id) = comment_id.filter(|id| popup.contains(id)) else {
            return false;
        };
        if page.section(id).is_none() {
            log::debug!("destination comment {} not on page", id);
            return false;
        }

        self.dismiss();
        navigator.push_history();
        navigator.scroll_to_comment(id);
        navigator.replace_fragment(id);
        true
    }

    /// Fire due expiry tasks. Returns true when the popup was removed.
    pub fn tick(&mut self, now: Duration) -> bool {
        let trigger = self.trigger_timer.fire_if_due(now);
        let popup = self.popup_timer.fire_if_due(now);
        if (trigger || popup) && self.popup.is_some() {
            log::debug!("popup expired");
            self.dismiss();
            return true;
        }
        false
    }

    pub fn dismiss(&mut self) {
        self.popup = None;
        self.trigger_timer.cancel();
        self.popup_timer.cancel();
        self.awaiting_trigger_leave = false;
    }
}
