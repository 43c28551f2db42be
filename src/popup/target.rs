//! Hover target classification.

use crate::dom::DomNode;
use crate::thread::render::COMMENTER_CLASS;
use crate::thread::MENTION_CLASS;

/// What the host knows about the element under the pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoverTarget {
    pub classes: Vec<String>,
    /// Raw `href` of the element, if it is a link.
    pub href: Option<String>,
    /// Id of the closest enclosing comment section (on the page or in a popup clone).
    pub section_id: Option<String>,
    /// The element lives inside the open popup.
    pub inside_popup: bool,
    /// The element is still attached to the document.
    pub connected: bool,
}

impl HoverTarget {
    /// Describe `node`, found under section `section_id`.
    pub fn from_node(node: &DomNode, section_id: Option<&str>, inside_popup: bool) -> Self {
        Self {
            classes: node
                .attr("class")
                .map(|c| c.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            href: node.attr("href").map(str::to_string),
            section_id: section_id.map(str::to_string),
            inside_popup,
            connected: true,
        }
    }

    pub fn detached(mut self) -> Self {
        self.connected = false;
        self
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Inline `@handle` reply reference inside a comment body.
    Mention,
    /// Handle label in a comment header.
    Commenter,
}

/// Classify a hover target. Handle labels inside the popup's own clones are
/// ignored so a popup never spawns from itself.
pub fn classify(target: &HoverTarget) -> Option<TargetKind> {
    if target.has_class(MENTION_CLASS) {
        Some(TargetKind::Mention)
    } else if target.has_class(COMMENTER_CLASS) && !target.inside_popup {
        Some(TargetKind::Commenter)
    } else {
        None
    }
}
