//! Collect and sanitize the comment sections a popup shows.

use url::Url;

use crate::dom::DomNode;
use crate::popup::target::TargetKind;
use crate::thread::indexer::CommentIndex;
use crate::thread::page::Page;
use crate::thread::render::ORDINAL_BADGE_CLASS;
use crate::thread::section::{author_link, Comment};
use crate::thread::EMBED_PREVIEW_TAG;

/// One cloned comment inside a popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupEntry {
    pub comment_id: String,
    pub ordinal: usize,
    pub node: DomNode,
}

/// Resolve a link destination against the page URL.
pub fn resolve_href(page_url: &Url, href: &str) -> Option<Url> {
    page_url.join(href).ok()
}

/// Clones of every comment in the window whose own author link points at
/// `profile`, in document order.
///
/// The window is every comment strictly before `origin_ordinal` for a
/// mention (a reply can only refer back), and the whole thread for a
/// commenter label.
pub fn collect_matches(
    page: &Page,
    index: &CommentIndex,
    kind: TargetKind,
    profile: &Url,
    origin_ordinal: usize,
) -> Vec<PopupEntry> {
    let window = match kind {
        TargetKind::Mention => origin_ordinal.saturating_sub(1),
        TargetKind::Commenter => index.len(),
    };

    let mut entries = Vec::new();
    for comment in index.comments().iter().take(window) {
        let Some(section) = section_of(page, comment) else {
            log::debug!("indexed comment {} missing from page", comment.id);
            continue;
        };
        let Some(href) = author_link(section).and_then(|a| a.attr("href")) else {
            continue;
        };
        if resolve_href(&page.url, href).as_ref() == Some(profile) {
            entries.push(PopupEntry {
                comment_id: comment.id.clone(),
                ordinal: comment.ordinal,
                node: sanitize(section),
            });
        }
    }
    entries
}

/// The comment's section, found by its recorded position. Falls back to an id
/// search when the thread changed since indexing.
fn section_of<'a>(page: &'a Page, comment: &Comment) -> Option<&'a DomNode> {
    match page.sections().get(comment.position) {
        Some(section) if section.id() == Some(comment.id.as_str()) => Some(section),
        _ => page.section(&comment.id),
    }
}

/// Deep clone of a section without ordinal badges, with link previews
/// flattened to their source URL, and without the trailing reaction row.
///
/// Previews expand asynchronously and would shift the popup after it has
/// been positioned.
pub fn sanitize(section: &DomNode) -> DomNode {
    let mut clone = section.clone();
    clone.remove_descendants(|n| n.has_class(ORDINAL_BADGE_CLASS));
    clone.replace_descendants(
        |n| n.is_tag(EMBED_PREVIEW_TAG),
        &|n: &DomNode| DomNode::text(n.attr("src").unwrap_or_default()),
    );
    if let Some(last_div) = clone.children.iter().rposition(|c| c.is_tag("div")) {
        clone.children.remove(last_div);
    }
    clone
}
