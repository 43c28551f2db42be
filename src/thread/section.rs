//! Read access to the host's comment-section markup.
//!
//! A section looks like
//! `<section id="comment-…"><div>header: avatar link, handle link, …</div>
//! <div>body</div><div>reactions</div></section>`. Markers inserted by the
//! annotation pipeline are skipped when locating the header and body.

use crate::dom::DomNode;
use crate::thread::render::ORDINAL_BADGE_CLASS;
use crate::thread::sentiment::is_positive;
use crate::thread::{COMMENT_ID_PREFIX, DELETED_PLACEHOLDER};

fn is_content_div(node: &DomNode) -> bool {
    node.is_tag("div") && !node.has_class(ORDINAL_BADGE_CLASS)
}

fn content_divs(section: &DomNode) -> impl Iterator<Item = &DomNode> {
    section.children.iter().filter(|c| is_content_div(c))
}

pub fn header(section: &DomNode) -> Option<&DomNode> {
    content_divs(section).next()
}

pub fn body(section: &DomNode) -> Option<&DomNode> {
    content_divs(section).nth(1)
}

pub fn is_deleted(section: &DomNode) -> bool {
    header(section)
        .map(|h| h.text_content() == DELETED_PLACEHOLDER)
        .unwrap_or(false)
}

/// Whether the section is a real, fully loaded comment (not a placeholder row).
pub fn is_loaded_comment(section: &DomNode) -> bool {
    section.is_tag("section")
        && section
            .id()
            .map(|id| id.starts_with(COMMENT_ID_PREFIX))
            .unwrap_or(false)
}

/// Last path segment of a profile link: `/alice` → `alice`.
pub fn handle_from_href(href: &str) -> Option<&str> {
    let path = href.split(|c| c == '?' || c == '#').next().unwrap_or(href);
    let handle = path.rsplit('/').next()?;
    if handle.is_empty() {
        None
    } else {
        Some(handle)
    }
}

/// Child-index path (from the section) to the commenter handle link: the
/// first link in the header that is the last `a` among its siblings.
pub fn commenter_link_path(section: &DomNode) -> Option<Vec<usize>> {
    let header_idx = section.children.iter().position(is_content_div)?;
    let mut path = vec![header_idx];
    if last_link_path(&section.children[header_idx], &mut path) {
        Some(path)
    } else {
        None
    }
}

fn last_link_path(node: &DomNode, path: &mut Vec<usize>) -> bool {
    let last_link = node.children.iter().rposition(|c| c.is_tag("a"));
    for (i, child) in node.children.iter().enumerate() {
        if !child.is_element() {
            continue;
        }
        path.push(i);
        if Some(i) == last_link {
            return true;
        }
        if last_link_path(child, path) {
            return true;
        }
        path.pop();
    }
    false
}

pub fn node_at<'a>(root: &'a DomNode, path: &[usize]) -> Option<&'a DomNode> {
    path.iter().try_fold(root, |node, &i| node.children.get(i))
}

pub fn node_at_mut<'a>(root: &'a mut DomNode, path: &[usize]) -> Option<&'a mut DomNode> {
    path.iter().try_fold(root, |node, &i| node.children.get_mut(i))
}

pub fn commenter_link(section: &DomNode) -> Option<&DomNode> {
    commenter_link_path(section).and_then(|p| node_at(section, &p))
}

/// Handle the commenter link points at.
pub fn commenter_handle(section: &DomNode) -> Option<&str> {
    commenter_link(section)?.attr("href").and_then(handle_from_href)
}

/// The section's own profile link: its first site-relative link.
pub fn author_link(section: &DomNode) -> Option<&DomNode> {
    section.find_descendant(|n| {
        n.is_tag("a") && n.attr("href").map(|h| h.starts_with('/')).unwrap_or(false)
    })
}

/// Handle used for the per-author tally: first link of the header.
pub fn tally_handle(section: &DomNode) -> Option<&str> {
    header(section)?
        .find_descendant(|n| n.is_tag("a"))?
        .attr("href")
        .and_then(handle_from_href)
}

/// One comment as the indexer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    /// 1-based; 0 until the indexer assigns it.
    pub ordinal: usize,
    /// Index of the section among the thread's sections, deleted ones included.
    pub position: usize,
    pub author: String,
    pub text: String,
    pub is_deleted: bool,
    pub is_positive: bool,
    pub is_author_comment: bool,
}

impl Comment {
    /// Read a comment out of its section. `None` when the section lacks an id
    /// or a commenter link.
    pub fn from_section(section: &DomNode, thread_author: &str) -> Option<Self> {
        let id = section.id()?.to_string();
        let is_deleted = is_deleted(section);
        let text = body(section).map(|b| b.text_content()).unwrap_or_default();
        let link = commenter_link(section)?;
        let author = link
            .attr("href")
            .and_then(handle_from_href)
            .map(str::to_string)
            .unwrap_or_else(|| link.text_content().trim().trim_start_matches('@').to_string());

        Some(Self {
            is_positive: !is_deleted && is_positive(&text),
            is_author_comment: author == thread_author,
            id,
            ordinal: 0,
            position: 0,
            author,
            text,
            is_deleted,
        })
    }
}
