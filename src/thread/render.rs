//! Markup templates for everything the annotation pipeline inserts.
//!
//! The pipeline decides *where* and *whether* to insert; a `Renderer`
//! decides *what* the inserted nodes look like. The marker classes and ids
//! below are the contract between the two: the pipeline looks for them to
//! keep re-runs idempotent, so every renderer must emit them.

use crate::dom::DomNode;
use crate::thread::COMMENTS_CONTAINER_ID;

pub const ORDINAL_BADGE_CLASS: &str = "kaizen-ordinal";
pub const SUB_INDEX_BADGE_CLASS: &str = "kaizen-sub-index";
pub const COMMENTER_CLASS: &str = "kaizen-commenter";
pub const AUTHOR_TEXT_CLASS: &str = "kaizen-author-text";
pub const AUTHOR_SECTION_CLASS: &str = "kaizen-author-section";
pub const HEADER_ID: &str = "kaizen-header";
pub const TOC_ENTRY_ID: &str = "kaizen-toc";
pub const POPUP_ID: &str = "kaizen-popup";

/// Suffix appended to every link that points at the thread author.
pub const AUTHOR_SUFFIX: &str = "（作者）";

/// A count with a link target (the first matching comment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchoredCount {
    pub count: usize,
    pub anchor_id: String,
}

/// Everything the page-level header shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadSummary {
    pub total: usize,
    pub author: Option<AnchoredCount>,
    pub positive: Option<AnchoredCount>,
    /// `"{count}: {handle}"` lines, most active commenter first.
    pub tally: String,
}

pub trait Renderer {
    /// Badge inserted as the first child of a comment section.
    fn ordinal_badge(&self, comment_id: &str, ordinal: usize, total: usize) -> DomNode;
    /// `(k / total)` badge placed right after the commenter link.
    fn sub_index_badge(&self, index: usize, total: usize) -> DomNode;
    fn summary_header(&self, summary: &ThreadSummary) -> DomNode;
    fn loading_header(&self) -> DomNode;
    fn toc_entry(&self) -> DomNode;
}

/// Default markup, matching the host's Japanese UI.
#[derive(Debug, Default, Clone, Copy)]
pub struct QiitaMarkup;

fn el(tag: &str) -> DomNode {
    DomNode::element(tag, Vec::new(), Vec::new())
}

fn comments_link() -> DomNode {
    el("a")
        .with_attr("href", format!("#{}", COMMENTS_CONTAINER_ID))
        .with_child(DomNode::text("コメント"))
}

fn span(text: impl Into<String>) -> DomNode {
    el("span").with_child(DomNode::text(text))
}

impl Renderer for QiitaMarkup {
    fn ordinal_badge(&self, comment_id: &str, ordinal: usize, total: usize) -> DomNode {
        el("div")
            .with_attr("class", ORDINAL_BADGE_CLASS)
            .with_child(
                el("a")
                    .with_attr("href", format!("#{}", comment_id))
                    .with_child(el("i").with_attr("class", "fa fa-link")),
            )
            .with_child(DomNode::text(format!("コメント {} / {}", ordinal, total)))
    }

    fn sub_index_badge(&self, index: usize, total: usize) -> DomNode {
        span(format!("({} / {})", index, total)).with_attr("class", SUB_INDEX_BADGE_CLASS)
    }

    fn summary_header(&self, summary: &ThreadSummary) -> DomNode {
        let mut header = el("div")
            .with_attr("id", HEADER_ID)
            .with_attr("title", summary.tally.clone())
            .with_child(comments_link())
            .with_child(DomNode::text("数は "))
            .with_child(span(summary.total.to_string()));

        let brackets: Vec<(&str, &AnchoredCount)> = [
            ("作者", summary.author.as_ref()),
            ("前向き", summary.positive.as_ref()),
        ]
        .into_iter()
        .filter_map(|(label, count)| count.map(|c| (label, c)))
        .collect();

        if !brackets.is_empty() {
            header.children.push(DomNode::text("（"));
            for (i, (label, count)) in brackets.iter().enumerate() {
                if i > 0 {
                    header.children.push(DomNode::text("、"));
                }
                header.children.push(
                    el("a")
                        .with_attr("href", format!("#{}", count.anchor_id))
                        .with_child(DomNode::text(*label)),
                );
                header.children.push(DomNode::text("："));
                header.children.push(span(count.count.to_string()));
            }
            header.children.push(DomNode::text("）"));
        }

        header.children.push(DomNode::text("です"));
        header
    }

    fn loading_header(&self) -> DomNode {
        el("div")
            .with_attr("id", HEADER_ID)
            .with_child(comments_link())
            .with_child(DomNode::text("を読み込んでいます。"))
    }

    fn toc_entry(&self) -> DomNode {
        el("ul")
            .with_attr("id", TOC_ENTRY_ID)
            .with_child(el("li").with_child(comments_link()))
    }
}
