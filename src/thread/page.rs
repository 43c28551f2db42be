//! In-memory model of the host page: only the parts the augmentation reads
//! or writes are kept.

use url::Url;

use crate::dom::parser::{parse_fragment, parse_html};
use crate::dom::{DomNode, DomTree};
use crate::thread::render::{HEADER_ID, TOC_ENTRY_ID};
use crate::thread::section::is_loaded_comment;
use crate::thread::{COMMENTS_CONTAINER_ID, LOADING_SENTINEL, TOC_CLASS};

/// Error while building a `Page`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub message: String,
    pub phase: &'static str,
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

impl std::error::Error for PageError {}

/// The `#comments` container.
#[derive(Debug, Clone, Default)]
pub struct CommentThread {
    /// The loading sentinel is still displayed.
    pub loading: bool,
    pub sections: Vec<DomNode>,
}

/// Table-of-contents block; only what gets appended to it is tracked.
#[derive(Debug, Clone, Default)]
pub struct TocSlot {
    pub appended: Vec<DomNode>,
}

impl TocSlot {
    pub fn has_entry(&self) -> bool {
        self.appended.iter().any(|n| n.id() == Some(TOC_ENTRY_ID))
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    /// Handle of the article author, taken from the page URL.
    pub thread_author: String,
    /// The article title heading the summary header is placed after.
    pub has_title_heading: bool,
    /// Summary header currently placed after the title heading.
    pub header: Option<DomNode>,
    pub thread: Option<CommentThread>,
    pub toc: Option<TocSlot>,
}

impl Page {
    /// Parse a full HTML document.
    pub fn parse(html: &str, url: &str) -> Result<Self, PageError> {
        Self::from_tree(parse_html(html, url))
    }

    pub fn from_tree(tree: DomTree) -> Result<Self, PageError> {
        let url = Url::parse(&tree.url).map_err(|e| PageError {
            message: format!("Invalid URL: {}", e),
            phase: "url",
        })?;
        let thread_author = author_from_url(&url).ok_or_else(|| PageError {
            message: format!("No author segment in {}", url),
            phase: "author",
        })?;

        let root = &tree.root;
        let has_title_heading = root.find_descendant(|n| n.is_tag("h1")).is_some();
        let header = root.find_descendant(|n| n.id() == Some(HEADER_ID)).cloned();
        let thread = root
            .find_descendant(|n| n.is_element() && n.id() == Some(COMMENTS_CONTAINER_ID))
            .map(read_container);
        let toc = root
            .find_descendant(|n| n.has_class(TOC_CLASS))
            .map(|toc| TocSlot {
                appended: toc
                    .element_children()
                    .filter(|c| c.id() == Some(TOC_ENTRY_ID))
                    .cloned()
                    .collect(),
            });

        Ok(Self {
            url,
            thread_author,
            has_title_heading,
            header,
            thread,
            toc,
        })
    }

    /// Comment sections in document order (empty while the container is absent).
    pub fn sections(&self) -> &[DomNode] {
        self.thread.as_ref().map(|t| t.sections.as_slice()).unwrap_or(&[])
    }

    pub fn section(&self, id: &str) -> Option<&DomNode> {
        self.sections().iter().find(|s| s.id() == Some(id))
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut DomNode> {
        self.thread
            .as_mut()?
            .sections
            .iter_mut()
            .find(|s| s.id() == Some(id))
    }

    /// Whether at least one fully loaded comment section exists.
    pub fn has_loaded_comment(&self) -> bool {
        self.sections().iter().any(is_loaded_comment)
    }

    /// Host-side mutation: the thread finished streaming in a batch of sections.
    pub fn append_sections(&mut self, html: &str) -> usize {
        let thread = self.thread.get_or_insert_with(CommentThread::default);
        let before = thread.sections.len();
        thread
            .sections
            .extend(parse_fragment(html).into_iter().filter(|n| n.is_tag("section")));
        thread.sections.len() - before
    }

    /// Host-side mutation: the loading sentinel was replaced by content.
    pub fn finish_loading(&mut self) {
        if let Some(thread) = self.thread.as_mut() {
            thread.loading = false;
        }
    }

    /// Markup of every region the augmentation touches, in page order.
    pub fn augmented_markup(&self) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            out.push_str(&header.to_html());
        }
        for section in self.sections() {
            out.push_str(&section.to_html());
        }
        if let Some(toc) = &self.toc {
            for node in &toc.appended {
                out.push_str(&node.to_html());
            }
        }
        out
    }
}

fn read_container(container: &DomNode) -> CommentThread {
    let loading = container
        .element_children()
        .find(|c| c.is_tag("div"))
        .map(|d| d.text_content() == LOADING_SENTINEL)
        .unwrap_or(false);
    CommentThread {
        loading,
        sections: container
            .element_children()
            .filter(|c| c.is_tag("section"))
            .cloned()
            .collect(),
    }
}

/// `https://qiita.com/<author>/items/<id>` → `<author>`
fn author_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
