//! Annotation pipeline: Index → Number → Mark author → Header → TOC
//!
//! Every insertion first checks for its own marker, so running the pipeline
//! again over an annotated page leaves the markup byte-identical.

use crate::dom::DomNode;
use crate::thread::indexer::{index_comments, CommentIndex};
use crate::thread::page::Page;
use crate::thread::render::{
    AnchoredCount, QiitaMarkup, Renderer, ThreadSummary, AUTHOR_SUFFIX, AUTHOR_TEXT_CLASS,
    AUTHOR_SECTION_CLASS, COMMENTER_CLASS, ORDINAL_BADGE_CLASS, SUB_INDEX_BADGE_CLASS,
};
use crate::thread::section::{
    commenter_handle, commenter_link_path, is_deleted, node_at_mut, tally_handle, Comment,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationOutcome {
    /// No comment container on the page; nothing was touched.
    NoThread,
    /// The thread is still loading; only the placeholder header was written.
    Loading,
    Annotated {
        comments: usize,
        author_comments: usize,
        positive: usize,
    },
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct AnnotationPass {
    pub outcome: AnnotationOutcome,
    /// Fresh index of the annotated comments (absent unless `Annotated`).
    pub index: Option<CommentIndex>,
}

pub struct Annotator<R: Renderer = QiitaMarkup> {
    renderer: R,
}

impl Annotator<QiitaMarkup> {
    pub fn new() -> Self {
        Self { renderer: QiitaMarkup }
    }
}

impl Default for Annotator<QiitaMarkup> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Renderer> Annotator<R> {
    pub fn with_renderer(renderer: R) -> Self {
        Self { renderer }
    }

    /// Run the full pipeline over `page`.
    pub fn annotate(&self, page: &mut Page) -> AnnotationPass {
        let Some(thread) = page.thread.as_ref() else {
            log::debug!("comment container not found");
            return AnnotationPass {
                outcome: AnnotationOutcome::NoThread,
                index: None,
            };
        };

        if thread.loading {
            log::debug!("thread still loading");
            self.place_header(page, self.renderer.loading_header());
            return AnnotationPass {
                outcome: AnnotationOutcome::Loading,
                index: None,
            };
        }

        // Phase 1: Index the non-deleted sections
        let author = page.thread_author.clone();
        let mut comments = Vec::new();
        for (pos, section) in thread.sections.iter().enumerate() {
            if is_deleted(section) {
                continue;
            }
            match Comment::from_section(section, &author) {
                Some(comment) => comments.push(Comment {
                    position: pos,
                    ..comment
                }),
                None => log::debug!("section #{} has no id or commenter link, skipped", pos),
            }
        }
        let mut index = index_comments(comments);
        let positions: Vec<usize> = index.comments().iter().map(|c| c.position).collect();

        // Phase 2: Number sections and mark author links
        self.number_sections(page, &mut index, &positions);
        self.mark_author(page, &positions);

        // Phase 3: Header + TOC
        let summary = self.summarize(page, &index, &positions);
        let author_comments = summary.author.as_ref().map_or(0, |a| a.count);
        self.place_header(page, self.renderer.summary_header(&summary));
        self.append_toc(page, index.len());

        log::info!(
            "annotated {} comments ({} by author, {} positive)",
            index.len(),
            author_comments,
            index.positive.count
        );

        AnnotationPass {
            outcome: AnnotationOutcome::Annotated {
                comments: index.len(),
                author_comments,
                positive: index.positive.count,
            },
            index: Some(index),
        }
    }

    fn number_sections(&self, page: &mut Page, index: &mut CommentIndex, positions: &[usize]) {
        let Some(thread) = page.thread.as_mut() else {
            return;
        };
        let total = index.len();
        let plan: Vec<(String, String, usize)> = index
            .comments()
            .iter()
            .map(|c| (c.id.clone(), c.author.clone(), c.ordinal))
            .collect();

        index.reset_running_indices();

        for ((id, author, ordinal), &pos) in plan.iter().zip(positions) {
            let section = &mut thread.sections[pos];

            if let Some(path) = commenter_link_path(section) {
                if let Some(link) = node_at_mut(section, &path) {
                    link.add_class(COMMENTER_CLASS);
                }

                if let Some((k, of)) = index.next_sub_index(author) {
                    let has_badge = section.contains(|n| n.has_class(SUB_INDEX_BADGE_CLASS));
                    if let (false, Some((last, parent_path))) = (has_badge, path.split_last()) {
                        if let Some(parent) = node_at_mut(section, parent_path) {
                            parent
                                .children
                                .insert(last + 1, self.renderer.sub_index_badge(k, of));
                        }
                    }
                }
            }

            if !section.children.iter().any(|c| c.has_class(ORDINAL_BADGE_CLASS)) {
                section
                    .children
                    .insert(0, self.renderer.ordinal_badge(id, *ordinal, total));
            }
        }
    }

    fn mark_author(&self, page: &mut Page, positions: &[usize]) {
        let href = format!("/{}", page.thread_author);
        let author = page.thread_author.clone();
        let Some(thread) = page.thread.as_mut() else {
            return;
        };
        for &pos in positions {
            let section = &mut thread.sections[pos];
            mark_author_links(section, &href);

            if commenter_handle(section) == Some(author.as_str()) {
                section.add_class(AUTHOR_SECTION_CLASS);
            }
        }
    }

    /// Counts comments written by the thread author; mentions of the author
    /// inside other people's comments do not add to the count.
    fn summarize(&self, page: &Page, index: &CommentIndex, positions: &[usize]) -> ThreadSummary {
        let author = index
            .comments()
            .iter()
            .filter(|c| c.is_author_comment)
            .fold(None::<AnchoredCount>, |acc, c| match acc {
                Some(mut a) => {
                    a.count += 1;
                    Some(a)
                }
                None => Some(AnchoredCount {
                    count: 1,
                    anchor_id: c.id.clone(),
                }),
            });

        let positive = index.positive.anchor_id.as_ref().map(|id| AnchoredCount {
            count: index.positive.count,
            anchor_id: id.clone(),
        });

        let sections = page.sections();
        let handles = positions.iter().filter_map(|&pos| tally_handle(&sections[pos]));

        ThreadSummary {
            total: index.len(),
            author,
            positive,
            tally: tally(handles, &page.thread_author),
        }
    }

    /// Replace (never patch) the header after the title heading.
    fn place_header(&self, page: &mut Page, header: DomNode) -> bool {
        if !page.has_title_heading {
            log::debug!("title heading not found");
            return false;
        }
        page.header = Some(header);
        true
    }

    fn append_toc(&self, page: &mut Page, comments: usize) {
        if comments == 0 {
            return;
        }
        match page.toc.as_mut() {
            Some(toc) if !toc.has_entry() => toc.appended.push(self.renderer.toc_entry()),
            Some(_) => {}
            None => log::debug!("table of contents not found"),
        }
    }
}

/// Append the author suffix to every not-yet-marked link to `href` that is
/// the last link among its siblings.
fn mark_author_links(node: &mut DomNode, href: &str) -> usize {
    let last_link = node.children.iter().rposition(|c| c.is_tag("a"));
    let mut marked = 0;
    for (i, child) in node.children.iter_mut().enumerate() {
        if Some(i) == last_link
            && child.attr("href") == Some(href)
            && child.add_class(AUTHOR_TEXT_CLASS)
        {
            child.children.push(DomNode::text(AUTHOR_SUFFIX));
            marked += 1;
        }
        marked += mark_author_links(child, href);
    }
    marked
}

/// `"{count}: {handle}"` lines, most frequent first, ties in first-seen order.
fn tally<'a>(handles: impl Iterator<Item = &'a str>, thread_author: &str) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for handle in handles {
        let key = if handle == thread_author {
            format!("{}{}", handle, AUTHOR_SUFFIX)
        } else {
            handle.to_string()
        };
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .iter()
        .map(|(handle, n)| format!("{}: {}", n, handle))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::DELETED_PLACEHOLDER;

    const URL: &str = "https://qiita.com/alice/items/0123abcd";

    fn comment(id: &str, who: &str, body: &str) -> String {
        format!(
            r#"<section id="{id}"><div><a href="/{who}"><img src="{who}.png"></a><a href="/{who}">@{who}</a></div><div><p>{body}</p></div><div>LGTM</div></section>"#
        )
    }

    fn page(sections: &[String]) -> Page {
        let html = format!(
            r#"<html><body><h1>Article</h1><div class="p-items_toc"><div><ul><li>a</li></ul></div></div><div id="comments">{}</div></body></html>"#,
            sections.concat()
        );
        Page::parse(&html, URL).unwrap()
    }

    fn thread() -> Page {
        page(&[
            comment("comment-1", "bob", "質問です"),
            comment("comment-2", "alice", r#"<a class="user-mention" href="/bob">@bob</a> 回答です"#),
            comment("comment-3", "bob", "助かりました"),
            format!(r#"<section id="comment-x"><div>{}</div></section>"#, DELETED_PLACEHOLDER),
            comment("comment-4", "eve", "ありがとうございます"),
            comment("comment-5", "bob", r#"<a class="user-mention" href="/alice">@alice</a> なるほど"#),
        ])
    }

    fn badge_text(page: &Page, id: &str, class: &str) -> Option<String> {
        page.section(id)?
            .find_descendant(|n| n.has_class(class))
            .map(|n| n.text_content())
    }

    #[test]
    fn numbers_non_deleted_comments_densely() {
        let mut page = thread();
        let pass = Annotator::new().annotate(&mut page);
        assert_eq!(
            pass.outcome,
            AnnotationOutcome::Annotated { comments: 5, author_comments: 1, positive: 2 }
        );
        let ids = ["comment-1", "comment-2", "comment-3", "comment-4", "comment-5"];
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(
                badge_text(&page, id, ORDINAL_BADGE_CLASS),
                Some(format!("コメント {} / 5", i + 1))
            );
        }
        assert_eq!(badge_text(&page, "comment-x", ORDINAL_BADGE_CLASS), None);
        let index = pass.index.unwrap();
        assert_eq!(index.ordinal_of("comment-4"), Some(4));
        // positions count the deleted section, ordinals do not
        assert_eq!(index.get("comment-3").map(|c| c.position), Some(2));
        assert_eq!(index.get("comment-4").map(|c| c.position), Some(4));
    }

    #[test]
    fn sub_index_badges_only_for_repeat_commenters() {
        let mut page = thread();
        Annotator::new().annotate(&mut page);
        assert_eq!(badge_text(&page, "comment-1", SUB_INDEX_BADGE_CLASS).as_deref(), Some("(1 / 3)"));
        assert_eq!(badge_text(&page, "comment-3", SUB_INDEX_BADGE_CLASS).as_deref(), Some("(2 / 3)"));
        assert_eq!(badge_text(&page, "comment-5", SUB_INDEX_BADGE_CLASS).as_deref(), Some("(3 / 3)"));
        assert_eq!(badge_text(&page, "comment-2", SUB_INDEX_BADGE_CLASS), None);
        assert_eq!(badge_text(&page, "comment-4", SUB_INDEX_BADGE_CLASS), None);

        // badge sits right after the commenter link
        let header = &page.section("comment-1").unwrap().children[1];
        assert!(header.children[1].has_class(COMMENTER_CLASS));
        assert!(header.children[2].has_class(SUB_INDEX_BADGE_CLASS));
    }

    #[test]
    fn marks_author_section_and_author_links() {
        let mut page = thread();
        Annotator::new().annotate(&mut page);
        assert!(page.section("comment-2").unwrap().has_class(AUTHOR_SECTION_CLASS));
        assert!(!page.section("comment-5").unwrap().has_class(AUTHOR_SECTION_CLASS));

        let mention = page
            .section("comment-5")
            .unwrap()
            .find_descendant(|n| n.has_class("user-mention"))
            .unwrap();
        assert!(mention.has_class(AUTHOR_TEXT_CLASS));
        assert_eq!(mention.text_content(), "@alice（作者）");
    }

    #[test]
    fn header_summarizes_counts_and_tally() {
        let mut page = thread();
        Annotator::new().annotate(&mut page);
        let header = page.header.as_ref().unwrap();
        assert_eq!(header.attr("title"), Some("3: bob\n1: alice（作者）\n1: eve"));
        let html = header.to_html();
        assert!(html.contains(r##"<a href="#comment-2">作者</a>：<span>1</span>"##));
        assert!(html.contains(r##"<a href="#comment-3">前向き</a>：<span>2</span>"##));
        assert!(html.contains("<span>5</span>"));
    }

    #[test]
    fn second_run_is_byte_identical() {
        let mut page = thread();
        let annotator = Annotator::new();
        annotator.annotate(&mut page);
        let first = page.augmented_markup();
        annotator.annotate(&mut page);
        assert_eq!(page.augmented_markup(), first);
        assert_eq!(page.toc.as_ref().unwrap().appended.len(), 1);
    }

    #[test]
    fn loading_thread_only_gets_placeholder_header() {
        let mut page = Page::parse(
            r#"<html><body><h1>A</h1><div id="comments"><div>コメントを読み込んでいます。</div></div></body></html>"#,
            URL,
        )
        .unwrap();
        let pass = Annotator::new().annotate(&mut page);
        assert_eq!(pass.outcome, AnnotationOutcome::Loading);
        assert!(pass.index.is_none());
        assert_eq!(page.header.as_ref().unwrap().text_content(), "コメントを読み込んでいます。");
    }

    #[test]
    fn empty_thread_skips_toc() {
        let mut page = page(&[]);
        let pass = Annotator::new().annotate(&mut page);
        assert_eq!(
            pass.outcome,
            AnnotationOutcome::Annotated { comments: 0, author_comments: 0, positive: 0 }
        );
        assert!(page.toc.as_ref().unwrap().appended.is_empty());
    }

    #[test]
    fn missing_title_heading_leaves_header_alone() {
        let mut page = Page::parse(
            &format!(r#"<html><body><div id="comments">{}</div></body></html>"#, comment("comment-1", "bob", "x")),
            URL,
        )
        .unwrap();
        Annotator::new().annotate(&mut page);
        assert!(page.header.is_none());
        assert!(badge_text(&page, "comment-1", ORDINAL_BADGE_CLASS).is_some());
    }
}
