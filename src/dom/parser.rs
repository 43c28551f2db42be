use crate::dom::{DomNode, DomTree};
use scraper::{ElementRef, Html, Node};

/// Tags whose children should be stripped (invisible/script content)
const SKIP_CHILDREN: &[&str] = &["script", "style", "noscript", "svg"];

/// Parse raw HTML string into a DomTree
pub fn parse_html(html: &str, url: &str) -> DomTree {
    let document = Html::parse_document(html);

    let root = DomNode::document(vec![convert_element(document.root_element())]);

    DomTree {
        root,
        url: url.to_string(),
    }
}

/// Parse a markup fragment (e.g. a single comment section) into its top-level nodes.
pub fn parse_fragment(html: &str) -> Vec<DomNode> {
    let fragment = Html::parse_fragment(html);
    // parse_fragment wraps everything in a synthetic <html> root
    let root = fragment.root_element();
    convert_children(root)
}

fn convert_element(el: ElementRef<'_>) -> DomNode {
    let tag = el.value().name.local.as_ref().to_string();
    let attributes: Vec<(String, String)> = el
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    // Skip children of invisible elements
    if SKIP_CHILDREN.contains(&tag.as_str()) {
        return DomNode::element(tag, attributes, Vec::new());
    }

    DomNode::element(tag, attributes, convert_children(el))
}

fn convert_children(el: ElementRef<'_>) -> Vec<DomNode> {
    let mut children = Vec::new();

    for child_ref in el.children() {
        match child_ref.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child_ref) {
                    children.push(convert_element(child_el));
                }
            }
            Node::Text(t) => {
                let s = t.text.to_string();
                if !s.trim().is_empty() {
                    children.push(DomNode::text(s));
                }
            }
            _ => {}
        }
    }

    children
}
