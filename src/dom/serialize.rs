//! Markup serialization for `DomNode` trees.

use super::{DomNode, NodeType};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

impl DomNode {
    /// Serialize the subtree to HTML. Document nodes serialize their children only.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_node(self, &mut out);
        out
    }
}

fn write_node(node: &DomNode, out: &mut String) {
    match node.node_type {
        NodeType::Text => push_escaped(&node.text, out, false),
        NodeType::Document => {
            for child in &node.children {
                write_node(child, out);
            }
        }
        NodeType::Element => {
            out.push('<');
            out.push_str(&node.tag);
            for (name, value) in &node.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                push_escaped(value, out, true);
                out.push('"');
            }
            out.push('>');
            if VOID_TAGS.contains(&node.tag.as_str()) {
                return;
            }
            for child in &node.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&node.tag);
            out.push('>');
        }
    }
}

fn push_escaped(s: &str, out: &mut String, attribute: bool) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
