pub mod parser;
pub mod serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
}

/// Owned DOM node.
///
/// Attributes keep their source order so that serialized markup is stable
/// across runs (the annotation pipeline relies on byte-identical output).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNode {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<DomNode>,
    pub node_type: NodeType,
}

impl DomNode {
    pub fn document(children: Vec<DomNode>) -> Self {
        Self {
            tag: "#document".into(),
            attributes: Vec::new(),
            text: String::new(),
            children,
            node_type: NodeType::Document,
        }
    }

    pub fn element(
        tag: impl Into<String>,
        attrs: Vec<(String, String)>,
        children: Vec<DomNode>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes: attrs,
            text: String::new(),
            children,
            node_type: NodeType::Element,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tag: String::new(),
            attributes: Vec::new(),
            text: content.into(),
            children: Vec::new(),
            node_type: NodeType::Text,
        }
    }

    /// Builder helper: append an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder helper: append a child.
    pub fn with_child(mut self, child: DomNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.is_element() && self.tag == tag
    }

    /// Concatenated text of the subtree, exactly as `textContent` would read it.
    pub fn text_content(&self) -> String {
        let mut buf = String::new();
        self.text_content_inner(&mut buf);
        buf
    }

    fn text_content_inner(&self, buf: &mut String) {
        buf.push_str(&self.text);
        for child in &self.children {
            child.text_content_inner(buf);
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Add a class token unless already present. Returns true if added.
    pub fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr("class", joined);
        true
    }

    pub fn element_children(&self) -> impl Iterator<Item = &DomNode> {
        self.children.iter().filter(|c| c.is_element())
    }

    /// Depth-first pre-order search over descendants (self excluded).
    pub fn find_descendant<F>(&self, pred: F) -> Option<&DomNode>
    where
        F: Fn(&DomNode) -> bool + Copy,
    {
        for child in &self.children {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Whether `self` or any descendant satisfies `pred`.
    pub fn contains<F>(&self, pred: F) -> bool
    where
        F: Fn(&DomNode) -> bool + Copy,
    {
        pred(self) || self.find_descendant(pred).is_some()
    }

    /// Remove every descendant subtree matching `pred`. Returns removed count.
    pub fn remove_descendants<F>(&mut self, pred: F) -> usize
    where
        F: Fn(&DomNode) -> bool + Copy,
    {
        let before = self.children.len();
        self.children.retain(|c| !pred(c));
        let mut removed = before - self.children.len();
        for child in &mut self.children {
            removed += child.remove_descendants(pred);
        }
        removed
    }

    /// Replace every descendant matching `pred` with the node `f` builds from it.
    pub fn replace_descendants<P, F>(&mut self, pred: P, f: &F) -> usize
    where
        P: Fn(&DomNode) -> bool + Copy,
        F: Fn(&DomNode) -> DomNode,
    {
        let mut replaced = 0;
        for child in &mut self.children {
            if pred(child) {
                *child = f(child);
                replaced += 1;
            } else {
                replaced += child.replace_descendants(pred, f);
            }
        }
        replaced
    }
}

/// Parsed DOM tree with metadata
#[derive(Debug, Clone)]
pub struct DomTree {
    pub root: DomNode,
    pub url: String,
}
