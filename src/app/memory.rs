// LogLens - app/memory.rs
//
// In-memory document implementing `PageHost`.
//
// Elements are kept in a flat arena with parent links; an element's own
// inner markup is rendered before its child elements. Used by the CLI to
// enhance a log file without a browser, and by tests to drive the enhancer
// without a live page.

use crate::app::host::{NodeId, PageHost};
use crate::core::detect::Selector;
use crate::core::markup::{escape_attr, StyledText};
use crate::core::model::ElementSpec;
use crate::util::error::HostError;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
struct Element {
    spec: ElementSpec,
    parent: Option<NodeId>,
}

/// A minimal document: elements, document order, clipboard and scroll log.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: Vec<Element>,
    /// Attached elements in document order.
    order: Vec<NodeId>,
    clipboard: Option<String>,
    reject_clipboard: bool,
    scrolls: Vec<NodeId>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element as the last child of `parent` (or as a root).
    pub fn append(&mut self, parent: Option<NodeId>, spec: ElementSpec) -> NodeId {
        let id = NodeId(self.elements.len());
        self.elements.push(Element { spec, parent });
        self.order.push(id);
        id
    }

    /// The element description of an attached node.
    pub fn element(&self, node: NodeId) -> Option<&ElementSpec> {
        self.get(node).map(|e| &e.spec)
    }

    /// Last text written to the clipboard.
    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    /// Make subsequent clipboard writes fail (simulates a denied permission).
    pub fn set_reject_clipboard(&mut self, reject: bool) {
        self.reject_clipboard = reject;
    }

    /// Nodes passed to successful `scroll_into_view` calls, oldest first.
    pub fn scrolls(&self) -> &[NodeId] {
        &self.scrolls
    }

    /// Previous attached sibling sharing the same parent.
    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.get(node)?.parent;
        let pos = self.position(node)?;
        self.order[..pos]
            .iter()
            .rev()
            .find(|n| self.elements[n.0].parent == parent)
            .copied()
    }

    /// Next attached sibling sharing the same parent.
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.get(node)?.parent;
        let pos = self.position(node)?;
        self.order[pos + 1..]
            .iter()
            .find(|n| self.elements[n.0].parent == parent)
            .copied()
    }

    /// Serialise every root element (and its children) in document order.
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        for node in self.children(None) {
            self.render_node(node, &mut out);
        }
        out
    }

    fn render_node(&self, node: NodeId, out: &mut String) {
        let spec = &self.elements[node.0].spec;
        out.push('<');
        out.push_str(&spec.tag);
        if let Some(id) = &spec.id {
            out.push_str(&format!(" id=\"{}\"", escape_attr(id)));
        }
        if !spec.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape_attr(&spec.classes.join(" "))));
        }
        for (name, value) in &spec.attrs {
            out.push_str(&format!(" {name}=\"{}\"", escape_attr(value)));
        }
        out.push('>');
        out.push_str(&spec.inner);
        for child in self.children(Some(node)) {
            self.render_node(child, out);
        }
        out.push_str(&format!("</{}>", spec.tag));
    }

    fn get(&self, node: NodeId) -> Option<&Element> {
        self.position(node)?;
        self.elements.get(node.0)
    }

    fn position(&self, node: NodeId) -> Option<usize> {
        self.order.iter().position(|n| *n == node)
    }

    fn children(&self, parent: Option<NodeId>) -> Vec<NodeId> {
        self.order
            .iter()
            .filter(|n| self.elements[n.0].parent == parent)
            .copied()
            .collect()
    }

    fn has_ancestor_with_id(&self, node: NodeId, id: &str) -> bool {
        let mut current = self.elements[node.0].parent;
        while let Some(p) = current {
            if self.elements[p.0].spec.id.as_deref() == Some(id) {
                return true;
            }
            current = self.elements[p.0].parent;
        }
        false
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let spec = &self.elements[node.0].spec;
        let tag_is = |t: &str| spec.tag.eq_ignore_ascii_case(t);
        let has_class = |c: &str| spec.classes.iter().any(|x| x == c);
        match *selector {
            Selector::Class(c) => has_class(c),
            Selector::Tag(t) => tag_is(t),
            Selector::TagClass(t, c) => tag_is(t) && has_class(c),
            Selector::TagAttr { tag, attr, value } => {
                tag_is(tag) && spec.attrs.iter().any(|(n, v)| n == attr && v == value)
            }
            Selector::DescendantOfId { id, tag } => {
                tag_is(tag) && self.has_ancestor_with_id(node, id)
            }
        }
    }

    fn insert_sibling(
        &mut self,
        node: NodeId,
        spec: ElementSpec,
        after: bool,
    ) -> Result<NodeId, HostError> {
        let pos = self
            .position(node)
            .ok_or(HostError::NodeMissing { node: node.0 })?;
        let id = NodeId(self.elements.len());
        self.elements.push(Element {
            spec,
            parent: self.elements[node.0].parent,
        });
        self.order.insert(if after { pos + 1 } else { pos }, id);
        Ok(id)
    }
}

fn class_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"class="([^"]*)""#).expect("class_attr_regex: invalid regex"))
}

impl PageHost for MemoryDocument {
    fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.order
            .iter()
            .filter(|n| self.matches(**n, selector))
            .copied()
            .collect()
    }

    fn inner_markup(&self, node: NodeId) -> Option<String> {
        self.get(node).map(|e| e.spec.inner.clone())
    }

    fn set_inner_markup(&mut self, node: NodeId, markup: &str) -> Result<(), HostError> {
        self.position(node)
            .ok_or(HostError::NodeMissing { node: node.0 })?;
        self.elements[node.0].spec.inner = markup.to_string();
        Ok(())
    }

    fn text_content(&self, node: NodeId) -> Option<String> {
        let own = StyledText::parse(&self.get(node)?.spec.inner).plain_text();
        let children: String = self
            .children(Some(node))
            .into_iter()
            .filter_map(|c| self.text_content(c))
            .collect();
        Some(own + &children)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node)
            .is_some_and(|e| e.spec.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), HostError> {
        self.position(node)
            .ok_or(HostError::NodeMissing { node: node.0 })?;
        let classes = &mut self.elements[node.0].spec.classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
        Ok(())
    }

    fn insert_before(&mut self, node: NodeId, element: ElementSpec) -> Result<NodeId, HostError> {
        self.insert_sibling(node, element, false)
    }

    fn insert_after(&mut self, node: NodeId, element: ElementSpec) -> Result<NodeId, HostError> {
        self.insert_sibling(node, element, true)
    }

    fn remove(&mut self, node: NodeId) {
        let mut doomed = vec![node];
        let mut i = 0;
        while i < doomed.len() {
            let parent = doomed[i];
            doomed.extend(self.children(Some(parent)));
            i += 1;
        }
        self.order.retain(|n| !doomed.contains(n));
    }

    fn write_clipboard(&mut self, text: &str) -> Result<(), HostError> {
        if self.reject_clipboard {
            return Err(HostError::ClipboardRejected {
                reason: "clipboard permission denied".to_string(),
            });
        }
        self.clipboard = Some(text.to_string());
        Ok(())
    }

    fn scroll_into_view(&mut self, node: NodeId, class: &str) -> bool {
        let Some(element) = self.get(node) else {
            return false;
        };
        let found = class_attr_regex()
            .captures_iter(&element.spec.inner)
            .any(|caps| caps[1].split_whitespace().any(|c| c == class));
        if found {
            self.scrolls.push(node);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (MemoryDocument, NodeId, NodeId) {
        let mut doc = MemoryDocument::new();
        let panel = doc.append(None, ElementSpec::new("div").id("main-panel"));
        let pre = doc.append(Some(panel), ElementSpec::new("pre").inner("a &lt; b"));
        (doc, panel, pre)
    }

    #[test]
    fn test_descendant_selector() {
        let (mut doc, _, pre) = sample();
        doc.append(None, ElementSpec::new("pre"));
        let found = doc.select(&Selector::DescendantOfId {
            id: "main-panel",
            tag: "pre",
        });
        assert_eq!(found, vec![pre]);
    }

    #[test]
    fn test_text_content_decodes_and_includes_children() {
        let (doc, panel, pre) = sample();
        assert_eq!(doc.text_content(pre).as_deref(), Some("a < b"));
        assert_eq!(doc.text_content(panel).as_deref(), Some("a < b"));
    }

    #[test]
    fn test_insert_before_and_after_are_siblings() {
        let (mut doc, panel, pre) = sample();
        let before = doc.insert_before(pre, ElementSpec::new("div")).unwrap();
        let after = doc.insert_after(pre, ElementSpec::new("div")).unwrap();
        assert_eq!(doc.previous_sibling(pre), Some(before));
        assert_eq!(doc.next_sibling(pre), Some(after));
        assert_eq!(
            doc.render_html(),
            "<div id=\"main-panel\"><div></div><pre>a &lt; b</pre><div></div></div>"
        );
        assert!(doc.element(panel).is_some());
    }

    #[test]
    fn test_removed_node_is_missing() {
        let (mut doc, panel, pre) = sample();
        doc.remove(panel);
        assert!(doc.inner_markup(pre).is_none());
        assert_eq!(
            doc.set_inner_markup(pre, "x"),
            Err(HostError::NodeMissing { node: pre.0 })
        );
        assert!(doc.select(&Selector::Tag("pre")).is_empty());
    }

    #[test]
    fn test_clipboard_rejection() {
        let (mut doc, _, _) = sample();
        doc.write_clipboard("one").unwrap();
        doc.set_reject_clipboard(true);
        assert!(doc.write_clipboard("two").is_err());
        assert_eq!(doc.clipboard(), Some("one"));
    }

    #[test]
    fn test_scroll_requires_class() {
        let (mut doc, _, pre) = sample();
        assert!(!doc.scroll_into_view(pre, "loglens-error"));
        doc.set_inner_markup(pre, "<span class=\"loglens-error x\">boom</span>")
            .unwrap();
        assert!(doc.scroll_into_view(pre, "loglens-error"));
        assert_eq!(doc.scrolls(), &[pre]);
    }
}
