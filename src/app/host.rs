// LogLens - app/host.rs
//
// Host-capability boundary. Everything the enhancer needs from the page
// (document query and mutation, clipboard, scrolling) goes through
// `PageHost`, so the same enhancer runs against a live page binding or the
// in-memory document used by tests and the CLI.

use crate::core::detect::Selector;
use crate::core::model::ElementSpec;
use crate::util::error::HostError;

/// Opaque handle to a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capabilities the enhancer depends on.
///
/// Methods that take a `NodeId` for a node that no longer exists return
/// `None`, `false`, or `HostError::NodeMissing`; they never panic.
pub trait PageHost {
    /// Nodes matching `selector`, in document order.
    fn select(&self, selector: &Selector) -> Vec<NodeId>;

    /// Serialised inner markup of a node.
    fn inner_markup(&self, node: NodeId) -> Option<String>;

    /// Replace the inner markup of a node.
    fn set_inner_markup(&mut self, node: NodeId, markup: &str) -> Result<(), HostError>;

    /// Plain text content of a node.
    fn text_content(&self, node: NodeId) -> Option<String>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), HostError>;

    /// Insert a new element as the previous sibling of `node`.
    fn insert_before(&mut self, node: NodeId, element: ElementSpec) -> Result<NodeId, HostError>;

    /// Insert a new element as the next sibling of `node`.
    fn insert_after(&mut self, node: NodeId, element: ElementSpec) -> Result<NodeId, HostError>;

    /// Detach a node. Removing a missing node is a no-op.
    fn remove(&mut self, node: NodeId);

    /// Write plain text to the clipboard.
    fn write_clipboard(&mut self, text: &str) -> Result<(), HostError>;

    /// Smoothly scroll the first descendant of `node` carrying `class` to the
    /// centre of the viewport. Returns false when there is no such descendant.
    fn scroll_into_view(&mut self, node: NodeId, class: &str) -> bool;
}
