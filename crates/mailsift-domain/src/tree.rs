//! Document tree seam
//!
//! The inbox is rendered by a third-party application into a tree that changes
//! underneath us. The core only reads it, except for presentation markers.
//! Node handles are non-owning and may go stale at any time; every accessor
//! tolerates a handle whose node no longer exists.

use crate::selector::Selector;

/// Class carried by presentation elements inserted into the tree
///
/// Subtrees with this class are never read as record content.
pub const BADGE_CLASS: &str = "mailsift-priority-badge";

/// Opaque handle to a node in a [`DocumentTree`]
///
/// Never used for record identity or equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a handle from a tree-specific index
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Tree-specific index
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A structural change notification from a subscribed subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChange {
    /// Node whose child list changed
    pub target: NodeId,

    /// Nodes inserted under `target`
    pub added: Vec<NodeId>,

    /// Number of nodes removed from `target`
    pub removed: usize,
}

/// Element to insert for presentation (badges, markers)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewElement {
    /// Tag name
    pub tag: String,
    /// Class list
    pub classes: Vec<String>,
    /// Additional attributes
    pub attributes: Vec<(String, String)>,
    /// Text content
    pub text: Option<String>,
}

impl NewElement {
    /// Start an element with the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Add a class
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add an attribute
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Set the text content
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Read access to a document tree
pub trait DocumentTree {
    /// Document root
    fn root(&self) -> NodeId;

    /// Whether the handle still refers to a live node
    fn contains(&self, node: NodeId) -> bool;

    /// Parent of a node, if any
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children in document order (empty for stale handles)
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Tag name for elements, `None` for text nodes and stale handles
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    /// Attribute value
    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Concatenated text of the node and all descendants
    fn text_content(&self, node: NodeId) -> String;

    /// Whether the node's class list contains `class`
    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Whether the node matches the selector
    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        selector.matches(self, node)
    }

    /// All descendants of `scope` matching the selector, in document order
    fn select_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if selector.matches(self, node) {
                found.push(node);
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        found
    }

    /// First descendant of `scope` matching the selector, in document order
    fn select_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(scope).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if selector.matches(self, node) {
                return Some(node);
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        None
    }

    /// Like [`select_first`](Self::select_first), but never enters or
    /// returns a subtree whose root matches `excluded`
    fn select_first_excluding(&self, scope: NodeId, selector: &Selector, excluded: &Selector) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(scope).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if excluded.matches(self, node) {
                continue;
            }
            if selector.matches(self, node) {
                return Some(node);
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        None
    }

    /// Like [`text_content`](Self::text_content), skipping subtrees whose
    /// root matches `excluded`
    fn text_content_excluding(&self, node: NodeId, excluded: &Selector) -> String {
        if excluded.matches(self, node) {
            return String::new();
        }
        if self.tag_name(node).is_none() {
            return self.text_content(node);
        }
        self.children(node)
            .into_iter()
            .map(|child| self.text_content_excluding(child, excluded))
            .collect()
    }
}

/// Presentation-only writes
///
/// Every method returns `false`/`None` instead of failing when the handle is
/// stale. Record-bearing content is never modified through this trait.
pub trait DocumentTreeMut: DocumentTree {
    /// Add a class to the node's class list
    fn add_class(&mut self, node: NodeId, class: &str) -> bool;

    /// Remove a class from the node's class list
    fn remove_class(&mut self, node: NodeId, class: &str) -> bool;

    /// Set an attribute
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool;

    /// Remove an attribute
    fn remove_attribute(&mut self, node: NodeId, name: &str) -> bool;

    /// Insert an element as the first child of `parent`
    fn prepend_element(&mut self, parent: NodeId, element: NewElement) -> Option<NodeId>;

    /// Detach a node and its subtree
    fn remove_node(&mut self, node: NodeId) -> bool;
}
