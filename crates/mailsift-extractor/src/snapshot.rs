//! In-memory document tree
//!
//! `SnapshotTree` is an arena-backed [`DocumentTree`] loaded from a JSON
//! snapshot of an inbox page. It supports the presentation writes the
//! highlighter needs and subtree-scoped change subscriptions, so it doubles as
//! the host page in tests and as the input format of the CLI.
//!
//! Snapshot format:
//!
//! ```json
//! {"tag": "tr", "attrs": {"class": "zA"}, "children": [
//!     {"tag": "span", "attrs": {"class": "bog"}, "text": "Budget review"}
//! ]}
//! ```
//!
//! A node without `tag` is a text node. An element's `text` becomes its first
//! text child.

use crate::error::ExtractorError;
use mailsift_domain::{DocumentTree, DocumentTreeMut, NewElement, NodeId, TreeChange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// Serializable description of a subtree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Element tag; `None` for a text node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Element attributes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,

    /// Text content (leading text child for elements)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Child nodes in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Element node
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Default::default()
        }
    }

    /// Text node
    pub fn text_node(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Set an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Append a class to the class attribute
    pub fn class(mut self, class: &str) -> Self {
        let classes = self.attrs.entry("class".to_string()).or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self
    }

    /// Set the leading text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child
    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Subscriber {
    scope: NodeId,
    sender: mpsc::UnboundedSender<TreeChange>,
}

/// Arena-backed document tree
///
/// Removed nodes leave an empty slot, so stale handles stay detectable and
/// are never reused.
#[derive(Debug)]
pub struct SnapshotTree {
    nodes: Vec<Option<NodeData>>,
    subscribers: Vec<Subscriber>,
}

impl SnapshotTree {
    /// Empty document
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            })],
            subscribers: Vec::new(),
        }
    }

    /// Build a document whose single top-level element is `spec`
    pub fn from_spec(spec: NodeSpec) -> Self {
        let mut tree = Self::new();
        let root = tree.root();
        tree.insert_spec(root, spec, None);
        tree
    }

    /// Parse a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self, ExtractorError> {
        let spec: NodeSpec = serde_json::from_str(json)?;
        if spec.tag.is_none() {
            return Err(ExtractorError::InvalidSnapshot(
                "top-level node must be an element".to_string(),
            ));
        }
        Ok(Self::from_spec(spec))
    }

    /// Serialize the top-level element back to a spec
    pub fn to_spec(&self) -> Option<NodeSpec> {
        self.children(self.root())
            .into_iter()
            .next()
            .and_then(|top| self.spec_of(top))
    }

    /// Serialize the document to pretty JSON
    pub fn to_json(&self) -> Result<String, ExtractorError> {
        let spec = self.to_spec().unwrap_or_default();
        Ok(serde_json::to_string_pretty(&spec)?)
    }

    /// Number of live nodes, including the document node
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the document has no content
    pub fn is_empty(&self) -> bool {
        self.children(self.root()).is_empty()
    }

    /// Subscribe to child-list changes anywhere under `scope`
    ///
    /// Attribute and class changes are not reported.
    pub fn subscribe(&mut self, scope: NodeId) -> mpsc::UnboundedReceiver<TreeChange> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.push(Subscriber { scope, sender });
        receiver
    }

    /// Drop every subscription, closing their channels
    pub fn unsubscribe_all(&mut self) {
        self.subscribers.clear();
    }

    /// Append a subtree as the last child of `parent`, as the host page would
    pub fn append_child(&mut self, parent: NodeId, spec: NodeSpec) -> Option<NodeId> {
        if !self.is_container(parent) {
            return None;
        }
        let added = self.insert_spec(parent, spec, None);
        self.notify(TreeChange {
            target: parent,
            added: vec![added],
            removed: 0,
        });
        Some(added)
    }

    /// Remove every child of `parent` and insert `specs` instead
    pub fn replace_children(&mut self, parent: NodeId, specs: Vec<NodeSpec>) -> bool {
        if !self.is_container(parent) {
            return false;
        }
        let old = self.children(parent);
        for child in &old {
            self.detach(*child);
        }
        let added = specs
            .into_iter()
            .map(|spec| self.insert_spec(parent, spec, None))
            .collect();
        self.notify(TreeChange {
            target: parent,
            added,
            removed: old.len(),
        });
        true
    }

    fn slot(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.index()).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(node.index()).and_then(Option::as_mut)
    }

    fn is_container(&self, node: NodeId) -> bool {
        matches!(
            self.slot(node).map(|data| &data.kind),
            Some(NodeKind::Document) | Some(NodeKind::Element { .. })
        )
    }

    fn alloc(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Some(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        }));
        id
    }

    /// Insert without notifying; `position` of `None` appends
    fn insert_spec(&mut self, parent: NodeId, spec: NodeSpec, position: Option<usize>) -> NodeId {
        let id = match spec.tag {
            Some(tag) => {
                let attrs = spec.attrs.into_iter().collect();
                let id = self.alloc(NodeKind::Element { tag, attrs }, parent);
                if let Some(text) = spec.text {
                    let text_id = self.alloc(NodeKind::Text(text), id);
                    if let Some(data) = self.slot_mut(id) {
                        data.children.push(text_id);
                    }
                }
                for child in spec.children {
                    self.insert_spec(id, child, None);
                }
                id
            }
            None => self.alloc(NodeKind::Text(spec.text.unwrap_or_default()), parent),
        };
        if let Some(data) = self.slot_mut(parent) {
            match position {
                Some(index) => data.children.insert(index.min(data.children.len()), id),
                None => data.children.push(id),
            }
        }
        id
    }

    /// Unlink `node` from its parent and clear its subtree's slots
    fn detach(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.slot(node)?.parent?;
        if let Some(data) = self.slot_mut(parent) {
            data.children.retain(|child| *child != node);
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.nodes.get_mut(current.index()).and_then(Option::take) {
                stack.extend(data.children);
            }
        }
        Some(parent)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn notify(&mut self, change: TreeChange) {
        let interested: Vec<bool> = self
            .subscribers
            .iter()
            .map(|sub| self.is_ancestor_or_self(sub.scope, change.target))
            .collect();
        let mut index = 0;
        self.subscribers.retain(|sub| {
            let keep = !interested[index] || sub.sender.send(change.clone()).is_ok();
            index += 1;
            keep && !sub.sender.is_closed()
        });
    }

    fn spec_of(&self, node: NodeId) -> Option<NodeSpec> {
        let data = self.slot(node)?;
        match &data.kind {
            NodeKind::Text(text) => Some(NodeSpec::text_node(text.clone())),
            NodeKind::Document => None,
            NodeKind::Element { tag, attrs } => Some(NodeSpec {
                tag: Some(tag.clone()),
                attrs: attrs.iter().cloned().collect(),
                text: None,
                children: data
                    .children
                    .iter()
                    .filter_map(|child| self.spec_of(*child))
                    .collect(),
            }),
        }
    }

    fn attrs_mut(&mut self, node: NodeId) -> Option<&mut Vec<(String, String)>> {
        match &mut self.slot_mut(node)?.kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }
}

impl Default for SnapshotTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree for SnapshotTree {
    fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    fn contains(&self, node: NodeId) -> bool {
        self.slot(node).is_some()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.slot(node)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.slot(node)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.slot(node)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(data) = self.slot(current) else {
                continue;
            };
            if let NodeKind::Text(value) = &data.kind {
                text.push_str(value);
            }
            stack.extend(data.children.iter().rev());
        }
        text
    }
}

impl DocumentTreeMut for SnapshotTree {
    fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            return self.contains(node);
        }
        let Some(attrs) = self.attrs_mut(node) else {
            return false;
        };
        match attrs.iter_mut().find(|(key, _)| key == "class") {
            Some((_, value)) if !value.trim().is_empty() => {
                value.push(' ');
                value.push_str(class);
            }
            Some((_, value)) => *value = class.to_string(),
            None => attrs.push(("class".to_string(), class.to_string())),
        }
        true
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> bool {
        let Some(attrs) = self.attrs_mut(node) else {
            return false;
        };
        if let Some((_, value)) = attrs.iter_mut().find(|(key, _)| key == "class") {
            let kept: Vec<&str> = value.split_whitespace().filter(|c| *c != class).collect();
            *value = kept.join(" ");
        }
        true
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(attrs) = self.attrs_mut(node) else {
            return false;
        };
        match attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
        true
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> bool {
        let Some(attrs) = self.attrs_mut(node) else {
            return false;
        };
        attrs.retain(|(key, _)| key != name);
        true
    }

    fn prepend_element(&mut self, parent: NodeId, element: NewElement) -> Option<NodeId> {
        if !self.is_container(parent) {
            return None;
        }
        let mut spec = NodeSpec::element(element.tag);
        if !element.classes.is_empty() {
            spec = spec.attr("class", element.classes.join(" "));
        }
        for (name, value) in element.attributes {
            spec = spec.attr(name, value);
        }
        spec.text = element.text;

        let added = self.insert_spec(parent, spec, Some(0));
        self.notify(TreeChange {
            target: parent,
            added: vec![added],
            removed: 0,
        });
        Some(added)
    }

    fn remove_node(&mut self, node: NodeId) -> bool {
        match self.detach(node) {
            Some(parent) => {
                self.notify(TreeChange {
                    target: parent,
                    added: Vec::new(),
                    removed: 1,
                });
                true
            }
            None => false,
        }
    }
}
