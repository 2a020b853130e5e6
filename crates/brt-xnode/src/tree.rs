//! Arena-backed program tree with parent links.
//!
//! # Design
//!
//! - **Arena storage** - every node lives in `Tree::nodes` and is addressed by
//!   a [`NodeId`]. Ids stay valid for the lifetime of the tree, including for
//!   nodes that have been detached.
//! - **Single owner** - a node appears in at most one child list. Attaching a
//!   node that already has a parent is an error; callers detach first.
//! - **No cycles** - attaching a node below one of its own descendants is
//!   rejected.
//! - **Non-owning parent links** - `parent` mirrors the child lists and is only
//!   updated by the structural operations in this module.
//!
//! Detached nodes are unreachable from the root and therefore invisible to
//! [`Tree::match_all`]; their storage is reclaimed when the tree is dropped.
//!
//! # Examples
//!
//! ```
//! # use brt_xnode::{NodeKind, Tree};
//! let mut tree = Tree::new(NodeKind::Program);
//! let root = tree.root();
//! let module = tree.create_node(NodeKind::ModuleDefinition);
//! tree.append_child(root, module).unwrap();
//! let decls = tree.create_node(NodeKind::Declarations);
//! tree.append_child(module, decls).unwrap();
//!
//! assert_eq!(tree.parent(decls), Some(module));
//! assert_eq!(tree.match_all(NodeKind::Declarations), vec![decls]);
//! ```

use crate::kind::NodeKind;
use crate::span::Span;
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// Handle to a node stored in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural operation rejected by the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {node} is already attached under {parent}")]
    AlreadyAttached { node: NodeId, parent: NodeId },

    #[error("index {index} is out of bounds for {parent} with {len} children")]
    IndexOutOfBounds {
        parent: NodeId,
        index: usize,
        len: usize,
    },

    #[error("attaching {node} under {parent} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },

    #[error("node {0} has no parent")]
    Detached(NodeId),

    #[error("the root node cannot be detached")]
    DetachRoot,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    /// Element name of an `Other` node
    element: Option<String>,
    value: Option<String>,
    attrs: IndexMap<String, String>,
    span: Option<Span>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            element: None,
            value: None,
            attrs: IndexMap::new(),
            span: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Program tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Create a tree holding only a root node of the given kind.
    pub fn new(root_kind: NodeKind) -> Self {
        Self {
            nodes: vec![Node::new(root_kind)],
            root: NodeId(0),
        }
    }

    /// Create a tree whose root is the element `name`.
    pub fn with_root_element(name: &str) -> Self {
        let mut tree = Self::new(NodeKind::from_tag(name));
        let root = tree.root;
        tree.record_element(root, name);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever created, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached node.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let index = self.nodes.len();
        assert!(index < u32::MAX as usize, "too many tree nodes");
        self.nodes.push(Node::new(kind));
        NodeId(index as u32)
    }

    /// Create a detached node for the element `name`.
    ///
    /// Elements outside the [`NodeKind`] vocabulary become `Other` nodes that
    /// remember their name.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let id = self.create_node(NodeKind::from_tag(name));
        self.record_element(id, name);
        id
    }

    fn record_element(&mut self, id: NodeId, name: &str) {
        if self.kind(id) == NodeKind::Other {
            self.nodes[id.index()].element = Some(name.to_string());
        }
    }

    /// Create a detached node carrying a text value.
    pub fn create_valued(&mut self, kind: NodeKind, value: impl Into<String>) -> NodeId {
        let id = self.create_node(kind);
        self.set_value(id, value);
        id
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    /// Element name of the node, including the name of an `Other` node.
    pub fn element(&self, id: NodeId) -> &str {
        let node = &self.nodes[id.index()];
        node.element.as_deref().unwrap_or(node.kind.tag())
    }

    /// Text content of the node (a name's identifier, a literal's digits).
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.index()].value.as_deref()
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        self.nodes[id.index()].value = Some(value.into());
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.nodes[id.index()].attrs.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, id: NodeId, key: impl Into<String>, value: impl Into<String>) {
        self.nodes[id.index()]
            .attrs
            .insert(key.into(), value.into());
    }

    /// Attributes in insertion order.
    pub fn attrs(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> {
        self.nodes[id.index()]
            .attrs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.nodes[id.index()].span
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.index()].span = Some(span);
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Position of the node in its parent's child list.
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Iterator over ancestors, nearest first. Does not include `id`.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Whether the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    /// First direct child of the given kind.
    pub fn first_child(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == kind)
    }

    /// First strict descendant of the given kind, in pre-order.
    pub fn first_descendant(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.preorder(id)
            .into_iter()
            .skip(1)
            .find(|&n| self.kind(n) == kind)
    }

    /// All nodes of the subtree rooted at `id`, in pre-order.
    pub fn preorder(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// All attached nodes of the given kind, in pre-order.
    pub fn match_all(&self, kind: NodeKind) -> Vec<NodeId> {
        self.preorder(self.root)
            .into_iter()
            .filter(|&n| self.kind(n) == kind)
            .collect()
    }

    // ------------------------------------------------------------------
    // Structural mutation
    // ------------------------------------------------------------------

    /// Attach `child` at `index` in `parent`'s child list.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), TreeError> {
        if let Some(owner) = self.parent(child) {
            return Err(TreeError::AlreadyAttached {
                node: child,
                parent: owner,
            });
        }
        if child == self.root || parent == child || self.ancestors(parent).any(|a| a == child) {
            return Err(TreeError::Cycle {
                node: child,
                parent,
            });
        }
        let len = self.children(parent).len();
        if index > len {
            return Err(TreeError::IndexOutOfBounds { parent, index, len });
        }

        self.nodes[parent.index()].children.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child)
    }

    /// Attach `node` as the sibling immediately following `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<(), TreeError> {
        let parent = self.parent(anchor).ok_or(TreeError::Detached(anchor))?;
        let index = self.child_index(anchor).ok_or(TreeError::Detached(anchor))?;
        self.insert_child(parent, index + 1, node)
    }

    /// Remove `id` from its parent. Returns the index it occupied.
    ///
    /// The node keeps its own children, so a detached subtree can be
    /// re-attached elsewhere.
    pub fn detach(&mut self, id: NodeId) -> Result<usize, TreeError> {
        if id == self.root {
            return Err(TreeError::DetachRoot);
        }
        let parent = self.parent(id).ok_or(TreeError::Detached(id))?;
        let index = self.child_index(id).ok_or(TreeError::Detached(id))?;
        self.nodes[parent.index()].children.remove(index);
        self.nodes[id.index()].parent = None;
        Ok(index)
    }
}

/// Iterator returned by [`Tree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
