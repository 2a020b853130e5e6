//! JSON document form of a program.
//!
//! The front end hands over a program as a nested node document plus its type
//! table; the driver writes the rewritten program back in the same shape.
//! `kind` is the XcodeML element name. Elements the rewrites do not inspect
//! are carried through under their own name.
//!
//! ```json
//! {
//!   "types": { "F0": { "kind": "function", "returnType": "Freal" } },
//!   "root": {
//!     "kind": "XcodeProgram",
//!     "children": [
//!       { "kind": "FmoduleDefinition", "attrs": { "name": "m" }, "children": [] }
//!     ]
//!   }
//! }
//! ```

use crate::span::Span;
use crate::tree::{NodeId, Tree, TreeError};
use crate::types::TypeTable;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when reading or writing a program document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read program document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse program document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed program document: {0}")]
    Tree(#[from] TreeError),
}

/// One node of a program document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDoc {
    /// Element name
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attrs: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProgramDoc {
    #[serde(default)]
    types: TypeTable,
    root: NodeDoc,
}

/// A program tree together with its type table.
#[derive(Debug, Clone)]
pub struct Program {
    pub tree: Tree,
    pub types: TypeTable,
}

impl Program {
    pub fn new(tree: Tree, types: TypeTable) -> Self {
        Self { tree, types }
    }

    /// Load a program document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a program document.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let doc: ProgramDoc = serde_json::from_str(json)?;
        let tree = build_tree(&doc.root)?;
        Ok(Self::new(tree, doc.types))
    }

    /// Render the attached part of the tree as a pretty-printed document.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        let doc = ProgramDoc {
            types: self.types.clone(),
            root: self.node_doc(self.tree.root()),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Document form of the subtree rooted at `id`.
    pub fn node_doc(&self, id: NodeId) -> NodeDoc {
        let tree = &self.tree;
        NodeDoc {
            kind: tree.element(id).to_string(),
            value: tree.value(id).map(str::to_string),
            attrs: tree
                .attrs(id)
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            span: tree.span(id),
            children: tree
                .children(id)
                .iter()
                .map(|&child| self.node_doc(child))
                .collect(),
        }
    }
}

fn build_tree(root: &NodeDoc) -> Result<Tree, TreeError> {
    let mut tree = Tree::with_root_element(&root.kind);
    let root_id = tree.root();
    fill_node(&mut tree, root_id, root)?;
    Ok(tree)
}

fn fill_node(tree: &mut Tree, id: NodeId, doc: &NodeDoc) -> Result<(), TreeError> {
    if let Some(value) = &doc.value {
        tree.set_value(id, value.clone());
    }
    for (key, value) in &doc.attrs {
        tree.set_attr(id, key.clone(), value.clone());
    }
    if let Some(span) = doc.span {
        tree.set_span(id, span);
    }
    for child_doc in &doc.children {
        let child = tree.create_element(&child_doc.kind);
        tree.append_child(id, child)?;
        fill_node(tree, child, child_doc)?;
    }
    Ok(())
}
