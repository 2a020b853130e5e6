//! `USE` statement injection.
//!
//! Within one pass each `(scope, module)` pair is inserted at most once, no
//! matter how many rewritten nodes in that scope request it. `USE` statements
//! present before the pass are left alone and not deduplicated against.

use crate::error::TransformResult;
use crate::scope::{declarations_block, Scope};
use brt_xnode::{attr, NodeId, NodeKind, Tree};
use indexmap::IndexSet;
use tracing::debug;

/// A `USE` statement inserted by a pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InsertedImport {
    pub scope: Scope,
    pub module: String,
    /// The new `FuseDecl` node
    pub node: NodeId,
}

/// Per-pass record of the `USE` statements already inserted.
#[derive(Debug, Default)]
pub struct ImportDeduplicator {
    handled: IndexSet<(Scope, String)>,
    inserted: Vec<InsertedImport>,
}

impl ImportDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `module` was already imported into `scope` during this pass.
    pub fn is_handled(&self, scope: Scope, module: &str) -> bool {
        self.handled.contains(&(scope, module.to_string()))
    }

    /// Append `USE module` to the scope's declarations unless this pass
    /// already did. Returns the new node, or `None` for a repeat request.
    pub fn ensure_import(
        &mut self,
        tree: &mut Tree,
        scope: Scope,
        module: &str,
    ) -> TransformResult<Option<NodeId>> {
        if self.is_handled(scope, module) {
            return Ok(None);
        }

        let decls = declarations_block(tree, scope)?;
        let use_decl = tree.create_node(NodeKind::UseDecl);
        tree.set_attr(use_decl, attr::NAME, module);
        tree.append_child(decls, use_decl)?;

        debug!(module, scope = %scope.node(), "use statement inserted");
        self.handled.insert((scope, module.to_string()));
        self.inserted.push(InsertedImport {
            scope,
            module: module.to_string(),
            node: use_decl,
        });
        Ok(Some(use_decl))
    }

    /// Insertions performed so far, in order.
    pub fn inserted(&self) -> &[InsertedImport] {
        &self.inserted
    }

    pub fn into_inserted(self) -> Vec<InsertedImport> {
        self.inserted
    }
}
