//! Mutable state of a single pass.
//!
//! Import bookkeeping and synthesized types are only meaningful for the tree
//! they were created on, so a [`PassContext`] is created when a pass starts
//! and dropped when it ends. Passes over different trees never share one.

use crate::error::TransformResult;
use crate::imports::{ImportDeduplicator, InsertedImport};
use crate::scope::Scope;
use crate::types::TypeSynthesizer;
use brt_xnode::{BasicKind, NodeId, Program, TypeId};

/// State threaded through one pass.
#[derive(Debug, Default)]
pub struct PassContext {
    imports: ImportDeduplicator,
    types: TypeSynthesizer,
}

impl PassContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import `module` into `scope` unless this pass already did.
    pub fn ensure_import(
        &mut self,
        program: &mut Program,
        scope: Scope,
        module: &str,
    ) -> TransformResult<Option<NodeId>> {
        self.imports.ensure_import(&mut program.tree, scope, module)
    }

    /// The pass-wide placeholder function type returning `return_kind`.
    pub fn function_type(&mut self, program: &mut Program, return_kind: BasicKind) -> TypeId {
        self.types.function_type(&mut program.types, return_kind)
    }

    /// Consume the context, returning what the pass added.
    pub fn finish(self) -> (Vec<InsertedImport>, Vec<TypeId>) {
        let types = self.types.synthesized().cloned().collect();
        (self.imports.into_inserted(), types)
    }
}
