//! Placeholder function types for synthesized calls.
//!
//! A call node built by a pass needs a function type for its callee, but the
//! callee lives in a module the translation unit has never seen. A dummy
//! function type with the right return kind is enough for the back end.

use brt_xnode::{BasicKind, TypeId, TypeTable};
use indexmap::IndexMap;
use tracing::debug;

/// Register a fresh function type returning `return_kind`.
///
/// The id never collides with an existing entry; nothing already in the
/// table is touched.
pub fn synthesize_function_type(types: &mut TypeTable, return_kind: BasicKind) -> TypeId {
    let id = types.add_function_type(return_kind);
    debug!(type_id = %id, %return_kind, "function type synthesized");
    id
}

/// Per-pass cache so that every call a pass builds for the same return kind
/// shares one synthesized type.
#[derive(Debug, Default)]
pub struct TypeSynthesizer {
    by_return: IndexMap<BasicKind, TypeId>,
}

impl TypeSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pass-wide function type for `return_kind`, created on first use.
    pub fn function_type(&mut self, types: &mut TypeTable, return_kind: BasicKind) -> TypeId {
        self.by_return
            .entry(return_kind)
            .or_insert_with(|| synthesize_function_type(types, return_kind))
            .clone()
    }

    /// Types created by this pass.
    pub fn synthesized(&self) -> impl Iterator<Item = &TypeId> {
        self.by_return.values()
    }
}
