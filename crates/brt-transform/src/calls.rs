//! Call shadowing.
//!
//! Calls to configured intrinsics (`exp`, `log`, ...) are renamed to a
//! prefixed variant, and every scope containing such a call gets a `USE` of
//! the modules providing the variants:
//!
//! ```text
//! module m                          module m
//!   ...                       →       use mo_br_transcendentals
//!   y = exp(x)                        y = br_exp(x)
//! ```
//!
//! Names are compared case-insensitively; the original spelling is kept after
//! the prefix. Calls inside declarations are renamed too. Re-running the pass
//! on its own output renames nothing, since `br_exp` is not a target. With an
//! empty prefix the names stay as they are and only the `USE` statements are
//! added.

use crate::config::ShadowConfig;
use crate::context::PassContext;
use crate::error::{TransformError, TransformResult};
use crate::imports::InsertedImport;
use crate::scope::{declarations_block, require_scope, Scope};
use brt_xnode::{NodeId, NodeKind, Program, Tree};
use tracing::{debug, info, instrument};

/// A call renamed by the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedCall {
    pub call: NodeId,
    pub original: String,
    pub renamed: String,
    pub scope: Scope,
}

/// Outcome of [`rewrite_calls`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRewriteReport {
    pub renamed: Vec<RenamedCall>,
    pub imports: Vec<InsertedImport>,
}

struct PlannedRename {
    call: NodeId,
    name: NodeId,
    original: String,
    scope: Scope,
}

/// The `name` node holding a call's callee.
pub fn callee_name(tree: &Tree, call: NodeId) -> TransformResult<NodeId> {
    tree.first_child(call, NodeKind::Name).ok_or_else(|| {
        TransformError::invariant(format!("call {call} has no callee name"), tree.span(call))
    })
}

/// Run call shadowing as one pass over the whole program.
#[instrument(skip_all, fields(prefix = %config.prefix))]
pub fn rewrite_calls(
    program: &mut Program,
    config: &ShadowConfig,
) -> TransformResult<CallRewriteReport> {
    let mut ctx = PassContext::new();
    let renamed = rewrite_calls_in(&mut ctx, program, config)?;
    let (imports, _) = ctx.finish();

    info!(
        renamed = renamed.len(),
        imports = imports.len(),
        "call shadowing complete"
    );
    Ok(CallRewriteReport { renamed, imports })
}

/// Call shadowing against an existing pass context.
///
/// Every match is validated before the tree is touched, so an error leaves
/// the program unchanged.
pub fn rewrite_calls_in(
    ctx: &mut PassContext,
    program: &mut Program,
    config: &ShadowConfig,
) -> TransformResult<Vec<RenamedCall>> {
    let plan = plan_renames(&program.tree, config)?;

    let mut renamed = Vec::with_capacity(plan.len());
    for rename in plan {
        let new_name = format!("{}{}", config.prefix, rename.original);
        program.tree.set_value(rename.name, new_name.clone());
        debug!(call = %rename.call, from = %rename.original, to = %new_name, "call renamed");

        for module in &config.modules {
            ctx.ensure_import(program, rename.scope, module)?;
        }

        renamed.push(RenamedCall {
            call: rename.call,
            original: rename.original,
            renamed: new_name,
            scope: rename.scope,
        });
    }
    Ok(renamed)
}

fn plan_renames(tree: &Tree, config: &ShadowConfig) -> TransformResult<Vec<PlannedRename>> {
    let mut plan = Vec::new();
    for call in tree.match_all(NodeKind::FunctionCall) {
        let name = callee_name(tree, call)?;
        let Some(original) = tree.value(name) else {
            return Err(TransformError::invariant(
                format!("callee name of call {call} is empty"),
                tree.span(call),
            ));
        };
        if !config.is_target(original) {
            continue;
        }

        let scope = require_scope(tree, call)?;
        declarations_block(tree, scope)?;
        plan.push(PlannedRename {
            call,
            name,
            original: original.to_string(),
            scope,
        });
    }
    Ok(plan)
}
