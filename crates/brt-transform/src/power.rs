//! Power operator lowering.
//!
//! Replaces `a ** b` with a call to a portable power function so results do
//! not depend on the compiler's exponentiation code, and imports the module
//! providing it:
//!
//! ```text
//! function f(a, b)                  function f(a, b)
//!   ...                       →       use mo_br_exponentiation
//!   f = a ** b                        f = br_pow(a, b)
//! ```
//!
//! # Pass structure
//!
//! 1. **Discovery** - collect every `FpowerExpr`, check it has exactly two
//!    operands, resolve its scope and that scope's declarations block. Any
//!    failure aborts before the tree is modified.
//! 2. **Imports** - one `USE` per distinct scope.
//! 3. **Type** - one placeholder function type shared by all generated calls.
//! 4. **Splice** - build the call, move base and exponent into its argument
//!    list, insert it next to the operator and detach the operator.
//!
//! Operators inside a declarations block (array bounds, kind expressions) are
//! only imported for. A function call is not a valid specification
//! expression there, so they stay operators.

use crate::config::PowerConfig;
use crate::context::PassContext;
use crate::error::{Location, TransformError, TransformResult};
use crate::imports::InsertedImport;
use crate::scope::{declarations_block, is_declaration_site, require_scope, Scope};
use brt_xnode::{attr, BasicKind, NodeId, NodeKind, Program, Tree, TypeId};
use tracing::{debug, info, instrument};

/// An operator replaced by a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredOperator {
    /// The detached `FpowerExpr`
    pub operator: NodeId,
    /// The `functionCall` now in its place
    pub call: NodeId,
    pub scope: Scope,
}

/// Outcome of [`lower_power_operators`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerLoweringReport {
    pub lowered: Vec<LoweredOperator>,
    /// Operators left in place because they sit in declarations
    pub declaration_sites: Vec<NodeId>,
    pub imports: Vec<InsertedImport>,
    /// Placeholder type of the generated calls, if any call was generated
    pub function_type: Option<TypeId>,
}

#[derive(Debug)]
struct PlannedOperator {
    operator: NodeId,
    base: NodeId,
    exponent: NodeId,
    scope: Scope,
    in_declarations: bool,
}

/// Run power lowering as one pass over the whole program.
#[instrument(skip_all, fields(function = %config.function_name))]
pub fn lower_power_operators(
    program: &mut Program,
    config: &PowerConfig,
) -> TransformResult<PowerLoweringReport> {
    let mut ctx = PassContext::new();
    let (lowered, declaration_sites) = lower_power_operators_in(&mut ctx, program, config)?;
    let (imports, mut types) = ctx.finish();

    info!(
        lowered = lowered.len(),
        declaration_sites = declaration_sites.len(),
        imports = imports.len(),
        "power lowering complete"
    );
    Ok(PowerLoweringReport {
        lowered,
        declaration_sites,
        imports,
        function_type: types.pop(),
    })
}

/// Power lowering against an existing pass context.
///
/// Returns the lowered operators and the declaration-site operators that
/// were left in place.
pub fn lower_power_operators_in(
    ctx: &mut PassContext,
    program: &mut Program,
    config: &PowerConfig,
) -> TransformResult<(Vec<LoweredOperator>, Vec<NodeId>)> {
    let plan = discover(&program.tree)?;

    for op in &plan {
        ctx.ensure_import(program, op.scope, &config.module_name)?;
    }

    let (declaration_sites, to_lower): (Vec<_>, Vec<_>) =
        plan.into_iter().partition(|op| op.in_declarations);
    let declaration_sites: Vec<NodeId> = declaration_sites.iter().map(|op| op.operator).collect();
    for &op in &declaration_sites {
        debug!(operator = %op, "operator in declarations kept");
    }
    if to_lower.is_empty() {
        return Ok((Vec::new(), declaration_sites));
    }

    let fn_type = ctx.function_type(program, BasicKind::Real);
    let mut lowered = Vec::with_capacity(to_lower.len());
    for op in to_lower {
        let call = splice_call(&mut program.tree, &op, &config.function_name, &fn_type)?;
        debug!(operator = %op.operator, call = %call, "power operator lowered");
        lowered.push(LoweredOperator {
            operator: op.operator,
            call,
            scope: op.scope,
        });
    }
    Ok((lowered, declaration_sites))
}

fn discover(tree: &Tree) -> TransformResult<Vec<PlannedOperator>> {
    let mut plan = Vec::new();
    for operator in tree.match_all(NodeKind::PowerExpr) {
        let &[base, exponent] = tree.children(operator) else {
            return Err(TransformError::MalformedOperator {
                node: operator,
                arity: tree.children(operator).len(),
                location: Location(tree.span(operator)),
            });
        };
        let scope = require_scope(tree, operator)?;
        declarations_block(tree, scope)?;
        plan.push(PlannedOperator {
            operator,
            base,
            exponent,
            scope,
            in_declarations: is_declaration_site(tree, operator),
        });
    }
    Ok(plan)
}

/// Replace `op` by `function(base, exponent)`. Returns the new call node.
fn splice_call(
    tree: &mut Tree,
    op: &PlannedOperator,
    function: &str,
    fn_type: &TypeId,
) -> TransformResult<NodeId> {
    let call = tree.create_node(NodeKind::FunctionCall);
    tree.set_attr(call, attr::TYPE, BasicKind::Real.tag());
    if let Some(span) = tree.span(op.operator) {
        tree.set_span(call, span);
    }

    let name = tree.create_valued(NodeKind::Name, function);
    tree.set_attr(name, attr::TYPE, fn_type.as_str());
    tree.append_child(call, name)?;

    let args = tree.create_node(NodeKind::Arguments);
    tree.append_child(call, args)?;
    for operand in [op.base, op.exponent] {
        tree.detach(operand)?;
        tree.append_child(args, operand)?;
    }

    tree.insert_after(op.operator, call)?;
    tree.detach(op.operator)?;
    Ok(call)
}
