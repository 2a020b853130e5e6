//! Enclosing-scope lookup.
//!
//! A scope is the module, or failing that the function/subroutine/program,
//! that owns the declarations a rewrite has to extend. Lookup is a single
//! walk over parent links; no symbol table is needed.

use crate::error::{Location, TransformError, TransformResult};
use brt_xnode::{NodeId, NodeKind, Tree};

/// Importable scope enclosing a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// `MODULE` definition
    Module(NodeId),
    /// `PROGRAM`, `SUBROUTINE` or `FUNCTION` definition
    Function(NodeId),
}

impl Scope {
    /// The definition node of this scope.
    pub fn node(self) -> NodeId {
        match self {
            Scope::Module(id) | Scope::Function(id) => id,
        }
    }
}

/// Find the importable scope enclosing `node`.
///
/// The nearest enclosing module wins even when a procedure sits in between,
/// since a `USE` in the module is visible to every contained procedure.
/// Without a module the nearest function definition is used. `node` itself
/// is not considered.
pub fn resolve_scope(tree: &Tree, node: NodeId) -> Option<Scope> {
    let mut function = None;
    for ancestor in tree.ancestors(node) {
        match tree.kind(ancestor) {
            NodeKind::ModuleDefinition => return Some(Scope::Module(ancestor)),
            NodeKind::FunctionDefinition if function.is_none() => function = Some(ancestor),
            _ => {}
        }
    }
    function.map(Scope::Function)
}

/// Like [`resolve_scope`], but a missing scope is a [`TransformError::ScopeResolution`].
pub fn require_scope(tree: &Tree, node: NodeId) -> TransformResult<Scope> {
    resolve_scope(tree, node).ok_or_else(|| TransformError::ScopeResolution {
        node,
        kind: tree.kind(node),
        location: Location(tree.span(node)),
    })
}

/// The declarations block of a scope.
///
/// The block is normally a direct child of the definition; front ends that
/// wrap it in one extra element are accepted as well.
pub fn declarations_block(tree: &Tree, scope: Scope) -> TransformResult<NodeId> {
    let def = scope.node();
    if let Some(decls) = tree.first_child(def, NodeKind::Declarations) {
        return Ok(decls);
    }
    tree.children(def)
        .iter()
        .filter(|&&child| !tree.kind(child).is_scope())
        .find_map(|&child| tree.first_child(child, NodeKind::Declarations))
        .ok_or_else(|| {
            TransformError::invariant(
                format!("{} {} has no declarations block", tree.kind(def), def),
                tree.span(def),
            )
        })
}

/// Whether `node` sits inside the declarations block of its own scope.
///
/// The walk stops at the first scope definition, so an expression in the body
/// of a procedure is not a declaration site just because the procedure is
/// itself nested somewhere unusual.
pub fn is_declaration_site(tree: &Tree, node: NodeId) -> bool {
    for ancestor in tree.ancestors(node) {
        match tree.kind(ancestor) {
            NodeKind::Declarations => return true,
            kind if kind.is_scope() => return false,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(tree: &mut Tree, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = tree.create_node(kind);
        tree.append_child(parent, id).unwrap();
        id
    }

    #[test]
    fn test_module_wins_over_contained_function() {
        let mut tree = Tree::new(NodeKind::Program);
        let root = tree.root();
        let module = child(&mut tree, root, NodeKind::ModuleDefinition);
        let contains = child(&mut tree, module, NodeKind::ContainsStatement);
        let func = child(&mut tree, contains, NodeKind::FunctionDefinition);
        let body = child(&mut tree, func, NodeKind::Body);
        let call = child(&mut tree, body, NodeKind::FunctionCall);

        assert_eq!(resolve_scope(&tree, call), Some(Scope::Module(module)));
    }

    #[test]
    fn test_nearest_function_without_module() {
        let mut tree = Tree::new(NodeKind::Program);
        let root = tree.root();
        let program = child(&mut tree, root, NodeKind::FunctionDefinition);
        let contains = child(&mut tree, program, NodeKind::ContainsStatement);
        let inner = child(&mut tree, contains, NodeKind::FunctionDefinition);
        let body = child(&mut tree, inner, NodeKind::Body);
        let pow = child(&mut tree, body, NodeKind::PowerExpr);

        assert_eq!(resolve_scope(&tree, pow), Some(Scope::Function(inner)));
    }

    #[test]
    fn test_no_scope() {
        let mut tree = Tree::new(NodeKind::Program);
        let root = tree.root();
        let decls = child(&mut tree, root, NodeKind::GlobalDeclarations);
        let call = child(&mut tree, decls, NodeKind::FunctionCall);

        assert_eq!(resolve_scope(&tree, call), None);
        assert!(matches!(
            require_scope(&tree, call),
            Err(TransformError::ScopeResolution { kind: NodeKind::FunctionCall, .. })
        ));
    }

    #[test]
    fn test_declarations_block_lookup() {
        let mut tree = Tree::new(NodeKind::Program);
        let root = tree.root();
        let direct = child(&mut tree, root, NodeKind::FunctionDefinition);
        let decls = child(&mut tree, direct, NodeKind::Declarations);
        assert_eq!(declarations_block(&tree, Scope::Function(direct)), Ok(decls));

        let wrapped = child(&mut tree, root, NodeKind::ModuleDefinition);
        let wrapper = child(&mut tree, wrapped, NodeKind::Body);
        let inner_decls = child(&mut tree, wrapper, NodeKind::Declarations);
        assert_eq!(
            declarations_block(&tree, Scope::Module(wrapped)),
            Ok(inner_decls)
        );

        let bare = child(&mut tree, root, NodeKind::ModuleDefinition);
        assert!(matches!(
            declarations_block(&tree, Scope::Module(bare)),
            Err(TransformError::TreeInvariant { .. })
        ));
    }

    #[test]
    fn test_declaration_site_stops_at_scope() {
        let mut tree = Tree::new(NodeKind::Program);
        let root = tree.root();
        let func = child(&mut tree, root, NodeKind::FunctionDefinition);
        let decls = child(&mut tree, func, NodeKind::Declarations);
        let var = child(&mut tree, decls, NodeKind::VarDecl);
        let bound = child(&mut tree, var, NodeKind::UpperBound);
        let in_decl = child(&mut tree, bound, NodeKind::PowerExpr);
        let body = child(&mut tree, func, NodeKind::Body);
        let in_body = child(&mut tree, body, NodeKind::PowerExpr);

        assert!(is_declaration_site(&tree, in_decl));
        assert!(!is_declaration_site(&tree, in_body));
    }
}
