//! Node kinds and attribute keys of the program tree.
//!
//! The vocabulary follows the XcodeML/F element names the front end emits, so
//! a document produced by the parser can be loaded without a translation table.
//! Only the elements the rewrites inspect get their own kind; every other
//! element (`FdoStatement`, `FifStatement`, `FarrayRef`, ...) is
//! [`NodeKind::Other`] and the tree keeps its element name, so it passes
//! through a rewrite unchanged.

use std::fmt;

macro_rules! node_kinds {
    ($( $(#[$doc:meta])* $variant:ident => $tag:literal, )*) => {
        /// Kind tag of a tree node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $( $(#[$doc])* $variant, )*
            /// Any element the rewrites do not inspect
            Other,
        }

        impl NodeKind {
            /// Every named kind, in declaration order.
            pub const KNOWN: &'static [NodeKind] = &[$(NodeKind::$variant),*];

            /// Element name of this kind in the XcodeML vocabulary.
            ///
            /// `Other` has no fixed name; the tree records it per node.
            pub fn tag(self) -> &'static str {
                match self {
                    $( NodeKind::$variant => $tag, )*
                    NodeKind::Other => "other",
                }
            }

            /// Kind of an element name; unknown names are `Other`.
            pub fn from_tag(tag: &str) -> NodeKind {
                match tag {
                    $( $tag => NodeKind::$variant, )*
                    _ => NodeKind::Other,
                }
            }
        }
    };
}

node_kinds! {
    // === Program structure ===
    /// Root of a translation unit
    Program => "XcodeProgram",
    /// Top-level declarations of a translation unit
    GlobalDeclarations => "globalDeclarations",
    /// `MODULE` definition
    ModuleDefinition => "FmoduleDefinition",
    /// `PROGRAM`, `SUBROUTINE` or `FUNCTION` definition
    FunctionDefinition => "FfunctionDefinition",
    /// `CONTAINS` section of a module or procedure
    ContainsStatement => "FcontainsStatement",
    /// Ordered declaration list owned by a scope
    Declarations => "declarations",
    /// Executable statements of a procedure
    Body => "body",

    // === Declarations ===
    /// `USE` statement
    UseDecl => "FuseDecl",
    /// Variable declaration
    VarDecl => "varDecl",
    /// Array bound inside a type specification
    IndexRange => "indexRange",
    /// Upper bound of an index range
    UpperBound => "upperBound",

    // === Statements ===
    /// Assignment statement
    AssignStatement => "FassignStatement",
    /// Expression used as a statement (`CALL`)
    ExprStatement => "exprStatement",

    // === Expressions ===
    /// Function or subroutine call
    FunctionCall => "functionCall",
    /// Callee name of a call, or a declared name
    Name => "name",
    /// Argument list of a call
    Arguments => "arguments",
    /// Variable reference
    Var => "Var",
    /// `**`
    PowerExpr => "FpowerExpr",
    /// `+`
    PlusExpr => "plusExpr",
    /// `-`
    MinusExpr => "minusExpr",
    /// `*`
    MulExpr => "mulExpr",
    /// `/`
    DivExpr => "divExpr",
    /// Unary minus
    UnaryMinusExpr => "unaryMinusExpr",
    /// Integer literal
    IntConstant => "FintConstant",
    /// Real literal
    RealConstant => "FrealConstant",
}

impl NodeKind {
    /// Module or function/subroutine/program definition.
    pub fn is_scope(self) -> bool {
        matches!(
            self,
            NodeKind::ModuleDefinition | NodeKind::FunctionDefinition
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Attribute keys used by the rewrites.
pub mod attr {
    /// Module name of a `USE`, or a definition's name
    pub const NAME: &str = "name";
    /// Type id of an expression or name
    pub const TYPE: &str = "type";
}
