// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Program tree for BRT source rewrites
//!
//! This crate holds the data the rewriting passes operate on: an arena tree
//! of XcodeML/F nodes with parent links, source spans, the program's type
//! table, and the JSON document form used to exchange programs with the
//! front end.

pub mod document;
pub mod kind;
pub mod span;
pub mod tree;
pub mod types;

pub use document::{DocumentError, NodeDoc, Program};
pub use kind::{attr, NodeKind};
pub use span::Span;
pub use tree::{Ancestors, NodeId, Tree, TreeError};
pub use types::{BasicKind, FunctionType, TypeEntry, TypeId, TypeTable};
