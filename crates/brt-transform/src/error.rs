//! Fatal rewrite errors.
//!
//! Every error aborts the pass that raised it. Passes validate all of their
//! matches before mutating anything, so a failed pass leaves the program as
//! it found it; the driver decides whether to stop or skip the input.

use brt_xnode::{NodeId, NodeKind, Span, TreeError};
use std::fmt;
use thiserror::Error;

/// Result type for rewrite operations
pub type TransformResult<T> = Result<T, TransformError>;

/// Optional source location, rendered as `line N` or `unknown location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location(pub Option<Span>);

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(span) => write!(f, "line {span}"),
            None => f.write_str("unknown location"),
        }
    }
}

/// Errors raised by the rewriting passes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A matched node has no enclosing module or function/program.
    #[error("{kind} {node} at {location} has no enclosing module or function definition")]
    ScopeResolution {
        node: NodeId,
        kind: NodeKind,
        location: Location,
    },

    /// An exponentiation operator without exactly two operands.
    #[error("unexpected number of arguments to '**' at {location}: {arity}")]
    MalformedOperator {
        node: NodeId,
        arity: usize,
        location: Location,
    },

    /// Any other unexpected node shape.
    #[error("tree invariant violated at {location}: {message}")]
    TreeInvariant { message: String, location: Location },
}

impl TransformError {
    /// Source location of the offending node, when the front end recorded one.
    pub fn span(&self) -> Option<Span> {
        match self {
            TransformError::ScopeResolution { location, .. }
            | TransformError::MalformedOperator { location, .. }
            | TransformError::TreeInvariant { location, .. } => location.0,
        }
    }

    pub(crate) fn invariant(message: impl Into<String>, span: Option<Span>) -> Self {
        TransformError::TreeInvariant {
            message: message.into(),
            location: Location(span),
        }
    }
}

impl From<TreeError> for TransformError {
    fn from(err: TreeError) -> Self {
        TransformError::invariant(err.to_string(), None)
    }
}
