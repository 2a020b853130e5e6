// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Scoped rewriting engine for BRT source transformations
//!
//! Two passes rewrite a parsed XcodeML/F program so that numerical results do
//! not depend on the compiler's intrinsic implementations:
//!
//! - [`rewrite_calls`] renames calls to configured intrinsics to shadowed,
//!   prefixed variants and imports the modules providing them
//! - [`lower_power_operators`] replaces `**` with calls to a portable power
//!   function and imports its module
//!
//! Both resolve the enclosing module or procedure of each match
//! ([`scope`]), insert each `USE` at most once per scope ([`imports`]) and
//! fail the whole pass on malformed input ([`error`]).
//!
//! ```text
//! Program ──► rewrite_calls ──► lower_power_operators ──► Program
//!                 │                     │
//!                 └──── PassContext ────┘   (fresh per pass)
//! ```

pub mod calls;
pub mod config;
pub mod context;
pub mod error;
pub mod imports;
pub mod pipeline;
pub mod power;
pub mod scope;
pub mod types;

pub use calls::{rewrite_calls, CallRewriteReport, RenamedCall};
pub use config::{ConfigError, PowerConfig, ShadowConfig, TransformConfig};
pub use context::PassContext;
pub use error::{TransformError, TransformResult};
pub use imports::{ImportDeduplicator, InsertedImport};
pub use pipeline::{run_passes, PassReport, PipelineError, TransformPass};
pub use power::{lower_power_operators, LoweredOperator, PowerLoweringReport};
pub use scope::{resolve_scope, Scope};
