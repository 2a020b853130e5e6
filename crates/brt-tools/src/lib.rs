// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! BRT Tools
//!
//! Command-line driver for the BRT source rewrites.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with a default filter.
///
/// Use `RUST_LOG` environment variable to override the default filter.
/// Logs go to stderr so that a document written to stdout stays clean.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,brt_tools=info,brt_transform=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse `key=value` command-line parameters into an ordered map.
///
/// Later occurrences of a key replace earlier ones.
pub fn parse_parameters(raw: &[String]) -> Result<IndexMap<String, String>> {
    let mut params = IndexMap::new();
    for entry in raw {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("parameter '{entry}' is not of the form key=value");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("parameter '{entry}' has an empty key");
        }
        params.insert(key.to_string(), value.to_string());
    }
    Ok(params)
}

/// Merge flat parameters over a base parameter map.
pub fn merge_parameters(
    base: IndexMap<String, String>,
    overrides: &[String],
) -> Result<IndexMap<String, String>> {
    let mut merged = base;
    merged.extend(parse_parameters(overrides).context("invalid --param")?);
    Ok(merged)
}
