//! Pass sequencing for the driver.
//!
//! Each selected pass runs to completion over the whole program before the
//! next starts, with its own [`PassContext`](crate::context::PassContext).
//! The first failing pass stops the pipeline; passes that already ran keep
//! their effect on the in-memory program. Configuration is checked for every
//! selected pass before the first one runs.

use crate::calls::{rewrite_calls, CallRewriteReport};
use crate::config::{ConfigError, TransformConfig};
use crate::error::TransformError;
use crate::power::{lower_power_operators, PowerLoweringReport};
use brt_xnode::Program;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Errors that stop a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A selected pass has no configuration section.
    #[error("pass '{pass}' cannot run: {error}")]
    Config {
        pass: TransformPass,
        error: ConfigError,
    },

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// A rewriting pass selectable by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformPass {
    /// Rename intrinsic calls to their shadowed variants
    ShadowCalls,
    /// Replace `**` by calls to the portable power function
    LowerPower,
}

impl TransformPass {
    /// All passes in their default order.
    pub const ALL: [TransformPass; 2] = [TransformPass::ShadowCalls, TransformPass::LowerPower];

    pub fn name(self) -> &'static str {
        match self {
            TransformPass::ShadowCalls => "shadow-calls",
            TransformPass::LowerPower => "lower-power",
        }
    }
}

impl fmt::Display for TransformPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformPass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransformPass::ALL
            .into_iter()
            .find(|pass| pass.name() == s)
            .ok_or_else(|| format!("unknown pass '{s}'"))
    }
}

/// Result of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassReport {
    ShadowCalls(CallRewriteReport),
    LowerPower(PowerLoweringReport),
}

impl PassReport {
    pub fn pass(&self) -> TransformPass {
        match self {
            PassReport::ShadowCalls(_) => TransformPass::ShadowCalls,
            PassReport::LowerPower(_) => TransformPass::LowerPower,
        }
    }

    /// Number of nodes rewritten by the pass.
    pub fn rewritten(&self) -> usize {
        match self {
            PassReport::ShadowCalls(r) => r.renamed.len(),
            PassReport::LowerPower(r) => r.lowered.len(),
        }
    }

    /// Number of `USE` statements inserted by the pass.
    pub fn imports_added(&self) -> usize {
        match self {
            PassReport::ShadowCalls(r) => r.imports.len(),
            PassReport::LowerPower(r) => r.imports.len(),
        }
    }
}

fn check_config(config: &TransformConfig, pass: TransformPass) -> Result<(), PipelineError> {
    let checked = match pass {
        TransformPass::ShadowCalls => config.shadow_config().map(|_| ()),
        TransformPass::LowerPower => config.power_config().map(|_| ()),
    };
    checked.map_err(|error| PipelineError::Config { pass, error })
}

/// Run `passes` over `program` in order.
pub fn run_passes(
    program: &mut Program,
    config: &TransformConfig,
    passes: &[TransformPass],
) -> Result<Vec<PassReport>, PipelineError> {
    for &pass in passes {
        check_config(config, pass)?;
    }

    let mut reports = Vec::with_capacity(passes.len());
    for &pass in passes {
        let report = match pass {
            TransformPass::ShadowCalls => {
                let shadow = config
                    .shadow_config()
                    .map_err(|error| PipelineError::Config { pass, error })?;
                PassReport::ShadowCalls(rewrite_calls(program, shadow)?)
            }
            TransformPass::LowerPower => {
                let power = config
                    .power_config()
                    .map_err(|error| PipelineError::Config { pass, error })?;
                PassReport::LowerPower(lower_power_operators(program, power)?)
            }
        };
        info!(
            pass = %pass,
            rewritten = report.rewritten(),
            imports = report.imports_added(),
            "pass finished"
        );
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_names_parse() {
        for pass in TransformPass::ALL {
            assert_eq!(pass.name().parse::<TransformPass>(), Ok(pass));
        }
        assert!("inline-everything".parse::<TransformPass>().is_err());
    }
}
