//! BRT Transform - apply source rewrites to a program document.
//!
//! Usage: `brt-transform <program.json> [--config cfg.yaml] [--param key=value]... [--pass NAME]...`
//!
//! Configuration comes from a YAML file, from flat `br_*` parameters, or from
//! both, in which case the parameters override the file. Without `--pass`
//! every pass runs, shadowing first. Only the sections of the selected passes
//! have to be configured.

use anyhow::{bail, Context, Result};
use brt_transform::{run_passes, TransformConfig, TransformPass};
use brt_xnode::Program;
use clap::Parser;
use indexmap::IndexMap;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "brt-transform")]
#[command(about = "Apply BRT source rewrites to a program document")]
struct Args {
    /// Program document (JSON) to rewrite
    input: PathBuf,

    /// Write the rewritten document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Flat configuration parameter, e.g. br_function_prefix=br_
    #[arg(long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Pass to run (shadow-calls, lower-power); repeat for several
    #[arg(long = "pass", value_name = "NAME")]
    passes: Vec<TransformPass>,
}

fn load_config(args: &Args) -> Result<TransformConfig> {
    let base = match &args.config {
        Some(path) => Some(
            TransformConfig::load(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
        ),
        None => None,
    };

    match (base, args.params.is_empty()) {
        (Some(config), true) => Ok(config),
        (Some(config), false) => {
            let flat = brt_tools::merge_parameters(config.to_parameters(), &args.params)?;
            Ok(TransformConfig::from_parameters(&flat)?)
        }
        (None, false) => {
            let flat = brt_tools::merge_parameters(IndexMap::new(), &args.params)?;
            Ok(TransformConfig::from_parameters(&flat)?)
        }
        (None, true) => bail!("no configuration given: use --config or --param"),
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let mut program = Program::load(&args.input)
        .with_context(|| format!("loading program {}", args.input.display()))?;

    let passes = if args.passes.is_empty() {
        TransformPass::ALL.to_vec()
    } else {
        args.passes.clone()
    };

    let reports = run_passes(&mut program, &config, &passes)
        .with_context(|| format!("transforming {}", args.input.display()))?;
    for report in &reports {
        info!(
            "{}: {} node(s) rewritten, {} use statement(s) added",
            report.pass(),
            report.rewritten(),
            report.imports_added()
        );
    }

    let json = program.to_json_pretty()?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn main() {
    brt_tools::init_logging();

    let args = Args::parse();

    if !args.input.is_file() {
        error!("'{}' is not a file", args.input.display());
        process::exit(1);
    }

    if let Err(e) = run(&args) {
        error!("{e:#}");
        process::exit(1);
    }
}
