use anyhow::{Context, Result};
use clap::Parser;
use execute_once::config::{configuration_options, load_options};
use execute_once::local::{local_services, WorkspacePaths};
use execute_once::mediapackage::{load_package, write_package};
use execute_once::step::{STEP_DESCRIPTION, STEP_ID};
use execute_once::{ExecuteOnceStep, StepOutcome};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Command, RootArgs, RunArgs};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    match args.command {
        Command::Run(args) => run(args),
        Command::Options => {
            println!("{STEP_ID}: {STEP_DESCRIPTION}");
            for (key, description) in configuration_options() {
                println!("{key:<16} {description}");
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_workspace() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("execute-once")
}

fn run(args: RunArgs) -> Result<()> {
    init_logging(args.verbose);

    let mut package = load_package(&args.package)?;
    let workspace = WorkspacePaths::new(args.workspace.unwrap_or_else(default_workspace));
    let step = ExecuteOnceStep::new(local_services(&workspace));

    if args.skip {
        let outcome = step.skip(&package);
        println!(
            "skip: package {} left untouched, {} ms",
            package.id,
            outcome.elapsed().as_millis()
        );
        return Ok(());
    }

    let options_path = args
        .options
        .as_deref()
        .context("--options is required unless --skip is given")?;
    let options = load_options(options_path)?;
    let outcome = step
        .execute(&mut package, &options)
        .with_context(|| format!("{} step on package {}", step.id(), package.id))?;

    let out = args.out.unwrap_or(args.package);
    write_package(&out, &package)?;

    match outcome {
        StepOutcome::Continue { elapsed, element } => {
            let element = element.as_deref().unwrap_or("none");
            println!(
                "continue: element {element}, {} ms, wrote {}",
                elapsed.as_millis(),
                out.display()
            );
        }
        StepOutcome::Skip => println!("skip: wrote {}", out.display()),
    }
    Ok(())
}
