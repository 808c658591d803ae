//! CLI argument parsing for running the step outside a workflow engine.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "execute-once",
    version,
    about = "Run one external command against a media package and attach its result",
    after_help = "Examples:\n  execute-once run --package mp.json --options step.json\n  execute-once run --package mp.json --options step.json --workspace /tmp/ws --out mp.out.json\n  execute-once options",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Run(RunArgs),
    Options,
}

/// Run command inputs.
#[derive(Parser, Debug)]
#[command(about = "Execute the step against a media package JSON file")]
pub struct RunArgs {
    /// Media package JSON (id + elements)
    #[arg(long, value_name = "PATH")]
    pub package: PathBuf,

    /// Step options JSON object (exec, params, expected-type, ...)
    #[arg(long, value_name = "PATH", required_unless_present = "skip")]
    pub options: Option<PathBuf>,

    /// Workspace root for scratch output and relocated elements
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Where to write the updated package (defaults to overwriting --package)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Report a skip without running anything or rewriting the package
    #[arg(long)]
    pub skip: bool,

    /// Emit debug logging
    #[arg(long)]
    pub verbose: bool,
}
