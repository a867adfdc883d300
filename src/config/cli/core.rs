//! Core CLI types - Cli, Command, and argument structs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::types::OutputFormat;

/// nmt-exp: declarative NMT experiment runner
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "nmt-exp")]
#[command(version)]
#[command(about = "Load, validate and run YAML-defined machine translation experiments")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the experiments of a configuration file in order
    Run(RunArgs),

    /// Validate a configuration file without running it
    Validate(ValidateArgs),

    /// Display the experiments of a configuration
    Info(InfoArgs),

    /// Show run order, output paths and saved-model dependencies
    Plan(PlanArgs),

    /// Score a hypothesis file against a reference file
    Evaluate(EvaluateArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Path to YAML experiment file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Run only these experiments (repeatable); default is all
    #[arg(short, long = "experiment", value_name = "NAME")]
    pub experiments: Vec<String>,

    /// Resolve and validate every experiment but don't train
    #[arg(long)]
    pub dry_run: bool,

    /// Stop at the first failing experiment
    #[arg(long)]
    pub fail_fast: bool,

    /// Override number of training epochs
    #[arg(long)]
    pub epochs: Option<usize>,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML experiment file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Require referenced input files to exist
    #[arg(long)]
    pub check_files: bool,

    /// Show detailed validation report
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to YAML experiment file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the plan command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct PlanArgs {
    /// Path to YAML experiment file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Plan only these experiments
    #[arg(short, long = "experiment", value_name = "NAME")]
    pub experiments: Vec<String>,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the evaluate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct EvaluateArgs {
    /// Reference file, one sentence per line
    #[arg(long = "ref", value_name = "FILE")]
    pub reference: PathBuf,

    /// Hypothesis file, one sentence per line
    #[arg(long, value_name = "FILE")]
    pub hyp: PathBuf,

    /// Comma-separated metrics (bleu, wer, cer, accuracy)
    #[arg(short, long, default_value = "bleu")]
    pub metric: String,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
