//! Command-line configuration
//!
//! The experiment YAML file is the configuration proper (see `persistence`
//! and `manifest`); this module holds the CLI surface and the overrides it
//! applies on top of decoded experiments.

pub mod cli;
mod overrides;

pub use cli::{
    parse_args, Cli, Command, EvaluateArgs, InfoArgs, OutputFormat, PlanArgs, RunArgs,
    ValidateArgs,
};
pub use overrides::{apply_overrides, Overrides};
