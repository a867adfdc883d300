//! CLI command implementations

mod evaluate;
mod info;
mod plan;
mod run;
mod validate;


use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Command::Run(args) => run::run_run(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::Info(args) => info::run_info(args, log_level),
        Command::Plan(args) => plan::run_plan(args, log_level),
        Command::Evaluate(args) => evaluate::run_evaluate(args, log_level),
    }
}
