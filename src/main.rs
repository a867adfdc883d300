//! nmt-exp CLI
//!
//! Command-line entry point for running YAML-defined translation experiments.
//!
//! # Usage
//!
//! ```bash
//! # Run every experiment in file order
//! nmt-exp run experiments.yaml
//!
//! # Run one experiment with fewer epochs
//! nmt-exp run experiments.yaml -e pretrain --epochs 1
//!
//! # Validate config
//! nmt-exp validate experiments.yaml --check-files
//!
//! # Show run order and saved-model dependencies
//! nmt-exp plan experiments.yaml
//!
//! # Score a hypothesis file
//! nmt-exp evaluate --ref test.en --hyp test.hyp --metric bleu,wer
//! ```

use clap::Parser;
use nmt_exp::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
