//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! nmt-exp run experiments.yaml
//! nmt-exp run experiments.yaml -e pretrain --epochs 5
//! nmt-exp validate experiments.yaml --check-files
//! nmt-exp info experiments.yaml --format json
//! nmt-exp plan experiments.yaml
//! nmt-exp evaluate --ref dev.en --hyp dev.hyp --metric bleu,wer
//! ```

mod core;
mod types;

pub use core::{
    parse_args, Cli, Command, EvaluateArgs, InfoArgs, PlanArgs, RunArgs, ValidateArgs,
};
pub use types::OutputFormat;
