//! nmt-exp: declarative neural machine translation experiments
//!
//! A YAML file defines one or more named experiments. Each one combines a
//! model definition, a training regimen and evaluation tasks, built from
//! tagged nodes such as `!DefaultTranslator` or `!SimpleTrainingRegimen`.
//! Experiments run in file order, and a later one can reuse a component a
//! previous one saved through `!LoadSerialized`.
//!
//! # Example
//!
//! ```yaml
//! pretrain: !Experiment
//!   model: !DefaultTranslator
//!     src_reader: !PlainTextReader {}
//!     trg_reader: !PlainTextReader {}
//!   train: !SimpleTrainingRegimen
//!     src_file: '{EXP_DIR}/train.de'
//!     trg_file: '{EXP_DIR}/train.en'
//!     run_for_epochs: 2
//! ```
//!
//! # Modules
//!
//! - [`persistence`]: loading, placeholder expansion, `!LoadSerialized`, model files
//! - [`manifest`]: typed experiment configuration
//! - [`validation`]: schema and run-order checks
//! - [`vocab`], [`reader`], [`output`]: text handling
//! - [`engine`]: the translation engine seam and its baseline engine
//! - [`inference`], [`eval`], [`train`]: decoding, evaluation and training loops
//! - [`runner`]: sequential experiment execution
//! - [`cli`], [`config`]: the `nmt-exp` command line

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod inference;
pub mod manifest;
pub mod output;
pub mod persistence;
pub mod reader;
pub mod runner;
pub mod train;
pub mod validation;
pub mod vocab;

pub use error::{Error, Result};
