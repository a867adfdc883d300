//! Translation engine seam
//!
//! The loader, regimen, inference and evaluation code drive training and
//! decoding through [`TranslationEngine`]; the numeric model behind it is
//! pluggable. [`CopyEngine`] is the built-in baseline.

mod copy;

pub use copy::{CopyEngine, CopyEngineFactory, PARAMS_FILE};

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::manifest::{DefaultTranslator, LossCalculator, SearchStrategy};
use crate::reader::Sentence;
use crate::vocab::{Vocab, WordId};

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid parameter file {}: {message}", path.display())]
    Params { path: PathBuf, message: String },

    #[error("No saved parameters in {}", dir.display())]
    MissingParams { dir: PathBuf },

    #[error("Target vocabulary has no <unk> token")]
    MissingUnk,
}

/// One source/target training pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SentencePair {
    pub src: Sentence,
    pub trg: Sentence,
}

/// Decoder output. `ids` end with `</s>`; `score` is a log probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub ids: Vec<WordId>,
    pub score: f64,
}

/// A trainable translation model.
pub trait TranslationEngine {
    /// Train on one batch at `learning_rate`; returns the summed loss.
    fn train_batch(
        &mut self,
        batch: &[SentencePair],
        loss: &LossCalculator,
        learning_rate: f64,
    ) -> Result<f64, EngineError>;

    /// Summed negative log likelihood of `trg` given `src`.
    fn calc_loss(&self, src: &Sentence, trg: &Sentence) -> Result<f64, EngineError>;

    /// Decode `src`, or score `forced` when given.
    fn generate(
        &self,
        src: &Sentence,
        search: &SearchStrategy,
        forced: Option<&Sentence>,
    ) -> Result<Hypothesis, EngineError>;

    /// Discard optimizer state, keeping the parameters.
    fn reset_optimizer(&mut self) {}

    fn save_params(&self, dir: &Path) -> Result<(), EngineError>;

    fn load_params(&mut self, dir: &Path) -> Result<(), EngineError>;
}

/// Builds an engine for a decoded model and its vocabularies.
pub trait EngineFactory {
    fn build(
        &self,
        model: &DefaultTranslator,
        src_vocab: &Vocab,
        trg_vocab: &Vocab,
    ) -> Result<Box<dyn TranslationEngine>, EngineError>;
}
