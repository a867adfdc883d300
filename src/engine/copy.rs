//! Baseline engine that copies source words into the target vocabulary.
//!
//! Every target token is scored with a uniform distribution over the target
//! vocabulary, so a sentence of `n` tokens has loss `n * ln |V|`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::{EngineError, EngineFactory, Hypothesis, SentencePair, TranslationEngine};
use crate::manifest::{DefaultTranslator, LossCalculator, SearchStrategy};
use crate::reader::Sentence;
use crate::vocab::{Vocab, WordId, ES, SS};

/// Parameter file name inside the engine's data directory.
pub const PARAMS_FILE: &str = "copy_engine.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct CopyParams {
    updates: u64,
    sentences: u64,
    learning_rate: f64,
    #[serde(default)]
    restarts: u64,
}

/// Copying baseline engine
#[derive(Debug, Clone)]
pub struct CopyEngine {
    src_to_trg: HashMap<WordId, WordId>,
    trg_unk: Option<WordId>,
    trg_size: usize,
    params: CopyParams,
}

impl CopyEngine {
    pub fn new(src_vocab: &Vocab, trg_vocab: &Vocab) -> Self {
        let src_to_trg = src_vocab
            .words()
            .iter()
            .enumerate()
            .filter_map(|(i, w)| {
                let trg = trg_vocab.words().iter().position(|t| t == w)?;
                Some((i as WordId, trg as WordId))
            })
            .collect();
        Self {
            src_to_trg,
            trg_unk: trg_vocab.unk_token(),
            trg_size: trg_vocab.len(),
            params: CopyParams::default(),
        }
    }

    fn token_loss(&self) -> f64 {
        (self.trg_size.max(2) as f64).ln()
    }

    /// Source words mapped into the target vocabulary, without `</s>`.
    fn copy(&self, src: &Sentence) -> Result<Vec<WordId>, EngineError> {
        src.iter()
            .filter(|&&id| id != SS && id != ES)
            .map(|id| match self.src_to_trg.get(id) {
                Some(&trg) => Ok(trg),
                None => self.trg_unk.ok_or(EngineError::MissingUnk),
            })
            .collect()
    }

    /// Fraction of reference positions the copy gets wrong.
    fn copy_risk(&self, pair: &SentencePair) -> Result<f64, EngineError> {
        let hyp = self.copy(&pair.src)?;
        let reference: Vec<WordId> = pair.trg.iter().copied().filter(|&id| id != ES).collect();
        if reference.is_empty() {
            return Ok(if hyp.is_empty() { 0.0 } else { 1.0 });
        }
        let matched = reference
            .iter()
            .zip(hyp.iter())
            .filter(|(r, h)| r == h)
            .count();
        Ok(1.0 - matched as f64 / reference.len() as f64)
    }

    pub fn updates(&self) -> u64 {
        self.params.updates
    }

    pub fn restarts(&self) -> u64 {
        self.params.restarts
    }
}

impl TranslationEngine for CopyEngine {
    fn train_batch(
        &mut self,
        batch: &[SentencePair],
        loss: &LossCalculator,
        learning_rate: f64,
    ) -> Result<f64, EngineError> {
        let total = match loss {
            LossCalculator::MleLoss(_) => batch
                .iter()
                .map(|p| self.calc_loss(&p.src, &p.trg))
                .sum::<Result<f64, _>>()?,
            LossCalculator::MinRiskLoss(_) => batch
                .iter()
                .map(|p| self.copy_risk(p))
                .sum::<Result<f64, _>>()?,
        };
        self.params.updates += 1;
        self.params.sentences += batch.len() as u64;
        self.params.learning_rate = learning_rate;
        Ok(total)
    }

    fn calc_loss(&self, _src: &Sentence, trg: &Sentence) -> Result<f64, EngineError> {
        Ok(trg.len() as f64 * self.token_loss())
    }

    fn generate(
        &self,
        src: &Sentence,
        search: &SearchStrategy,
        forced: Option<&Sentence>,
    ) -> Result<Hypothesis, EngineError> {
        let ids = match forced {
            Some(reference) => reference.clone(),
            None => {
                let mut ids = self.copy(src)?;
                ids.truncate(search.max_len().saturating_sub(1));
                ids.push(ES);
                ids
            }
        };
        let score = -(ids.len() as f64) * self.token_loss();
        Ok(Hypothesis { ids, score })
    }

    fn reset_optimizer(&mut self) {
        self.params.restarts += 1;
    }

    fn save_params(&self, dir: &Path) -> Result<(), EngineError> {
        fs::create_dir_all(dir).map_err(|source| EngineError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(PARAMS_FILE);
        let json = serde_json::to_string_pretty(&self.params).map_err(|e| EngineError::Params {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, json).map_err(|source| EngineError::Io { path, source })
    }

    fn load_params(&mut self, dir: &Path) -> Result<(), EngineError> {
        let path = dir.join(PARAMS_FILE);
        if !path.is_file() {
            return Err(EngineError::MissingParams {
                dir: dir.to_path_buf(),
            });
        }
        let text = fs::read_to_string(&path).map_err(|source| EngineError::Io {
            path: path.clone(),
            source,
        })?;
        self.params = serde_json::from_str(&text).map_err(|e| EngineError::Params {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// Builds a [`CopyEngine`] for any model configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyEngineFactory;

impl EngineFactory for CopyEngineFactory {
    fn build(
        &self,
        _model: &DefaultTranslator,
        src_vocab: &Vocab,
        trg_vocab: &Vocab,
    ) -> Result<Box<dyn TranslationEngine>, EngineError> {
        Ok(Box::new(CopyEngine::new(src_vocab, trg_vocab)))
    }
}
