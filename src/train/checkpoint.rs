//! Writing and reloading the experiment's model file

use std::path::{Path, PathBuf};

use crate::engine::TranslationEngine;
use crate::error::Result;
use crate::manifest::Experiment;
use crate::persistence::{data_dir, rotate_checkpoints, write_model_file};
use crate::vocab::Vocab;

/// Saves `<model_file>` plus engine parameters in `<model_file>.data/`.
#[derive(Debug)]
pub struct ModelCheckpoint<'a> {
    name: &'a str,
    experiment: &'a Experiment,
    model_file: PathBuf,
    keep: usize,
    saves: usize,
}

impl<'a> ModelCheckpoint<'a> {
    pub fn new(name: &'a str, experiment: &'a Experiment) -> Self {
        Self {
            name,
            experiment,
            model_file: PathBuf::from(&experiment.exp_global.model_file),
            keep: experiment.exp_global.save_num_checkpoints,
            saves: 0,
        }
    }

    pub fn model_file(&self) -> &Path {
        &self.model_file
    }

    /// Number of saves during this run.
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn save(
        &mut self,
        engine: &dyn TranslationEngine,
        src_vocab: &Vocab,
        trg_vocab: &Vocab,
    ) -> Result<()> {
        rotate_checkpoints(&self.model_file, self.keep)?;
        write_model_file(
            &self.model_file,
            self.name,
            self.experiment,
            src_vocab.words(),
            trg_vocab.words(),
        )?;
        engine.save_params(&data_dir(&self.model_file))?;
        self.saves += 1;
        Ok(())
    }

    /// Restore the last saved parameters. Returns `false` when nothing was
    /// saved during this run.
    pub fn reload(&self, engine: &mut dyn TranslationEngine) -> Result<bool> {
        if self.saves == 0 {
            return Ok(false);
        }
        engine.load_params(&data_dir(&self.model_file))?;
        Ok(true)
    }
}
