//! Dev-checkpoint bookkeeping: best score, patience and learning-rate decay

use crate::eval::EvalScore;
use crate::manifest::SimpleTrainingRegimen;

/// What the regimen does after a dev checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointAction {
    /// New best score: write the model file
    Save,
    /// No improvement, patience not exhausted
    Continue,
    /// Patience exhausted: decay the learning rate and reload the best model
    DecayAndReload,
    /// Decayed `lr_decay_times` times already: stop training
    Stop,
}

/// Tracks dev scores across checkpoints.
#[derive(Debug, Clone)]
pub struct PatienceTracker {
    patience: usize,
    initial_patience: Option<usize>,
    lr_decay: f64,
    lr_decay_times: usize,
    best: Option<EvalScore>,
    /// Checkpoints since the last improvement or decay
    pub(crate) bad_checkpoints: usize,
    pub(crate) num_decays: usize,
}

impl PatienceTracker {
    pub fn new(regimen: &SimpleTrainingRegimen) -> Self {
        Self {
            patience: regimen.patience,
            initial_patience: regimen.initial_patience,
            lr_decay: regimen.lr_decay,
            lr_decay_times: regimen.lr_decay_times,
            best: None,
            bad_checkpoints: 0,
            num_decays: 0,
        }
    }

    pub fn best(&self) -> Option<&EvalScore> {
        self.best.as_ref()
    }

    pub fn num_decays(&self) -> usize {
        self.num_decays
    }

    /// Patience in force: `initial_patience` until the first decay.
    fn current_patience(&self) -> usize {
        match self.initial_patience {
            Some(initial) if self.num_decays == 0 => initial,
            _ => self.patience,
        }
    }

    /// Record the main score of a dev checkpoint.
    pub fn record(&mut self, score: EvalScore) -> CheckpointAction {
        let improved = self.best.as_ref().map_or(true, |best| score.better_than(best));
        if improved {
            self.best = Some(score);
            self.bad_checkpoints = 0;
            return CheckpointAction::Save;
        }

        self.bad_checkpoints += 1;
        if self.lr_decay >= 1.0 || self.bad_checkpoints < self.current_patience() {
            return CheckpointAction::Continue;
        }

        self.bad_checkpoints = 0;
        if self.num_decays >= self.lr_decay_times {
            return CheckpointAction::Stop;
        }
        self.num_decays += 1;
        CheckpointAction::DecayAndReload
    }
}
