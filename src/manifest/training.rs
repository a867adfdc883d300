//! Training regimen, batching, optimizer and loss configuration

use serde::{Deserialize, Serialize};

use super::eval::EvalTask;
use super::inference::{SamplingSearch, SearchStrategy};

/// Regimen slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Regimen {
    SimpleTrainingRegimen(SimpleTrainingRegimen),
}

impl Regimen {
    pub fn simple(&self) -> &SimpleTrainingRegimen {
        match self {
            Regimen::SimpleTrainingRegimen(r) => r,
        }
    }

    pub fn simple_mut(&mut self) -> &mut SimpleTrainingRegimen {
        match self {
            Regimen::SimpleTrainingRegimen(r) => r,
        }
    }
}

/// Epoch loop with dev checkpoints, patience and learning-rate decay
/// (`!SimpleTrainingRegimen`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleTrainingRegimen {
    pub src_file: String,
    pub trg_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_for_epochs: Option<usize>,
    /// Sentences between dev checkpoints; 0 means once per epoch
    pub dev_every: usize,
    pub batcher: Batcher,
    pub loss_calculator: LossCalculator,
    pub trainer: Trainer,
    pub lr_decay: f64,
    pub lr_decay_times: usize,
    pub patience: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_patience: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dev_tasks: Vec<EvalTask>,
    pub restart_trainer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_num_train_sents: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_src_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_trg_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for SimpleTrainingRegimen {
    fn default() -> Self {
        Self {
            src_file: String::new(),
            trg_file: String::new(),
            run_for_epochs: None,
            dev_every: 0,
            batcher: Batcher::default(),
            loss_calculator: LossCalculator::default(),
            trainer: Trainer::default(),
            lr_decay: 1.0,
            lr_decay_times: 3,
            patience: 1,
            initial_patience: None,
            dev_tasks: Vec::new(),
            restart_trainer: false,
            max_num_train_sents: None,
            max_src_len: None,
            max_trg_len: None,
            name: None,
        }
    }
}

// ============================================================================
// BATCHERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Batcher {
    SrcBatcher(BatchSize),
    TrgBatcher(BatchSize),
    InOrderBatcher(BatchSize),
}

impl Default for Batcher {
    fn default() -> Self {
        Batcher::SrcBatcher(BatchSize::default())
    }
}

impl Batcher {
    pub fn batch_size(&self) -> usize {
        match self {
            Batcher::SrcBatcher(b) | Batcher::TrgBatcher(b) | Batcher::InOrderBatcher(b) => {
                b.batch_size
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSize {
    pub batch_size: usize,
}

impl Default for BatchSize {
    fn default() -> Self {
        Self { batch_size: 32 }
    }
}

// ============================================================================
// TRAINERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Trainer {
    AdamTrainer(AdamTrainer),
    #[serde(rename = "SimpleSGDTrainer")]
    SimpleSgdTrainer(SimpleSgdTrainer),
}

impl Default for Trainer {
    fn default() -> Self {
        Trainer::SimpleSgdTrainer(SimpleSgdTrainer::default())
    }
}

impl Trainer {
    /// Initial learning rate
    pub fn learning_rate(&self) -> f64 {
        match self {
            Trainer::AdamTrainer(t) => t.alpha,
            Trainer::SimpleSgdTrainer(t) => t.e0,
        }
    }

    pub fn update_every(&self) -> usize {
        match self {
            Trainer::AdamTrainer(t) => t.update_every,
            Trainer::SimpleSgdTrainer(t) => t.update_every,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Trainer::AdamTrainer(_) => "AdamTrainer",
            Trainer::SimpleSgdTrainer(_) => "SimpleSGDTrainer",
        }
    }
}

/// `!AdamTrainer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamTrainer {
    pub alpha: f64,
    pub beta_1: f64,
    pub beta_2: f64,
    pub eps: f64,
    pub update_every: usize,
    pub skip_noisy: bool,
}

impl Default for AdamTrainer {
    fn default() -> Self {
        Self {
            alpha: 0.001,
            beta_1: 0.9,
            beta_2: 0.999,
            eps: 1e-8,
            update_every: 1,
            skip_noisy: false,
        }
    }
}

/// `!SimpleSGDTrainer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleSgdTrainer {
    pub e0: f64,
    pub update_every: usize,
    pub skip_noisy: bool,
}

impl Default for SimpleSgdTrainer {
    fn default() -> Self {
        Self {
            e0: 0.1,
            update_every: 1,
            skip_noisy: false,
        }
    }
}

// ============================================================================
// LOSS CALCULATORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LossCalculator {
    #[serde(rename = "MLELoss")]
    MleLoss(MleLoss),
    MinRiskLoss(MinRiskLoss),
}

impl Default for LossCalculator {
    fn default() -> Self {
        LossCalculator::MleLoss(MleLoss {})
    }
}

/// `!MLELoss`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MleLoss {}

/// `!MinRiskLoss`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinRiskLoss {
    pub alpha: f64,
    pub inv_eval: bool,
    pub unique_sample: bool,
    pub search_strategy: SearchStrategy,
}

impl Default for MinRiskLoss {
    fn default() -> Self {
        Self {
            alpha: 0.005,
            inv_eval: true,
            unique_sample: true,
            search_strategy: SearchStrategy::SamplingSearch(SamplingSearch::default()),
        }
    }
}
