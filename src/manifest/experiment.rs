//! Experiment root and global settings

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

use super::eval::EvalTask;
use super::model::Model;
use super::training::Regimen;

/// Model file template used when `exp_global.model_file` is omitted.
pub const DEFAULT_MODEL_FILE: &str = "{EXP_DIR}/models/{EXP}.mod";

/// Log file template used when `exp_global.log_file` is omitted.
pub const DEFAULT_LOG_FILE: &str = "{EXP_DIR}/logs/{EXP}.log";

/// One named experiment (`!Experiment`).
///
/// # Required Fields
/// - `model`: the model definition
/// - `train`: the training regimen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Cross-cutting settings
    #[serde(default)]
    pub exp_global: ExpGlobal,

    /// Model definition
    pub model: Model,

    /// Training regimen
    pub train: Regimen,

    /// Final evaluation tasks, run after training
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evaluate: Vec<EvalTask>,
}

/// Global settings (`!ExpGlobal`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpGlobal {
    /// Where the trained model is written
    pub model_file: String,

    /// Where the experiment log is written
    pub log_file: String,

    /// Default dropout for components that leave it unset
    pub dropout: f64,

    /// Default weight noise for components that leave it unset
    pub weight_noise: f64,

    /// Default dimension for components that leave theirs unset
    pub default_layer_dim: usize,

    /// Number of saved checkpoints to keep
    pub save_num_checkpoints: usize,

    /// How per-sentence losses are combined within a batch
    pub loss_comb_method: LossCombMethod,

    /// Whether inference writes reports
    pub compute_report: bool,

    /// Custom `{NAME}` placeholders
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub placeholders: BTreeMap<String, Value>,
}

impl Default for ExpGlobal {
    fn default() -> Self {
        Self {
            model_file: DEFAULT_MODEL_FILE.to_string(),
            log_file: DEFAULT_LOG_FILE.to_string(),
            dropout: 0.3,
            weight_noise: 0.0,
            default_layer_dim: 512,
            save_num_checkpoints: 1,
            loss_comb_method: LossCombMethod::Sum,
            compute_report: false,
            placeholders: BTreeMap::new(),
        }
    }
}

/// Batch loss combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LossCombMethod {
    #[default]
    Sum,
    Avg,
}

impl LossCombMethod {
    /// Combine a summed batch loss over `batch_len` sentences.
    pub fn combine(self, summed: f64, batch_len: usize) -> f64 {
        match self {
            LossCombMethod::Sum => summed,
            LossCombMethod::Avg => summed / batch_len.max(1) as f64,
        }
    }
}
