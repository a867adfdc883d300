//! Evaluation task configuration

use serde::{Deserialize, Serialize};

use super::inference::{split_list, Inference};
use super::training::{Batcher, LossCalculator};

/// Evaluation task slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EvalTask {
    LossEvalTask(LossEvalTask),
    AccuracyEvalTask(AccuracyEvalTask),
}

impl EvalTask {
    pub fn desc(&self) -> Option<&str> {
        match self {
            EvalTask::LossEvalTask(t) => t.desc.as_deref(),
            EvalTask::AccuracyEvalTask(t) => t.desc.as_deref(),
        }
    }

    pub fn src_file(&self) -> &str {
        match self {
            EvalTask::LossEvalTask(t) => &t.src_file,
            EvalTask::AccuracyEvalTask(t) => &t.src_file,
        }
    }

    pub fn ref_file(&self) -> &str {
        match self {
            EvalTask::LossEvalTask(t) => &t.ref_file,
            EvalTask::AccuracyEvalTask(t) => &t.ref_file,
        }
    }
}

/// Average per-word loss on a reference corpus (`!LossEvalTask`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LossEvalTask {
    pub src_file: String,
    pub ref_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batcher: Option<Batcher>,
    pub loss_calculator: LossCalculator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_src_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_trg_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_num_sents: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// Decode, then score with one or more metrics (`!AccuracyEvalTask`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracyEvalTask {
    /// Comma-separated metric names
    pub eval_metrics: String,
    pub src_file: String,
    pub ref_file: String,
    pub hyp_file: String,
    /// Falls back to the model's inference when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference: Option<Inference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl Default for AccuracyEvalTask {
    fn default() -> Self {
        Self {
            eval_metrics: "bleu".to_string(),
            src_file: String::new(),
            ref_file: String::new(),
            hyp_file: String::new(),
            inference: None,
            desc: None,
        }
    }
}

impl AccuracyEvalTask {
    pub fn metric_names(&self) -> Vec<String> {
        split_list(&self.eval_metrics)
    }
}
