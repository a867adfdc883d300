//! Evaluation errors

use thiserror::Error;

/// Errors raised while scoring hypotheses
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Unknown metric '{name}'. Valid: {valid}")]
    UnknownMetric { name: String, valid: String },

    #[error("Hypothesis has {hyp_lines} lines but the reference has {ref_lines}")]
    LineCountMismatch { hyp_lines: usize, ref_lines: usize },

    #[error("Source has {src_lines} lines but the reference has {ref_lines}")]
    ParallelMismatch { src_lines: usize, ref_lines: usize },

    #[error("Cannot score an empty corpus")]
    EmptyCorpus,

    #[error("No evaluation metrics given")]
    NoMetrics,
}

/// Result alias for metric computation
pub type Result<T> = std::result::Result<T, EvalError>;
