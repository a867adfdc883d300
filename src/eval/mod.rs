//! Evaluation
//!
//! - `metrics`: corpus BLEU, WER, CER and sentence accuracy
//! - `task`: running `!LossEvalTask` / `!AccuracyEvalTask` against an engine
//!
//! Every task yields [`EvalScore`]s; the first score of a task is its main
//! score, and each score knows whether higher values are better.

mod error;
mod metrics;
mod task;

pub use error::EvalError;
pub use metrics::{
    char_error_rate, corpus_bleu, edit_distance, sentence_accuracy, word_error_rate, EvalScore,
    Metric, BLEU_MAX_N,
};
pub use task::{run_eval_task, score_files, task_inference, EvalContext};
