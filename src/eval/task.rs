//! Running configured evaluation tasks against an engine.

use std::path::{Path, PathBuf};

use super::error::EvalError;
use super::metrics::{EvalScore, Metric};
use crate::engine::TranslationEngine;
use crate::error::Result;
use crate::inference::{perform_inference, InferenceFiles};
use crate::manifest::{AccuracyEvalTask, EvalTask, LossEvalTask, SimpleInference};
use crate::reader::{read_lines, PlainTextReader};
use crate::runner::log::ExperimentLog;
use crate::vocab::WordId;

/// What an evaluation task needs from the running experiment.
pub struct EvalContext<'a> {
    pub engine: &'a dyn TranslationEngine,
    pub src_reader: &'a mut PlainTextReader,
    pub trg_reader: &'a mut PlainTextReader,
    /// The model's own inference settings
    pub inference: &'a SimpleInference,
    pub compute_report: bool,
}

/// Run one task. The first score is the task's main score.
pub fn run_eval_task(
    task: &EvalTask,
    ctx: &mut EvalContext<'_>,
    log: &mut ExperimentLog,
) -> Result<Vec<EvalScore>> {
    let scores = match task {
        EvalTask::LossEvalTask(t) => vec![eval_loss(t, ctx)?],
        EvalTask::AccuracyEvalTask(t) => eval_accuracy(t, ctx, log)?,
    };
    for score in &scores {
        log.info(format!("  {score}"));
    }
    Ok(scores)
}

fn within(limit: Option<usize>, sent: &[WordId]) -> bool {
    // length includes the trailing </s>
    limit.map_or(true, |max| sent.len() <= max)
}

/// Average loss per target word, `</s>` included.
fn eval_loss(task: &LossEvalTask, ctx: &mut EvalContext<'_>) -> Result<EvalScore> {
    let src = ctx
        .src_reader
        .read_sents(Path::new(&task.src_file), task.max_num_sents)?;
    let trg = ctx
        .trg_reader
        .read_sents(Path::new(&task.ref_file), task.max_num_sents)?;
    if src.len() != trg.len() {
        return Err(EvalError::ParallelMismatch {
            src_lines: src.len(),
            ref_lines: trg.len(),
        }
        .into());
    }

    let mut total_loss = 0.0;
    let mut words = 0usize;
    for (s, t) in src.iter().zip(&trg) {
        if !within(task.max_src_len, s) || !within(task.max_trg_len, t) {
            continue;
        }
        total_loss += ctx.engine.calc_loss(s, t)?;
        words += t.len();
    }
    if words == 0 {
        return Err(EvalError::EmptyCorpus.into());
    }
    Ok(EvalScore::loss(total_loss / words as f64, task.desc.as_deref()))
}

/// Inference settings for an accuracy task: its own, or the model's, with
/// the task's files.
pub fn task_inference(
    task: &AccuracyEvalTask,
    model: &SimpleInference,
) -> (SimpleInference, InferenceFiles) {
    let config = task
        .inference
        .as_ref()
        .map_or_else(|| model.clone(), |i| i.simple().clone());
    let ref_file = config
        .ref_file
        .clone()
        .unwrap_or_else(|| task.ref_file.clone());
    let files = InferenceFiles {
        src_file: PathBuf::from(&task.src_file),
        trg_file: PathBuf::from(&task.hyp_file),
        ref_file: Some(PathBuf::from(ref_file)),
    };
    (config, files)
}

fn eval_accuracy(
    task: &AccuracyEvalTask,
    ctx: &mut EvalContext<'_>,
    log: &mut ExperimentLog,
) -> Result<Vec<EvalScore>> {
    let metrics = Metric::parse_list(&task.eval_metrics)?;

    let (config, files) = task_inference(task, ctx.inference);
    let output = perform_inference(
        ctx.engine,
        ctx.src_reader,
        ctx.trg_reader,
        &config,
        &files,
        ctx.compute_report,
        log,
    )?;

    let hyps: Vec<String> = output.lines().into_iter().map(str::to_string).collect();
    let refs = read_lines(Path::new(&task.ref_file))?;
    metrics
        .into_iter()
        .map(|metric| -> Result<EvalScore> {
            let value = metric.score(&hyps, &refs)?;
            Ok(EvalScore::from_metric(metric, value, task.desc.as_deref()))
        })
        .collect()
}

/// Score an existing hypothesis file against a reference file.
pub fn score_files(
    hyp_file: &Path,
    ref_file: &Path,
    metrics: &[Metric],
) -> Result<Vec<EvalScore>> {
    let hyps = read_lines(hyp_file)?;
    let refs = read_lines(ref_file)?;
    metrics
        .iter()
        .map(|&metric| -> Result<EvalScore> {
            let value = metric.score(&hyps, &refs)?;
            Ok(EvalScore::from_metric(metric, value, None))
        })
        .collect()
}
