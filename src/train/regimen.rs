//! `SimpleTrainingRegimen`: the epoch loop
//!
//! Training data is read (and the vocabularies grown) by [`load_training_data`]
//! before the engine exists; [`run_regimen`] then trains epoch by epoch, runs
//! dev checkpoints and reacts to them through a [`PatienceTracker`].

use std::path::Path;

use super::batcher::{filter_pairs, group_updates, pack_batches};
use super::checkpoint::ModelCheckpoint;
use super::patience::{CheckpointAction, PatienceTracker};
use crate::engine::{SentencePair, TranslationEngine};
use crate::error::Result;
use crate::eval::{run_eval_task, EvalContext, EvalScore};
use crate::manifest::{ExpGlobal, SimpleInference, SimpleTrainingRegimen};
use crate::reader::PlainTextReader;
use crate::runner::log::ExperimentLog;

/// Read the parallel training corpus, applying length filters and
/// `max_num_train_sents`.
pub fn load_training_data(
    regimen: &SimpleTrainingRegimen,
    src_reader: &mut PlainTextReader,
    trg_reader: &mut PlainTextReader,
) -> Result<Vec<SentencePair>> {
    let src = src_reader.read_sents(Path::new(&regimen.src_file), regimen.max_num_train_sents)?;
    let trg = trg_reader.read_sents(Path::new(&regimen.trg_file), regimen.max_num_train_sents)?;
    if src.len() != trg.len() {
        return Err(crate::eval::EvalError::ParallelMismatch {
            src_lines: src.len(),
            ref_lines: trg.len(),
        }
        .into());
    }
    Ok(filter_pairs(src, trg, regimen.max_src_len, regimen.max_trg_len))
}

/// Everything the epoch loop drives.
pub struct RegimenContext<'a> {
    pub engine: &'a mut dyn TranslationEngine,
    pub src_reader: &'a mut PlainTextReader,
    pub trg_reader: &'a mut PlainTextReader,
    pub inference: &'a SimpleInference,
    pub exp_global: &'a ExpGlobal,
    pub checkpoint: ModelCheckpoint<'a>,
}

/// How training went.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSummary {
    pub epochs_completed: usize,
    pub sentences_trained: usize,
    pub checkpoints: usize,
    pub saves: usize,
    pub decays: usize,
    pub stopped_early: bool,
    pub final_learning_rate: f64,
    pub best_dev: Option<EvalScore>,
    /// Loss of the last epoch, combined per `loss_comb_method`, per sentence
    pub last_train_loss: Option<f64>,
}

struct LoopState {
    learning_rate: f64,
    tracker: PatienceTracker,
    summary: TrainingSummary,
    sents_since_dev: usize,
}

/// Train `data` under `regimen`.
pub fn run_regimen(
    regimen: &SimpleTrainingRegimen,
    data: &[SentencePair],
    ctx: &mut RegimenContext<'_>,
    log: &mut ExperimentLog,
) -> Result<TrainingSummary> {
    let epochs = regimen.run_for_epochs.unwrap_or_else(|| {
        log.warn("run_for_epochs is not set; training for a single epoch");
        1
    });

    let mut state = LoopState {
        learning_rate: regimen.trainer.learning_rate(),
        tracker: PatienceTracker::new(regimen),
        summary: TrainingSummary::default(),
        sents_since_dev: 0,
    };

    let batches = group_updates(
        pack_batches(data, &regimen.batcher),
        regimen.trainer.update_every(),
    );
    log.info(format!(
        "Training {} sentence pairs in {} updates per epoch ({}, lr {})",
        data.len(),
        batches.len(),
        regimen.trainer.kind(),
        state.learning_rate
    ));

    'epochs: for epoch in 1..=epochs {
        let mut epoch_loss = 0.0;
        let mut epoch_sents = 0usize;

        for batch in &batches {
            let summed = ctx
                .engine
                .train_batch(batch, &regimen.loss_calculator, state.learning_rate)?;
            epoch_loss += ctx.exp_global.loss_comb_method.combine(summed, batch.len());
            epoch_sents += batch.len();
            state.summary.sentences_trained += batch.len();
            state.sents_since_dev += batch.len();

            if regimen.dev_every > 0 && state.sents_since_dev >= regimen.dev_every {
                state.sents_since_dev = 0;
                if dev_checkpoint(regimen, ctx, &mut state, log)? {
                    state.summary.stopped_early = true;
                    state.summary.epochs_completed = epoch;
                    break 'epochs;
                }
            }
        }

        let per_sent = epoch_loss / epoch_sents.max(1) as f64;
        state.summary.last_train_loss = Some(per_sent);
        state.summary.epochs_completed = epoch;
        log.info(format!(
            "Epoch {epoch}/{epochs}: train loss {per_sent:.4} over {epoch_sents} sentences"
        ));

        if regimen.dev_tasks.is_empty() {
            save(ctx, &mut state, log)?;
        } else if regimen.dev_every == 0 && dev_checkpoint(regimen, ctx, &mut state, log)? {
            state.summary.stopped_early = true;
            break;
        }
    }

    state.summary.final_learning_rate = state.learning_rate;
    state.summary.decays = state.tracker.num_decays();
    state.summary.best_dev = state.tracker.best().cloned();
    state.summary.saves = ctx.checkpoint.saves();
    Ok(state.summary)
}

fn save(
    ctx: &mut RegimenContext<'_>,
    state: &mut LoopState,
    log: &mut ExperimentLog,
) -> Result<()> {
    ctx.checkpoint
        .save(&*ctx.engine, ctx.src_reader.vocab(), ctx.trg_reader.vocab())?;
    log.info(format!("Saved model to {}", ctx.checkpoint.model_file().display()));
    state.summary.saves = ctx.checkpoint.saves();
    Ok(())
}

/// Run the dev tasks and act on the main score. Returns `true` to stop.
fn dev_checkpoint(
    regimen: &SimpleTrainingRegimen,
    ctx: &mut RegimenContext<'_>,
    state: &mut LoopState,
    log: &mut ExperimentLog,
) -> Result<bool> {
    state.summary.checkpoints += 1;
    log.info(format!("Dev checkpoint {}", state.summary.checkpoints));

    let mut main: Option<EvalScore> = None;
    for task in &regimen.dev_tasks {
        let mut eval_ctx = EvalContext {
            engine: &*ctx.engine,
            src_reader: &mut *ctx.src_reader,
            trg_reader: &mut *ctx.trg_reader,
            inference: ctx.inference,
            compute_report: ctx.exp_global.compute_report,
        };
        let scores = run_eval_task(task, &mut eval_ctx, log)?;
        if main.is_none() {
            main = scores.into_iter().next();
        }
    }
    let Some(main) = main else {
        return Ok(false);
    };

    match state.tracker.record(main) {
        CheckpointAction::Save => {
            save(ctx, state, log)?;
            Ok(false)
        }
        CheckpointAction::Continue => {
            log.info(format!(
                "No improvement over {}",
                state
                    .tracker
                    .best()
                    .map_or_else(|| "-".to_string(), ToString::to_string)
            ));
            Ok(false)
        }
        CheckpointAction::DecayAndReload => {
            state.learning_rate *= regimen.lr_decay;
            log.info(format!(
                "Out of patience: decaying learning rate to {} ({} of {})",
                state.learning_rate,
                state.tracker.num_decays(),
                regimen.lr_decay_times
            ));
            if ctx.checkpoint.reload(&mut *ctx.engine)? {
                log.info("Reloaded best model parameters");
            }
            if regimen.restart_trainer {
                ctx.engine.reset_optimizer();
                log.info("Restarted trainer");
            }
            Ok(false)
        }
        CheckpointAction::Stop => {
            log.info(format!(
                "Early stopping after {} learning rate decays",
                state.tracker.num_decays()
            ));
            Ok(true)
        }
    }
}
