//! Experiment runner
//!
//! Runs the experiments of one configuration file in file order. For each
//! experiment: resolve `!LoadSerialized` references, decode, apply CLI
//! overrides, validate, open the log file, build readers and the engine,
//! train, reload the best parameters and run the final evaluation tasks.
//!
//! A failing experiment is recorded and the run moves on, unless
//! `fail_fast` is set.

pub mod log;
mod planner;

pub use planner::{plan, PlanEntry, PlannedLoad};

use std::path::{Path, PathBuf};

use self::log::ExperimentLog;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, Overrides};
use crate::engine::{EngineFactory, TranslationEngine};
use crate::error::Result;
use crate::eval::{run_eval_task, EvalContext, EvalScore};
use crate::manifest::Experiment;
use crate::persistence::{
    data_dir, load_experiment_file, Category, ExperimentFile, LoadReference, RawExperiment,
};
use crate::reader::PlainTextReader;
use crate::train::{
    load_training_data, run_regimen, ModelCheckpoint, RegimenContext, TrainingSummary,
};
use crate::validation::{validate_experiment, validate_run_order, ValidationOptions};

/// How to run a configuration file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Experiment names to run; empty runs all
    pub experiments: Vec<String>,
    /// Resolve, decode and validate only
    pub dry_run: bool,
    /// Stop at the first failing experiment
    pub fail_fast: bool,
    pub overrides: Overrides,
    pub log_level: LogLevel,
    /// Require input files to exist during validation
    pub check_files: bool,
}

/// Final state of one experiment.
#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentStatus {
    Completed,
    /// Dry run: resolved and validated
    Validated,
    /// Dry run: needs a model file an earlier experiment would write
    Deferred,
    Failed(String),
}

/// Result of running one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentOutcome {
    pub name: String,
    pub status: ExperimentStatus,
    pub model_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub training: Option<TrainingSummary>,
    /// Scores of the final evaluation tasks, in task order
    pub scores: Vec<EvalScore>,
}

impl ExperimentOutcome {
    fn failed(name: &str, error: String) -> Self {
        Self {
            name: name.to_string(),
            status: ExperimentStatus::Failed(error),
            model_file: None,
            log_file: None,
            training: None,
            scores: Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ExperimentStatus::Failed(_))
    }
}

/// Outcomes of a whole run, in run order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub outcomes: Vec<ExperimentOutcome>,
}

impl RunReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn succeeded(&self) -> bool {
        self.failures() == 0
    }

    pub fn get(&self, name: &str) -> Option<&ExperimentOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

/// Load `path` and run it.
pub fn run_file(
    path: &Path,
    options: &RunOptions,
    factory: &dyn EngineFactory,
) -> Result<RunReport> {
    let file = load_experiment_file(path)?;
    run_experiments(&file, options, factory)
}

/// Run the selected experiments of a loaded file.
///
/// Selection and run-order errors abort before anything runs; errors inside
/// an experiment are recorded in its outcome.
pub fn run_experiments(
    file: &ExperimentFile,
    options: &RunOptions,
    factory: &dyn EngineFactory,
) -> Result<RunReport> {
    let selected = file.select(&options.experiments)?;
    validate_run_order(&selected)?;

    let mut report = RunReport::default();
    for raw in selected {
        let outcome = match run_one(raw, options, factory) {
            Ok(outcome) => outcome,
            Err(e) => {
                crate::cli::logging::log(
                    options.log_level,
                    LogLevel::Normal,
                    &format!("Experiment '{}' failed: {e}", raw.name),
                );
                ExperimentOutcome::failed(&raw.name, e.to_string())
            }
        };
        let stop = outcome.is_failed() && options.fail_fast;
        report.outcomes.push(outcome);
        if stop {
            break;
        }
    }
    Ok(report)
}

fn run_one(
    raw: &RawExperiment,
    options: &RunOptions,
    factory: &dyn EngineFactory,
) -> Result<ExperimentOutcome> {
    if options.dry_run && !raw.is_resolvable_now() {
        return Ok(ExperimentOutcome {
            name: raw.name.clone(),
            status: ExperimentStatus::Deferred,
            model_file: raw.model_file().map(PathBuf::from),
            log_file: raw.log_file().map(PathBuf::from),
            training: None,
            scores: Vec::new(),
        });
    }
    let resolved = raw.resolve()?;
    let mut experiment = resolved.experiment;
    apply_overrides(&mut experiment, &options.overrides);
    validate_experiment(
        &experiment,
        &ValidationOptions {
            check_files: options.check_files,
        },
    )?;

    let mut outcome = ExperimentOutcome {
        name: raw.name.clone(),
        status: ExperimentStatus::Validated,
        model_file: Some(PathBuf::from(&experiment.exp_global.model_file)),
        log_file: Some(PathBuf::from(&experiment.exp_global.log_file)),
        training: None,
        scores: Vec::new(),
    };
    if options.dry_run {
        return Ok(outcome);
    }

    let log_file = Path::new(&experiment.exp_global.log_file);
    let mut log = ExperimentLog::create(log_file, options.log_level)?;
    log.info(format!("=== Experiment '{}' ===", raw.name));
    for reference in &resolved.loaded {
        log.debug(format!(
            "{}: loaded '{}' from {}",
            reference.node_path, reference.spec.path, reference.spec.filename
        ));
    }

    match execute(&raw.name, &experiment, &resolved.loaded, factory, &mut log) {
        Ok((training, scores)) => {
            log.info(format!("=== Experiment '{}' done ===", raw.name));
            outcome.status = ExperimentStatus::Completed;
            outcome.training = Some(training);
            outcome.scores = scores;
            Ok(outcome)
        }
        Err(e) => {
            log.error(e.to_string());
            Err(e)
        }
    }
}

fn execute(
    name: &str,
    experiment: &Experiment,
    loaded: &[LoadReference],
    factory: &dyn EngineFactory,
    log: &mut ExperimentLog,
) -> Result<(TrainingSummary, Vec<EvalScore>)> {
    let translator = experiment.model.translator();
    let regimen = experiment.train.simple();
    let mut src_reader = PlainTextReader::from_config(&translator.src_reader)?;
    let mut trg_reader = PlainTextReader::from_config(&translator.trg_reader)?;

    let data = load_training_data(regimen, &mut src_reader, &mut trg_reader)?;
    src_reader.freeze_with_unk()?;
    trg_reader.freeze_with_unk()?;
    log.info(format!(
        "Vocabulary sizes: source {}, target {}",
        src_reader.vocab().len(),
        trg_reader.vocab().len()
    ));

    let mut engine = factory.build(translator, src_reader.vocab(), trg_reader.vocab())?;
    load_saved_params(loaded, engine.as_mut(), log)?;

    let inference = translator.inference.simple();
    let mut ctx = RegimenContext {
        engine: engine.as_mut(),
        src_reader: &mut src_reader,
        trg_reader: &mut trg_reader,
        inference,
        exp_global: &experiment.exp_global,
        checkpoint: ModelCheckpoint::new(name, experiment),
    };
    let training = run_regimen(regimen, &data, &mut ctx, log)?;
    if ctx.checkpoint.reload(&mut *ctx.engine)? {
        log.info(format!(
            "Reloaded best model from {}",
            ctx.checkpoint.model_file().display()
        ));
    }

    let mut scores = Vec::new();
    if !experiment.evaluate.is_empty() {
        log.info("Final evaluation");
    }
    for task in &experiment.evaluate {
        let mut eval_ctx = EvalContext {
            engine: &*ctx.engine,
            src_reader: &mut *ctx.src_reader,
            trg_reader: &mut *ctx.trg_reader,
            inference,
            compute_report: experiment.exp_global.compute_report,
        };
        scores.extend(run_eval_task(task, &mut eval_ctx, log)?);
    }
    Ok((training, scores))
}

/// Initialize the engine from a saved model when the model slot itself was
/// loaded with `!LoadSerialized`.
fn load_saved_params(
    loaded: &[LoadReference],
    engine: &mut dyn TranslationEngine,
    log: &mut ExperimentLog,
) -> Result<()> {
    let whole_model = loaded
        .iter()
        .find(|r| r.category == Category::Model && r.spec.path == "model");
    if let Some(reference) = whole_model {
        let dir = data_dir(&reference.spec.file());
        if dir.is_dir() {
            engine.load_params(&dir)?;
            log.info(format!("Initialized parameters from {}", dir.display()));
        }
    }
    Ok(())
}
