//! Run command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{Overrides, RunArgs};
use crate::engine::CopyEngineFactory;
use crate::runner::{run_file, ExperimentOutcome, ExperimentStatus, RunOptions};

/// One summary line per experiment.
pub fn format_outcome(outcome: &ExperimentOutcome) -> String {
    let status = match &outcome.status {
        ExperimentStatus::Completed => "completed".to_string(),
        ExperimentStatus::Validated => "validated".to_string(),
        ExperimentStatus::Deferred => "deferred (needs a model from an earlier experiment)".to_string(),
        ExperimentStatus::Failed(e) => format!("FAILED: {e}"),
    };
    let mut line = format!("  {}: {status}", outcome.name);
    if !outcome.scores.is_empty() {
        let scores: Vec<String> = outcome.scores.iter().map(ToString::to_string).collect();
        line.push_str(&format!(" [{}]", scores.join(", ")));
    }
    line
}

pub fn run_run(args: RunArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("nmt-exp: Running experiments from {}", args.config.display()),
    );

    let options = RunOptions {
        experiments: args.experiments.clone(),
        dry_run: args.dry_run,
        fail_fast: args.fail_fast,
        overrides: Overrides::from(&args),
        log_level: level,
        check_files: args.dry_run,
    };
    if let Some(epochs) = options.overrides.epochs {
        log(
            level,
            LogLevel::Verbose,
            &format!("  Overriding run_for_epochs: {epochs}"),
        );
    }

    let report = run_file(&args.config, &options, &CopyEngineFactory).map_err(|e| e.to_string())?;

    log(level, LogLevel::Normal, "Summary:");
    for outcome in &report.outcomes {
        log(level, LogLevel::Normal, &format_outcome(outcome));
        if let Some(training) = &outcome.training {
            log(
                level,
                LogLevel::Verbose,
                &format!(
                    "    epochs {}, checkpoints {}, saves {}, decays {}, final lr {}",
                    training.epochs_completed,
                    training.checkpoints,
                    training.saves,
                    training.decays,
                    training.final_learning_rate
                ),
            );
        }
    }

    let failures = report.failures();
    if failures > 0 {
        return Err(format!("{failures} experiment(s) failed"));
    }
    let done = if args.dry_run {
        "Dry run - experiments validated successfully"
    } else {
        "All experiments complete!"
    };
    log(level, LogLevel::Normal, done);
    Ok(())
}
