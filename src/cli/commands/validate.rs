//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::ValidateArgs;
use crate::manifest::{Batcher, Experiment};
use crate::persistence::load_experiment_file;
use crate::validation::{validate_experiment, validate_run_order, ValidationOptions};

fn batcher_name(batcher: &Batcher) -> &'static str {
    match batcher {
        Batcher::SrcBatcher(_) => "SrcBatcher",
        Batcher::TrgBatcher(_) => "TrgBatcher",
        Batcher::InOrderBatcher(_) => "InOrderBatcher",
    }
}

/// Format model information as a string
pub fn format_model_info(exp: &Experiment) -> String {
    let t = exp.model.translator();
    let mut lines = vec![format!("  Encoder: {}", t.encoder.kind())];
    if let Some(dim) = t.src_embedder.emb_dim() {
        lines.push(format!("  Source embedding dim: {dim}"));
    }
    if let Some(dim) = t.trg_embedder.emb_dim() {
        lines.push(format!("  Target embedding dim: {dim}"));
    }
    lines.push(format!("  Default layer dim: {}", exp.exp_global.default_layer_dim));
    lines.join("\n")
}

/// Format training configuration as a string
pub fn format_training_info(exp: &Experiment) -> String {
    let r = exp.train.simple();
    let epochs = r
        .run_for_epochs
        .map_or_else(|| "unset".to_string(), |n| n.to_string());
    let mut lines = vec![
        format!("  Training data: {} / {}", r.src_file, r.trg_file),
        format!(
            "  Trainer: {} (lr={})",
            r.trainer.kind(),
            r.trainer.learning_rate()
        ),
        format!(
            "  Batcher: {} (batch_size={})",
            batcher_name(&r.batcher),
            r.batcher.batch_size()
        ),
        format!("  Epochs: {epochs}"),
    ];
    if r.lr_decay < 1.0 {
        lines.push(format!(
            "  LR decay: {} x{} (patience {})",
            r.lr_decay, r.lr_decay_times, r.patience
        ));
    }
    lines.push(format!("  Dev tasks: {}", r.dev_tasks.len()));
    lines.join("\n")
}

/// Format output paths and final evaluation as a string
pub fn format_output_info(exp: &Experiment) -> String {
    let mut lines = vec![
        format!("  Model file: {}", exp.exp_global.model_file),
        format!("  Log file: {}", exp.exp_global.log_file),
    ];
    for task in &exp.evaluate {
        let desc = task.desc().map(|d| format!(" ({d})")).unwrap_or_default();
        lines.push(format!("  Evaluate: {}{desc}", task.src_file()));
    }
    lines.join("\n")
}

/// Print detailed experiment summary
pub fn print_detailed_summary(name: &str, exp: &Experiment) {
    println!();
    println!("Experiment '{name}':");
    println!("{}", format_model_info(exp));
    println!();
    println!("{}", format_training_info(exp));
    println!();
    println!("{}", format_output_info(exp));
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Validating: {}", args.config.display()),
    );

    let file = load_experiment_file(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let selected = file.select(&[]).map_err(|e| format!("Config error: {e}"))?;
    validate_run_order(&selected).map_err(|e| format!("Validation error: {e}"))?;

    let options = ValidationOptions {
        check_files: args.check_files,
    };
    for raw in selected {
        if !raw.is_resolvable_now() {
            log(
                level,
                LogLevel::Normal,
                &format!(
                    "  {}: deferred (loads a model written by an earlier experiment)",
                    raw.name
                ),
            );
            continue;
        }
        let resolved = raw
            .resolve()
            .map_err(|e| format!("Config error in '{}': {e}", raw.name))?;
        validate_experiment(&resolved.experiment, &options)
            .map_err(|e| format!("Validation error in '{}': {e}", raw.name))?;
        log(level, LogLevel::Normal, &format!("  {}: valid", raw.name));

        if args.detailed && level != LogLevel::Quiet {
            print_detailed_summary(&raw.name, &resolved.experiment);
        }
    }

    log(level, LogLevel::Normal, "Configuration is valid");
    Ok(())
}
