//! Plan command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{OutputFormat, PlanArgs};
use crate::persistence::load_experiment_file;
use crate::runner::{plan, PlanEntry};

/// Human-readable plan, one block per experiment.
pub fn format_plan(entries: &[PlanEntry]) -> String {
    let mut lines = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, entry.name));
        if let Some(model_file) = &entry.model_file {
            lines.push(format!("   writes model: {model_file}"));
        }
        if let Some(log_file) = &entry.log_file {
            lines.push(format!("   writes log:   {log_file}"));
        }
        for load in &entry.loads {
            let source = match (&load.produced_by, load.exists_now) {
                (Some(producer), _) => format!("from '{producer}'"),
                (None, true) => "existing file".to_string(),
                (None, false) => "MISSING".to_string(),
            };
            lines.push(format!(
                "   loads {} <- {}:{} ({source})",
                load.node_path, load.filename, load.path
            ));
        }
    }
    lines.join("\n")
}

pub fn run_plan(args: PlanArgs, level: LogLevel) -> Result<(), String> {
    let file = load_experiment_file(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let entries = plan(&file, &args.experiments).map_err(|e| e.to_string())?;

    match args.format {
        OutputFormat::Text => {
            log(
                level,
                LogLevel::Normal,
                &format!("Run plan for {}:", args.config.display()),
            );
            println!("{}", format_plan(&entries));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&entries)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&entries)
                .map_err(|e| format!("YAML serialization error: {e}"))?;
            println!("{yaml}");
        }
    }
    Ok(())
}
