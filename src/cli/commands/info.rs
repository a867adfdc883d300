//! Info command implementation

use serde::Serialize;

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{InfoArgs, OutputFormat};
use crate::manifest::Experiment;
use crate::persistence::{load_experiment_file, ExperimentFile};

use super::validate::{format_model_info, format_output_info, format_training_info};

/// What `info` reports for one experiment.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentInfo {
    pub name: String,
    pub model_file: Option<String>,
    pub log_file: Option<String>,
    /// `filename:path` of each `!LoadSerialized`
    pub loads: Vec<String>,
    /// Decoded experiment; absent while a referenced model is unwritten
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment: Option<Experiment>,
}

/// Collect info for every experiment in file order.
pub fn collect_info(file: &ExperimentFile) -> Result<Vec<ExperimentInfo>, String> {
    file.experiments
        .iter()
        .map(|raw| -> Result<ExperimentInfo, String> {
            let experiment = if raw.is_resolvable_now() {
                let resolved = raw
                    .resolve()
                    .map_err(|e| format!("Config error in '{}': {e}", raw.name))?;
                Some(resolved.experiment)
            } else {
                None
            };
            Ok(ExperimentInfo {
                name: raw.name.clone(),
                model_file: raw.model_file(),
                log_file: raw.log_file(),
                loads: raw
                    .references
                    .iter()
                    .map(|r| format!("{}:{}", r.spec.filename, r.spec.path))
                    .collect(),
                experiment,
            })
        })
        .collect()
}

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let file = load_experiment_file(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let infos = collect_info(&file)?;

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, "Configuration Info:");
            println!();
            println!("File: {}", file.path.display());
            println!("Experiments: {}", infos.len());
            for info in &infos {
                println!();
                println!("{}:", info.name);
                for load in &info.loads {
                    println!("  Loads: {load}");
                }
                match &info.experiment {
                    Some(exp) => {
                        println!("{}", format_model_info(exp));
                        println!("{}", format_training_info(exp));
                        println!("{}", format_output_info(exp));
                    }
                    None => println!("  (details available once the loaded model exists)"),
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&infos)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&infos)
                .map_err(|e| format!("YAML serialization error: {e}"))?;
            println!("{yaml}");
        }
    }

    Ok(())
}
