//! Run plan: what each experiment writes and which saved models it needs.

use serde::Serialize;

use crate::error::Result;
use crate::persistence::ExperimentFile;

/// One `!LoadSerialized` dependency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedLoad {
    /// Where the reference sits, e.g. `exp2.model.encoder`
    pub node_path: String,
    pub filename: String,
    /// Path inside the saved experiment
    pub path: String,
    /// Earlier experiment in the run that writes `filename`
    pub produced_by: Option<String>,
    pub exists_now: bool,
}

/// One experiment in run order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEntry {
    pub name: String,
    pub model_file: Option<String>,
    pub log_file: Option<String>,
    pub loads: Vec<PlannedLoad>,
}

/// Plan the run of `names` (all experiments when empty) without running it.
pub fn plan(file: &ExperimentFile, names: &[String]) -> Result<Vec<PlanEntry>> {
    let selected = file.select(names)?;
    let mut entries: Vec<PlanEntry> = Vec::with_capacity(selected.len());
    for raw in selected {
        let loads = raw
            .references
            .iter()
            .map(|r| PlannedLoad {
                node_path: r.node_path.clone(),
                filename: r.spec.filename.clone(),
                path: r.spec.path.clone(),
                produced_by: entries
                    .iter()
                    .rev()
                    .find(|e| e.model_file.as_deref() == Some(r.spec.filename.as_str()))
                    .map(|e| e.name.clone()),
                exists_now: r.spec.file().is_file(),
            })
            .collect();
        entries.push(PlanEntry {
            name: raw.name.clone(),
            model_file: raw.model_file(),
            log_file: raw.log_file(),
            loads,
        });
    }
    Ok(entries)
}
