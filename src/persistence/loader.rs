//! Experiment file loading
//!
//! Loading is split in two. [`load_experiment_file`] reads the whole file,
//! expands placeholders and checks every experiment against the tag
//! registry, recording `!LoadSerialized` references without following them.
//! [`RawExperiment::resolve`] follows those references and decodes the typed
//! [`Experiment`]; the runner calls it right before the experiment runs so
//! model files written by earlier experiments are visible.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::check::walk_node;
use super::error::ConfigError;
use super::load_serialized::{LoadReference, ReferenceCollector, Resolver};
use super::node::{get_path, tag_name, untag, untag_mut};
use super::placeholders::{custom_placeholders, Placeholders};
use super::registry::Category;
use crate::manifest::{Experiment, DEFAULT_LOG_FILE, DEFAULT_MODEL_FILE};

/// All experiments of one configuration file, in file order.
#[derive(Debug, Clone)]
pub struct ExperimentFile {
    pub path: PathBuf,
    /// Directory of the configuration file, used for `{EXP_DIR}`
    pub exp_dir: PathBuf,
    pub experiments: Vec<RawExperiment>,
}

impl ExperimentFile {
    pub fn names(&self) -> Vec<&str> {
        self.experiments.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&RawExperiment> {
        self.experiments.iter().find(|e| e.name == name)
    }

    /// Experiments to run. An empty filter selects all; otherwise file order
    /// is kept and every name must exist.
    pub fn select(&self, names: &[String]) -> Result<Vec<&RawExperiment>, ConfigError> {
        if let Some(missing) = names.iter().find(|n| self.get(n).is_none()) {
            return Err(ConfigError::UnknownExperiment(missing.clone()));
        }
        Ok(self
            .experiments
            .iter()
            .filter(|e| names.is_empty() || names.contains(&e.name))
            .collect())
    }
}

/// An experiment after placeholder expansion and registry checks, before
/// `!LoadSerialized` resolution.
#[derive(Debug, Clone)]
pub struct RawExperiment {
    pub name: String,
    /// Untagged experiment body
    pub node: Value,
    pub placeholders: Placeholders,
    pub references: Vec<LoadReference>,
}

/// A decoded experiment together with the references that were followed.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub experiment: Experiment,
    pub loaded: Vec<LoadReference>,
}

impl RawExperiment {
    fn exp_global_str(&self, key: &str) -> Option<String> {
        get_path(&self.node, &format!("exp_global.{key}"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Expanded model file path, if known before resolution.
    pub fn model_file(&self) -> Option<String> {
        self.exp_global_str("model_file")
    }

    pub fn log_file(&self) -> Option<String> {
        self.exp_global_str("log_file")
    }

    /// True when every referenced saved model file exists.
    pub fn is_resolvable_now(&self) -> bool {
        self.references.iter().all(|r| r.spec.file().is_file())
    }

    /// Follow `!LoadSerialized` references, decode and apply shared defaults.
    pub fn resolve(&self) -> Result<Resolved, ConfigError> {
        let mut node = self.node.clone();
        let mut resolver = Resolver::default();
        walk_node(&mut node, Category::Experiment, &self.name, &mut resolver)?;

        let mut experiment: Experiment =
            serde_yaml::from_value(node).map_err(|e| ConfigError::Decode {
                experiment: self.name.clone(),
                message: e.to_string(),
            })?;
        // A loaded exp_global may still carry templates.
        let global = &mut experiment.exp_global;
        global.model_file = self.placeholders.expand(&global.model_file);
        global.log_file = self.placeholders.expand(&global.log_file);
        experiment.apply_shared_defaults();

        Ok(Resolved {
            experiment,
            loaded: resolver.loaded,
        })
    }
}

/// Read, parse and check a configuration file.
pub fn load_experiment_file(path: &Path) -> Result<ExperimentFile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let path = path.canonicalize().map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    parse_experiment_file(&text, &path)
}

/// Parse configuration text as if read from `path`.
pub fn parse_experiment_file(text: &str, path: &Path) -> Result<ExperimentFile, ConfigError> {
    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let mut doc: Value = serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string()))?;
    doc.apply_merge().map_err(|e| parse_err(e.to_string()))?;

    let exp_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let Value::Mapping(entries) = doc else {
        return Err(ConfigError::TopLevelNotMapping);
    };

    let mut experiments = Vec::new();
    for (key, value) in entries {
        let name = match key {
            Value::String(s) => s,
            other => return Err(ConfigError::NonStringName(render_key(&other))),
        };
        let Value::Tagged(tagged) = value else {
            // Untagged entries hold shared anchors.
            continue;
        };
        let tag = tag_name(&tagged.tag);
        if tag != "Experiment" {
            return Err(ConfigError::UnexpectedTopLevelTag { name, tag });
        }
        experiments.push(prepare_experiment(name, tagged.value, &exp_dir)?);
    }

    if experiments.is_empty() {
        return Err(ConfigError::NoExperiments);
    }
    Ok(ExperimentFile {
        path: path.to_path_buf(),
        exp_dir,
        experiments,
    })
}

fn prepare_experiment(
    name: String,
    mut node: Value,
    exp_dir: &Path,
) -> Result<RawExperiment, ConfigError> {
    if node.is_null() {
        node = Value::Mapping(Mapping::new());
    }
    insert_path_defaults(&mut node);

    let placeholders =
        Placeholders::for_experiment(&name, exp_dir).with_custom(&custom_placeholders(&node));
    placeholders.expand_tree(&mut node);

    let mut collector = ReferenceCollector::default();
    walk_node(&mut node, Category::Experiment, &name, &mut collector)?;

    Ok(RawExperiment {
        name,
        node,
        placeholders,
        references: collector.refs,
    })
}

/// Give `exp_global` its default output paths so they are expanded with the
/// rest of the tree. A `!LoadSerialized` exp_global is left alone.
fn insert_path_defaults(node: &mut Value) {
    let Value::Mapping(body) = untag_mut(node) else {
        return;
    };
    let global = body
        .entry(Value::String("exp_global".to_string()))
        .or_insert(Value::Null);
    if let Value::Tagged(t) = &*global {
        if tag_name(&t.tag) != "ExpGlobal" {
            return;
        }
    }
    let global = untag_mut(global);
    if global.is_null() {
        *global = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(settings) = global {
        for (key, default) in [("model_file", DEFAULT_MODEL_FILE), ("log_file", DEFAULT_LOG_FILE)] {
            let key = Value::String(key.to_string());
            if matches!(settings.get(&key), None | Some(Value::Null)) {
                settings.insert(key, Value::String(default.to_string()));
            }
        }
    }
}

fn render_key(key: &Value) -> String {
    match untag(key) {
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => "a non-scalar key".to_string(),
    }
}
