//! `!LoadSerialized`: reuse a component from a saved model file.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::check::{walk_node, LoadHandler};
use super::error::ConfigError;
use super::node::{get_path, set_path, untag};
use super::registry::Category;

/// Maximum nesting of saved files referring to other saved files.
pub const MAX_LOAD_DEPTH: usize = 16;

/// Parameters of a `!LoadSerialized` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadSerialized {
    /// Saved model file written by an earlier experiment.
    pub filename: String,

    /// Dotted path inside the saved experiment; empty for the whole file.
    pub path: String,

    /// Values replaced in the loaded subtree.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overwrite: Vec<Overwrite>,
}

/// One `{path, val}` entry of `overwrite`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Overwrite {
    pub path: String,
    pub val: Value,
}

/// A `!LoadSerialized` found in an experiment, with where it sits.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReference {
    pub node_path: String,
    pub category: Category,
    pub spec: LoadSerialized,
}

impl LoadSerialized {
    /// Parse the parameters of a `!LoadSerialized` node.
    pub fn from_node(node: &Value, node_path: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_value(untag(node).clone()).map_err(|e| {
            ConfigError::InvalidLoadSerialized {
                path: node_path.to_string(),
                message: e.to_string(),
            }
        })
    }

    pub fn file(&self) -> PathBuf {
        PathBuf::from(&self.filename)
    }

    /// Read the saved file, extract `path` and apply `overwrite`.
    pub fn load(&self, node_path: &str) -> Result<Value, ConfigError> {
        let file = Path::new(&self.filename);
        if !file.is_file() {
            return Err(ConfigError::SavedModelNotFound {
                path: node_path.to_string(),
                filename: self.filename.clone(),
            });
        }
        let text = fs::read_to_string(file).map_err(|source| ConfigError::Read {
            path: file.to_path_buf(),
            source,
        })?;
        let doc: Value = serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: file.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut loaded = get_path(&doc, &self.path)
            .cloned()
            .ok_or_else(|| ConfigError::PathNotFound {
                path: node_path.to_string(),
                inner: self.path.clone(),
                filename: self.filename.clone(),
            })?;

        for entry in &self.overwrite {
            if !set_path(&mut loaded, &entry.path, entry.val.clone()) {
                return Err(ConfigError::OverwriteNotFound {
                    path: node_path.to_string(),
                    target: entry.path.clone(),
                });
            }
        }
        Ok(loaded)
    }
}

/// Handler that records references without touching them.
#[derive(Debug, Default)]
pub(crate) struct ReferenceCollector {
    pub refs: Vec<LoadReference>,
}

impl LoadHandler for ReferenceCollector {
    fn handle(
        &mut self,
        node: &mut Value,
        category: Category,
        path: &str,
    ) -> Result<(), ConfigError> {
        let spec = LoadSerialized::from_node(node, path)?;
        self.refs.push(LoadReference {
            node_path: path.to_string(),
            category,
            spec,
        });
        Ok(())
    }
}

/// Handler that replaces each reference with the loaded, checked subtree.
#[derive(Debug, Default)]
pub(crate) struct Resolver {
    depth: usize,
    pub loaded: Vec<LoadReference>,
}

impl LoadHandler for Resolver {
    fn handle(
        &mut self,
        node: &mut Value,
        category: Category,
        path: &str,
    ) -> Result<(), ConfigError> {
        if self.depth >= MAX_LOAD_DEPTH {
            return Err(ConfigError::LoadDepthExceeded(MAX_LOAD_DEPTH));
        }
        let spec = LoadSerialized::from_node(node, path)?;
        let mut loaded = spec.load(path)?;

        self.depth += 1;
        let checked = walk_node(&mut loaded, category, path, self);
        self.depth -= 1;
        checked?;

        self.loaded.push(LoadReference {
            node_path: path.to_string(),
            category,
            spec,
        });
        *node = loaded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAVED: &str = r#"
!Experiment
exp_global:
  default_layer_dim: 64
model: !DefaultTranslator
  src_reader: !PlainTextReader
    vocab:
      i2w: ['<s>', '</s>', a]
  trg_reader: !PlainTextReader {}
  encoder: !BiLSTMSeqTransducer
    layers: 2
    hidden_dim: 64
"#;

    fn saved_file(dir: &TempDir, content: &str) -> String {
        let path = dir.path().join("saved.mod");
        std::fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_from_node_requires_path() {
        let node: Value = serde_yaml::from_str("!LoadSerialized {filename: a.mod}").unwrap();
        let err = LoadSerialized::from_node(&node, "x").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLoadSerialized { .. }));
    }

    #[test]
    fn test_from_node_rejects_unknown_keys() {
        let node: Value =
            serde_yaml::from_str("!LoadSerialized {filename: a, path: b, extra: 1}").unwrap();
        assert!(LoadSerialized::from_node(&node, "x").is_err());
    }

    #[test]
    fn test_load_extracts_subtree() {
        let dir = TempDir::new().unwrap();
        let spec = LoadSerialized {
            filename: saved_file(&dir, SAVED),
            path: "model.encoder".to_string(),
            overwrite: vec![],
        };
        let loaded = spec.load("exp.model.encoder").unwrap();
        assert_eq!(get_path(&loaded, "layers").and_then(Value::as_u64), Some(2));
    }

    #[test]
    fn test_load_applies_overwrite() {
        let dir = TempDir::new().unwrap();
        let spec = LoadSerialized {
            filename: saved_file(&dir, SAVED),
            path: "model.encoder".to_string(),
            overwrite: vec![Overwrite {
                path: "layers".to_string(),
                val: Value::from(4),
            }],
        };
        let loaded = spec.load("p").unwrap();
        assert_eq!(get_path(&loaded, "layers").and_then(Value::as_u64), Some(4));
    }

    #[test]
    fn test_load_missing_file() {
        let spec = LoadSerialized {
            filename: "/nonexistent/model.mod".to_string(),
            path: "model".to_string(),
            overwrite: vec![],
        };
        assert!(matches!(
            spec.load("p"),
            Err(ConfigError::SavedModelNotFound { .. })
        ));
    }

    #[test]
    fn test_load_missing_path() {
        let dir = TempDir::new().unwrap();
        let spec = LoadSerialized {
            filename: saved_file(&dir, SAVED),
            path: "model.decoder.bridge".to_string(),
            overwrite: vec![],
        };
        assert!(matches!(spec.load("p"), Err(ConfigError::PathNotFound { .. })));
    }

    #[test]
    fn test_resolver_replaces_and_checks() {
        let dir = TempDir::new().unwrap();
        let filename = saved_file(&dir, SAVED);
        let mut node: Value = serde_yaml::from_str(&format!(
            "!LoadSerialized {{filename: '{filename}', path: model.encoder}}"
        ))
        .unwrap();
        let mut resolver = Resolver::default();
        walk_node(&mut node, Category::Transducer, "exp.model.encoder", &mut resolver).unwrap();
        assert_eq!(get_path(&node, "hidden_dim").and_then(Value::as_u64), Some(64));
        assert_eq!(resolver.loaded.len(), 1);
    }

    #[test]
    fn test_resolver_checks_category_of_loaded_node() {
        let dir = TempDir::new().unwrap();
        let filename = saved_file(&dir, SAVED);
        let mut node: Value = serde_yaml::from_str(&format!(
            "!LoadSerialized {{filename: '{filename}', path: model.encoder}}"
        ))
        .unwrap();
        let err = walk_node(&mut node, Category::Attender, "p", &mut Resolver::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::WrongCategory { .. }));
    }

    #[test]
    fn test_resolver_depth_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("self.mod");
        let filename = path.display().to_string();
        // A saved file whose encoder points back at itself.
        std::fs::write(
            &path,
            format!(
                "model:\n  encoder: !LoadSerialized {{filename: '{filename}', path: model.encoder}}\n"
            ),
        )
        .unwrap();
        let mut node: Value = serde_yaml::from_str(&format!(
            "!LoadSerialized {{filename: '{filename}', path: model.encoder}}"
        ))
        .unwrap();
        let err = walk_node(&mut node, Category::Transducer, "p", &mut Resolver::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::LoadDepthExceeded(MAX_LOAD_DEPTH)));
    }

    #[test]
    fn test_collector_records_reference() {
        let mut node: Value =
            serde_yaml::from_str("!LoadSerialized {filename: a.mod, path: model.encoder}")
                .unwrap();
        let mut collector = ReferenceCollector::default();
        walk_node(&mut node, Category::Transducer, "e.model.encoder", &mut collector).unwrap();
        assert_eq!(collector.refs.len(), 1);
        assert_eq!(collector.refs[0].spec.filename, "a.mod");
        assert_eq!(collector.refs[0].node_path, "e.model.encoder");
    }
}
