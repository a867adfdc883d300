//! Configuration loading errors

use std::path::PathBuf;
use thiserror::Error;

use super::registry::Category;

/// Errors raised while reading, checking or resolving a configuration file.
///
/// Node paths are dotted (`my_exp.model.encoder`), with sequence elements
/// addressed by index.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Top-level document must be a mapping from experiment names to !Experiment nodes")]
    TopLevelNotMapping,

    #[error("Experiment names must be strings, found {0}")]
    NonStringName(String),

    #[error("Top-level entry '{name}' is tagged !{tag}; only !Experiment is allowed there")]
    UnexpectedTopLevelTag { name: String, tag: String },

    #[error("No !Experiment entries found")]
    NoExperiments,

    #[error("Unknown experiment '{0}'")]
    UnknownExperiment(String),

    #[error("Unknown tag !{tag} at {path}")]
    UnknownTag { tag: String, path: String },

    #[error("!{tag} at {path} is a {found}, expected a {expected}")]
    WrongCategory {
        tag: String,
        path: String,
        found: Category,
        expected: Category,
    },

    #[error("Expected a tagged {expected} node at {path}")]
    ExpectedTagged { path: String, expected: Category },

    #[error("Expected a parameter mapping for !{tag} at {path}")]
    ExpectedMapping { tag: String, path: String },

    #[error("Expected a sequence at {path}")]
    ExpectedSequence { path: String },

    #[error("Parameter names must be strings (!{tag} at {path})")]
    NonStringParam { tag: String, path: String },

    #[error("Unknown parameter '{param}' for !{tag} at {path}")]
    UnknownParam {
        tag: String,
        param: String,
        path: String,
    },

    #[error("Missing required parameter '{param}' for !{tag} at {path}")]
    MissingParam {
        tag: String,
        param: String,
        path: String,
    },

    #[error("Tagged node !{tag} at {path} is not allowed inside a plain value")]
    TagInValue { tag: String, path: String },

    #[error("Invalid !LoadSerialized at {path}: {message}")]
    InvalidLoadSerialized { path: String, message: String },

    #[error("!LoadSerialized at {path}: saved model file not found: {filename}")]
    SavedModelNotFound { path: String, filename: String },

    #[error("!LoadSerialized at {path}: '{inner}' not found in {filename}")]
    PathNotFound {
        path: String,
        inner: String,
        filename: String,
    },

    #[error("!LoadSerialized at {path}: overwrite target '{target}' not found")]
    OverwriteNotFound { path: String, target: String },

    #[error("!LoadSerialized nesting exceeds {0} levels")]
    LoadDepthExceeded(usize),

    #[error("Failed to decode experiment '{experiment}': {message}")]
    Decode { experiment: String, message: String },

    #[error("Failed to encode experiment '{experiment}': {message}")]
    Encode { experiment: String, message: String },
}
