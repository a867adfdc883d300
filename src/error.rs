//! Crate-level error type.
//!
//! Each subsystem keeps its own error enum; this type wraps them so the
//! runner and CLI can propagate any of them with `?`.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::EngineError;
use crate::eval::EvalError;
use crate::persistence::ConfigError;
use crate::validation::ValidationError;
use crate::vocab::VocabError;

/// Result type alias for nmt-exp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, validating or running experiments.
#[derive(Error, Debug)]
pub enum Error {
    /// Loading or resolving the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A schema-level check failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Vocabulary construction or lookup failed.
    #[error(transparent)]
    Vocab(#[from] VocabError),

    /// Evaluation failed.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// The translation engine reported an error.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Inference was asked to do something its configuration cannot support.
    #[error("Inference error: {0}")]
    Inference(String),

    /// A required input file is missing.
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },
}

impl Error {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Create the parent directory of `path` if it has one.
pub(crate) fn make_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::io(format!("creating directory {}", parent.display()), e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_context() {
        let err = Error::io(
            "reading vocab.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("vocab.txt"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_make_parent_dir_creates_nested() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("a/b/c.txt");
        make_parent_dir(&target).unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }

    #[test]
    fn test_make_parent_dir_bare_file_name() {
        assert!(make_parent_dir(std::path::Path::new("plain.txt")).is_ok());
    }
}
