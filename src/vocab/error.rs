//! Vocabulary error types.

use std::path::PathBuf;
use thiserror::Error;

/// Vocabulary errors
#[derive(Debug, Error)]
pub enum VocabError {
    #[error("Vocab file {} contains reserved word '{word}'", path.display())]
    ReservedWord { path: PathBuf, word: String },

    #[error("Duplicate word in vocabulary: {0}")]
    DuplicateWord(String),

    #[error("Inline vocabulary must start with <s>, </s>, found {0:?}")]
    MissingReserved(Vec<String>),

    #[error("Unknown word '{0}' and no <unk> set on a frozen vocabulary")]
    UnknownWord(String),

    #[error("Vocabulary must be frozen before setting <unk>")]
    NotFrozen,

    #[error("Failed to read vocab file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for vocabulary operations
pub type Result<T> = std::result::Result<T, VocabError>;
