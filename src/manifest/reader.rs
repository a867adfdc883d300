//! Input readers and vocabulary configuration

use serde::{Deserialize, Serialize};

/// Reader slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reader {
    PlainTextReader(PlainTextReader),
}

impl Reader {
    pub fn plain(&self) -> &PlainTextReader {
        match self {
            Reader::PlainTextReader(r) => r,
        }
    }

    pub fn plain_mut(&mut self) -> &mut PlainTextReader {
        match self {
            Reader::PlainTextReader(r) => r,
        }
    }
}

/// Whitespace-tokenized text, one sentence per line (`!PlainTextReader`)
///
/// Without a `vocab` the vocabulary is built from the training corpus.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlainTextReader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocab: Option<VocabConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_num_sents: Option<usize>,
}

/// Vocabulary given inline or by file (`!Vocab`). Exactly one of the two.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i2w: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocab_file: Option<String>,
}
