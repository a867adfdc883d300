//! Plain-text corpus reading.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::manifest;
use crate::vocab::{Vocab, WordId, ES, UNK_STR};

/// A sentence as word ids, terminated by `</s>`.
pub type Sentence = Vec<WordId>;

/// Whitespace-tokenized reader, one sentence per line.
#[derive(Debug, Clone)]
pub struct PlainTextReader {
    vocab: Vocab,
    max_num_sents: Option<usize>,
}

impl PlainTextReader {
    pub fn new(vocab: Vocab) -> Self {
        Self {
            vocab,
            max_num_sents: None,
        }
    }

    pub fn from_config(config: &manifest::Reader) -> Result<Self> {
        let config = config.plain();
        Ok(Self {
            vocab: Vocab::from_config(config.vocab.as_ref())?,
            max_num_sents: config.max_num_sents,
        })
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    /// Convert one line, appending `</s>`.
    pub fn read_sent(&mut self, line: &str) -> Result<Sentence> {
        let mut sent = line
            .split_whitespace()
            .map(|w| self.vocab.convert(w))
            .collect::<std::result::Result<Sentence, _>>()?;
        sent.push(ES);
        Ok(sent)
    }

    /// Read up to `max` sentences (also capped by the reader's own
    /// `max_num_sents`).
    pub fn read_sents(&mut self, path: &Path, max: Option<usize>) -> Result<Vec<Sentence>> {
        let limit = match (max, self.max_num_sents) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        read_lines(path)?
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|line| self.read_sent(line))
            .collect()
    }

    /// Freeze the vocabulary and make sure unknown words map to `<unk>`.
    pub fn freeze_with_unk(&mut self) -> Result<()> {
        self.vocab.freeze();
        if self.vocab.unk_token().is_none() {
            self.vocab.set_unk(UNK_STR)?;
        }
        Ok(())
    }
}

/// Number of sentences (lines) in `path`.
pub fn count_sents(path: &Path) -> Result<usize> {
    Ok(read_lines(path)?.len())
}

/// All lines of a text file, without line terminators.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("reading {}", path.display()), e))?;
    Ok(text.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::SS;
    use tempfile::TempDir;

    fn corpus(dir: &TempDir, text: &str) -> std::path::PathBuf {
        let path = dir.path().join("corpus.txt");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_read_sent_appends_end_marker() {
        let mut r = PlainTextReader::new(Vocab::new());
        let sent = r.read_sent("a b  a").unwrap();
        assert_eq!(sent, vec![2, 3, 2, ES]);
        assert!(!sent.contains(&SS));
    }

    #[test]
    fn test_empty_line_is_end_marker_only() {
        let mut r = PlainTextReader::new(Vocab::new());
        assert_eq!(r.read_sent("   ").unwrap(), vec![ES]);
    }

    #[test]
    fn test_read_sents_respects_limits() {
        let dir = TempDir::new().unwrap();
        let path = corpus(&dir, "a\nb\nc\nd\n");
        let mut r = PlainTextReader::new(Vocab::new());
        assert_eq!(r.read_sents(&path, Some(2)).unwrap().len(), 2);
        r.max_num_sents = Some(3);
        assert_eq!(r.read_sents(&path, None).unwrap().len(), 3);
        assert_eq!(r.read_sents(&path, Some(1)).unwrap().len(), 1);
        assert_eq!(count_sents(&path).unwrap(), 4);
    }

    #[test]
    fn test_frozen_reader_maps_unknown_to_unk() {
        let dir = TempDir::new().unwrap();
        let path = corpus(&dir, "a b\n");
        let mut r = PlainTextReader::new(Vocab::new());
        r.read_sents(&path, None).unwrap();
        r.freeze_with_unk().unwrap();
        let unk = r.vocab().unk_token().unwrap();
        assert_eq!(r.read_sent("a zzz").unwrap(), vec![2, unk, ES]);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_lines(Path::new("/nonexistent/corpus.txt")),
            Err(Error::FileNotFound { .. })
        ));
    }
}
