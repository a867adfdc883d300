//! Word vocabularies.
//!
//! Ids 0 and 1 are always `<s>` and `</s>`. A vocabulary either comes from
//! configuration (inline `i2w` or a `vocab_file`) and is frozen from the
//! start, or grows while the training corpus is read and is frozen after.

mod error;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub use error::{Result, VocabError};

use crate::manifest::VocabConfig;

/// Word id type
pub type WordId = u32;

/// Sentence start
pub const SS: WordId = 0;
/// Sentence end
pub const ES: WordId = 1;

pub const SS_STR: &str = "<s>";
pub const ES_STR: &str = "</s>";
pub const UNK_STR: &str = "<unk>";

/// Bidirectional word/id mapping
#[derive(Debug, Clone, PartialEq)]
pub struct Vocab {
    i2w: Vec<String>,
    w2i: HashMap<String, WordId>,
    frozen: bool,
    unk_token: Option<WordId>,
}

impl Default for Vocab {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocab {
    /// A growing vocabulary holding only the reserved words.
    pub fn new() -> Self {
        let mut vocab = Self {
            i2w: Vec::new(),
            w2i: HashMap::new(),
            frozen: false,
            unk_token: None,
        };
        vocab.push(SS_STR);
        vocab.push(ES_STR);
        vocab
    }

    /// Frozen vocabulary from a verbatim id-to-word list.
    pub fn from_i2w(words: &[String]) -> Result<Self> {
        if words.len() < 2 || words[0] != SS_STR || words[1] != ES_STR {
            return Err(VocabError::MissingReserved(
                words.iter().take(2).cloned().collect(),
            ));
        }
        let mut vocab = Self::new();
        for word in &words[2..] {
            if vocab.w2i.contains_key(word) {
                return Err(VocabError::DuplicateWord(word.clone()));
            }
            vocab.push(word);
        }
        vocab.finish_frozen();
        Ok(vocab)
    }

    /// Frozen vocabulary from a file with one word per line.
    ///
    /// Every line is an entry, blank ones included, so ids follow line
    /// numbers. The reserved words may not appear in the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| VocabError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut vocab = Self::new();
        for word in text.lines().map(str::trim) {
            if [SS_STR, ES_STR, UNK_STR].contains(&word) {
                return Err(VocabError::ReservedWord {
                    path: path.to_path_buf(),
                    word: word.to_string(),
                });
            }
            if vocab.w2i.contains_key(word) {
                return Err(VocabError::DuplicateWord(word.to_string()));
            }
            vocab.push(word);
        }
        vocab.finish_frozen();
        Ok(vocab)
    }

    /// Build from configuration, or a growing vocabulary when none is given.
    pub fn from_config(config: Option<&VocabConfig>) -> Result<Self> {
        match config {
            Some(VocabConfig {
                i2w: Some(words), ..
            }) => Self::from_i2w(words),
            Some(VocabConfig {
                vocab_file: Some(file),
                ..
            }) => Self::from_file(Path::new(file)),
            _ => Ok(Self::new()),
        }
    }

    fn push(&mut self, word: &str) -> WordId {
        let id = self.i2w.len() as WordId;
        self.i2w.push(word.to_string());
        self.w2i.insert(word.to_string(), id);
        id
    }

    fn finish_frozen(&mut self) {
        self.frozen = true;
        self.unk_token = self.w2i.get(UNK_STR).copied();
    }

    /// Id of `word`. Unknown words are added while growing and map to
    /// `<unk>` once frozen.
    pub fn convert(&mut self, word: &str) -> Result<WordId> {
        if let Some(&id) = self.w2i.get(word) {
            return Ok(id);
        }
        if !self.frozen {
            return Ok(self.push(word));
        }
        self.unk_token
            .ok_or_else(|| VocabError::UnknownWord(word.to_string()))
    }

    /// Id of `word` without growing.
    pub fn lookup(&self, word: &str) -> Option<WordId> {
        self.w2i.get(word).copied().or(self.unk_token)
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Choose the unknown-word token, adding it if needed.
    pub fn set_unk(&mut self, word: &str) -> Result<()> {
        if !self.frozen {
            return Err(VocabError::NotFrozen);
        }
        let id = match self.w2i.get(word) {
            Some(&id) => id,
            None => self.push(word),
        };
        self.unk_token = Some(id);
        Ok(())
    }

    pub fn word(&self, id: WordId) -> Option<&str> {
        self.i2w.get(id as usize).map(String::as_str)
    }

    pub fn words(&self) -> &[String] {
        &self.i2w
    }

    pub fn len(&self) -> usize {
        self.i2w.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i2w.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn unk_token(&self) -> Option<WordId> {
        self.unk_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_reserved_ids() {
        let v = Vocab::new();
        assert_eq!(v.word(SS), Some(SS_STR));
        assert_eq!(v.word(ES), Some(ES_STR));
        assert_eq!(v.len(), 2);
        assert!(!v.is_frozen());
    }

    #[test]
    fn test_growing_then_frozen() {
        let mut v = Vocab::new();
        assert_eq!(v.convert("neko").unwrap(), 2);
        assert_eq!(v.convert("inu").unwrap(), 3);
        assert_eq!(v.convert("neko").unwrap(), 2);
        v.freeze();
        assert!(matches!(v.convert("tori"), Err(VocabError::UnknownWord(_))));
        v.set_unk(UNK_STR).unwrap();
        assert_eq!(v.convert("tori").unwrap(), 4);
        assert_eq!(v.len(), 5);
    }

    #[test]
    fn test_set_unk_requires_frozen() {
        let mut v = Vocab::new();
        assert!(matches!(v.set_unk(UNK_STR), Err(VocabError::NotFrozen)));
    }

    #[test]
    fn test_from_i2w_is_verbatim() {
        let v = Vocab::from_i2w(&strings(&["<s>", "</s>", "<unk>", "a"])).unwrap();
        assert!(v.is_frozen());
        assert_eq!(v.unk_token(), Some(2));
        assert_eq!(v.lookup("a"), Some(3));
        assert_eq!(v.lookup("zzz"), Some(2));
    }

    #[test]
    fn test_from_i2w_requires_reserved_prefix() {
        assert!(matches!(
            Vocab::from_i2w(&strings(&["a", "b"])),
            Err(VocabError::MissingReserved(_))
        ));
    }

    #[test]
    fn test_from_file_prefixes_reserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocab.txt");
        std::fs::write(&path, "the\ncat\n").unwrap();
        let v = Vocab::from_file(&path).unwrap();
        assert_eq!(v.words(), &strings(&["<s>", "</s>", "the", "cat"])[..]);
        assert!(v.is_frozen());
        assert_eq!(v.unk_token(), None);
    }

    #[test]
    fn test_from_file_rejects_reserved_words() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocab.txt");
        std::fs::write(&path, "the\n</s>\n").unwrap();
        assert!(matches!(
            Vocab::from_file(&path),
            Err(VocabError::ReservedWord { .. })
        ));
    }

    #[test]
    fn test_from_file_rejects_unk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocab.txt");
        std::fs::write(&path, "the\n<unk>\n").unwrap();
        match Vocab::from_file(&path) {
            Err(VocabError::ReservedWord { word, .. }) => assert_eq!(word, UNK_STR),
            other => panic!("expected ReservedWord, got {other:?}"),
        }
    }

    #[test]
    fn test_from_file_keeps_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocab.txt");
        std::fs::write(&path, "the\n\ncat\n").unwrap();
        let v = Vocab::from_file(&path).unwrap();
        assert_eq!(v.words(), &strings(&["<s>", "</s>", "the", "", "cat"])[..]);
        assert_eq!(v.lookup("cat"), Some(4));
    }

    #[test]
    fn test_from_config_without_vocab_grows() {
        let v = Vocab::from_config(None).unwrap();
        assert!(!v.is_frozen());
    }
}
