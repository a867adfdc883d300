//! Saved model files
//!
//! A model file is the resolved experiment as a tagged YAML document. Its
//! vocabularies are stored inline as `i2w`, so a later `!LoadSerialized` does
//! not depend on the original vocab files. Engine parameters live next to it
//! in `<model_file>.data/`.

use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::node::tagged;
use crate::error::{make_parent_dir, Error, Result};
use crate::manifest::{Experiment, VocabConfig};

/// Directory holding engine parameters for `model_file`.
pub fn data_dir(model_file: &Path) -> PathBuf {
    let mut name = model_file.as_os_str().to_owned();
    name.push(".data");
    PathBuf::from(name)
}

fn numbered(model_file: &Path, n: usize) -> PathBuf {
    let mut name = model_file.as_os_str().to_owned();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

/// Render `experiment` as a model file document.
pub fn model_file_yaml(
    name: &str,
    experiment: &Experiment,
    src_vocab: &[String],
    trg_vocab: &[String],
) -> std::result::Result<String, ConfigError> {
    let mut saved = experiment.clone();
    let translator = saved.model.translator_mut();
    translator.src_reader.plain_mut().vocab = Some(inline_vocab(src_vocab));
    translator.trg_reader.plain_mut().vocab = Some(inline_vocab(trg_vocab));

    let encode_err = |e: serde_yaml::Error| ConfigError::Encode {
        experiment: name.to_string(),
        message: e.to_string(),
    };
    let body: Value = serde_yaml::to_value(&saved).map_err(encode_err)?;
    serde_yaml::to_string(&tagged("Experiment", body)).map_err(encode_err)
}

fn inline_vocab(words: &[String]) -> VocabConfig {
    VocabConfig {
        i2w: Some(words.to_vec()),
        vocab_file: None,
    }
}

/// Write the model file, creating parent directories.
pub fn write_model_file(
    path: &Path,
    name: &str,
    experiment: &Experiment,
    src_vocab: &[String],
    trg_vocab: &[String],
) -> Result<()> {
    let text = model_file_yaml(name, experiment, src_vocab, trg_vocab)?;
    make_parent_dir(path)?;
    fs::write(path, text)
        .map_err(|e| Error::io(format!("writing model file {}", path.display()), e))
}

/// Shift older checkpoints so at most `keep` copies of `model_file` remain:
/// `m` becomes `m.1`, `m.1` becomes `m.2`, and so on.
pub fn rotate_checkpoints(model_file: &Path, keep: usize) -> Result<()> {
    if keep <= 1 || !model_file.exists() {
        return Ok(());
    }
    for n in (1..keep - 1).rev() {
        shift(&numbered(model_file, n), &numbered(model_file, n + 1))?;
    }
    shift(model_file, &numbered(model_file, 1))
}

fn shift(from: &Path, to: &Path) -> Result<()> {
    for (src, dst) in [
        (from.to_path_buf(), to.to_path_buf()),
        (data_dir(from), data_dir(to)),
    ] {
        if !src.exists() {
            continue;
        }
        if dst.is_dir() {
            fs::remove_dir_all(&dst)
                .map_err(|e| Error::io(format!("removing {}", dst.display()), e))?;
        }
        fs::rename(&src, &dst).map_err(|e| {
            Error::io(format!("moving {} to {}", src.display(), dst.display()), e)
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::load_serialized::LoadSerialized;
    use tempfile::TempDir;

    fn experiment() -> Experiment {
        serde_yaml::from_str(
            r#"
model: !DefaultTranslator
  src_reader: !PlainTextReader
    vocab:
      vocab_file: /data/vocab.ja
  trg_reader: !PlainTextReader {}
  encoder: !BiLSTMSeqTransducer {layers: 3}
train: !SimpleTrainingRegimen
  src_file: a
  trg_file: b
"#,
        )
        .unwrap()
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_data_dir_suffix() {
        assert_eq!(data_dir(Path::new("m/x.mod")), PathBuf::from("m/x.mod.data"));
    }

    #[test]
    fn test_model_file_is_tagged_and_inlines_vocab() {
        let text = model_file_yaml(
            "exp",
            &experiment(),
            &words(&["<s>", "</s>", "neko"]),
            &words(&["<s>", "</s>", "cat"]),
        )
        .unwrap();
        assert!(text.starts_with("!Experiment"));
        assert!(text.contains("neko"));
        assert!(!text.contains("vocab_file"));
    }

    #[test]
    fn test_written_file_is_loadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models/exp.mod");
        write_model_file(&path, "exp", &experiment(), &words(&["<s>", "</s>"]), &words(&["<s>", "</s>"]))
            .unwrap();

        let spec = LoadSerialized {
            filename: path.display().to_string(),
            path: "model.encoder".to_string(),
            overwrite: vec![],
        };
        let encoder = spec.load("other.model.encoder").unwrap();
        let encoder: crate::manifest::Transducer = serde_yaml::from_value(encoder).unwrap();
        assert!(matches!(encoder, crate::manifest::Transducer::BiLstm(ref t) if t.layers == 3));
    }

    #[test]
    fn test_rotate_keeps_numbered_copies() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.mod");
        fs::write(&path, "one").unwrap();
        rotate_checkpoints(&path, 3).unwrap();
        fs::write(&path, "two").unwrap();
        rotate_checkpoints(&path, 3).unwrap();
        fs::write(&path, "three").unwrap();
        rotate_checkpoints(&path, 3).unwrap();

        assert!(!path.exists());
        assert_eq!(fs::read_to_string(numbered(&path, 1)).unwrap(), "three");
        assert_eq!(fs::read_to_string(numbered(&path, 2)).unwrap(), "two");
        assert!(!numbered(&path, 3).exists());
    }

    #[test]
    fn test_rotate_single_checkpoint_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.mod");
        fs::write(&path, "one").unwrap();
        rotate_checkpoints(&path, 1).unwrap();
        assert!(path.exists());
    }
}
