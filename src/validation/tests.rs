use super::*;
use crate::manifest::{Experiment, Transducer};
use crate::persistence::parse_experiment_file;
use std::path::Path;
use tempfile::TempDir;

const BASE: &str = r#"
model: !DefaultTranslator
  src_reader: !PlainTextReader {}
  trg_reader: !PlainTextReader {}
train: !SimpleTrainingRegimen
  src_file: train.ja
  trg_file: train.en
"#;

fn experiment(yaml: &str) -> Experiment {
    let mut exp: Experiment = serde_yaml::from_str(yaml).unwrap();
    exp.apply_shared_defaults();
    exp
}

fn check(exp: &Experiment) -> Result<(), ValidationError> {
    validate_experiment(exp, &ValidationOptions::default())
}

#[test]
fn test_defaults_are_valid() {
    assert!(check(&experiment(BASE)).is_ok());
}

#[test]
fn test_zero_batch_size_rejected() {
    let mut exp = experiment(BASE);
    exp.train.simple_mut().batcher = crate::manifest::Batcher::InOrderBatcher(
        crate::manifest::BatchSize { batch_size: 0 },
    );
    let err = check(&exp).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidRange { ref field, .. } if field == "train.batcher.batch_size"));
}

#[test]
fn test_lr_decay_range() {
    let mut exp = experiment(BASE);
    exp.train.simple_mut().lr_decay = 0.0;
    assert!(check(&exp).is_err());
    exp.train.simple_mut().lr_decay = 1.5;
    assert!(check(&exp).is_err());
    exp.train.simple_mut().lr_decay = 0.5;
    assert!(check(&exp).is_ok());
}

#[test]
fn test_dropout_must_be_below_one() {
    let mut exp = experiment(BASE);
    exp.exp_global.dropout = 1.0;
    assert!(matches!(
        check(&exp),
        Err(ValidationError::InvalidRange { ref field, .. }) if field == "exp_global.dropout"
    ));
}

#[test]
fn test_vocab_fields_mutually_exclusive() {
    let exp = experiment(
        r#"
model: !DefaultTranslator
  src_reader: !PlainTextReader
    vocab: {i2w: ['<s>', '</s>'], vocab_file: v.txt}
  trg_reader: !PlainTextReader {}
train: !SimpleTrainingRegimen {src_file: a, trg_file: b}
"#,
    );
    assert!(matches!(
        check(&exp),
        Err(ValidationError::MutuallyExclusive { .. })
    ));
}

#[test]
fn test_unknown_metric_rejected() {
    let exp = experiment(&format!(
        "{BASE}evaluate:\n  - !AccuracyEvalTask {{eval_metrics: 'bleu,meteor', src_file: a, ref_file: b, hyp_file: c}}\n"
    ));
    let err = check(&exp).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidChoice { ref value, .. } if value == "meteor"));
}

#[test]
fn test_unknown_report_type_rejected() {
    let exp = experiment(
        r#"
model: !DefaultTranslator
  src_reader: !PlainTextReader {}
  trg_reader: !PlainTextReader {}
  inference: !SimpleInference {report_path: r, report_type: 'html,pdf'}
train: !SimpleTrainingRegimen {src_file: a, trg_file: b}
"#,
    );
    assert!(matches!(
        check(&exp),
        Err(ValidationError::InvalidChoice { ref value, .. }) if value == "pdf"
    ));
}

#[test]
fn test_modular_needs_modules() {
    let mut exp = experiment(BASE);
    exp.model.translator_mut().encoder = Transducer::Modular(Default::default());
    assert!(matches!(
        check(&exp),
        Err(ValidationError::EmptyRequiredField(ref f)) if f == "model.encoder.modules"
    ));
}

#[test]
fn test_adam_betas_open_interval() {
    let exp = experiment(
        r#"
model: !DefaultTranslator
  src_reader: !PlainTextReader {}
  trg_reader: !PlainTextReader {}
train: !SimpleTrainingRegimen
  src_file: a
  trg_file: b
  trainer: !AdamTrainer {beta_1: 1.0}
"#,
    );
    assert!(check(&exp).is_err());
}

#[test]
fn test_check_files() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("train.ja");
    std::fs::write(&src, "a b\n").unwrap();
    let mut exp = experiment(BASE);
    exp.train.simple_mut().src_file = src.display().to_string();
    exp.train.simple_mut().trg_file = dir.path().join("missing.en").display().to_string();

    let options = ValidationOptions { check_files: true };
    let err = validate_experiment(&exp, &options).unwrap_err();
    assert!(matches!(err, ValidationError::FileNotFound { ref field, .. } if field == "train.trg_file"));
    // Without the flag file existence is not checked.
    assert!(check(&exp).is_ok());
}

#[test]
fn test_run_order_allows_load_of_earlier_model_file() {
    let text = r#"
pre: !Experiment
  model: !DefaultTranslator
    src_reader: !PlainTextReader {}
    trg_reader: !PlainTextReader {}
  train: !SimpleTrainingRegimen {src_file: a, trg_file: b}
post: !Experiment
  model: !DefaultTranslator
    src_reader: !PlainTextReader {}
    trg_reader: !PlainTextReader {}
    encoder: !LoadSerialized {filename: '{EXP_DIR}/models/pre.mod', path: model.encoder}
  train: !SimpleTrainingRegimen {src_file: a, trg_file: b}
"#;
    let file = parse_experiment_file(text, Path::new("/nowhere/exps.yaml")).unwrap();
    let all = file.select(&[]).unwrap();
    assert!(validate_run_order(&all).is_ok());

    let only_post = file.select(&["post".to_string()]).unwrap();
    assert!(matches!(
        validate_run_order(&only_post),
        Err(ValidationError::UnresolvableLoad { .. })
    ));
}
