use super::*;
use std::path::Path;
use tempfile::TempDir;

const TWO_EXPERIMENTS: &str = r#"
defaults: &defaults
  src_reader: !PlainTextReader {}
  trg_reader: !PlainTextReader {}

first: !Experiment
  exp_global: !ExpGlobal
    default_layer_dim: 32
  model: !DefaultTranslator
    <<: *defaults
    encoder: !BiLSTMSeqTransducer {layers: 2}
  train: !SimpleTrainingRegimen
    src_file: '{EXP_DIR}/train.ja'
    trg_file: train.en
  evaluate:
    - !AccuracyEvalTask
      src_file: test.ja
      ref_file: test.en
      hyp_file: 'hyp/{EXP}.test'

second: !Experiment
  model: !DefaultTranslator
    <<: *defaults
  train: !SimpleTrainingRegimen
    src_file: a
    trg_file: b
"#;

fn parse(text: &str) -> Result<ExperimentFile, ConfigError> {
    parse_experiment_file(text, Path::new("/cfg/exps.yaml"))
}

#[test]
fn test_experiments_in_file_order_and_anchor_block_skipped() {
    let file = parse(TWO_EXPERIMENTS).unwrap();
    assert_eq!(file.names(), vec!["first", "second"]);
    assert_eq!(file.exp_dir, Path::new("/cfg"));
}

#[test]
fn test_default_paths_are_expanded() {
    let file = parse(TWO_EXPERIMENTS).unwrap();
    let second = file.get("second").unwrap();
    assert_eq!(second.model_file().as_deref(), Some("/cfg/models/second.mod"));
    assert_eq!(second.log_file().as_deref(), Some("/cfg/logs/second.log"));
}

#[test]
fn test_resolve_decodes_with_merge_and_placeholders() {
    let file = parse(TWO_EXPERIMENTS).unwrap();
    let resolved = file.get("first").unwrap().resolve().unwrap();
    let exp = resolved.experiment;
    assert_eq!(exp.train.simple().src_file, "/cfg/train.ja");
    let crate::manifest::EvalTask::AccuracyEvalTask(task) = &exp.evaluate[0] else {
        panic!("expected accuracy task");
    };
    assert_eq!(task.hyp_file, "hyp/first.test");
    // Shared defaults applied after decode.
    let t = exp.model.translator();
    assert_eq!(t.src_embedder.emb_dim(), Some(32));
    assert!(resolved.loaded.is_empty());
}

#[test]
fn test_select_keeps_file_order() {
    let file = parse(TWO_EXPERIMENTS).unwrap();
    let picked = file
        .select(&["second".to_string(), "first".to_string()])
        .unwrap();
    assert_eq!(picked[0].name, "first");
    assert_eq!(file.select(&[]).unwrap().len(), 2);
    assert!(matches!(
        file.select(&["third".to_string()]),
        Err(ConfigError::UnknownExperiment(_))
    ));
}

#[test]
fn test_missing_train_rejected() {
    let err = parse(
        "e: !Experiment\n  model: !DefaultTranslator\n    src_reader: !PlainTextReader {}\n    trg_reader: !PlainTextReader {}\n",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::MissingParam { ref param, .. } if param == "train"));
}

#[test]
fn test_other_top_level_tag_rejected() {
    let err = parse("e: !DefaultTranslator {}\n").unwrap_err();
    assert!(matches!(err, ConfigError::UnexpectedTopLevelTag { .. }));
}

#[test]
fn test_no_experiments() {
    assert!(matches!(parse("a: 1\n"), Err(ConfigError::NoExperiments)));
    assert!(matches!(parse("[1, 2]"), Err(ConfigError::TopLevelNotMapping)));
}

#[test]
fn test_duplicate_experiment_names_rejected() {
    let text = "e: !Experiment {}\ne: !Experiment {}\n";
    assert!(matches!(parse(text), Err(ConfigError::Parse { .. })));
}

#[test]
fn test_unknown_tag_path_includes_experiment() {
    let text = r#"
exp: !Experiment
  model: !DefaultTranslator
    src_reader: !PlainTextReader {}
    trg_reader: !PlainTextReader {}
    encoder: !Transformer {}
  train: !SimpleTrainingRegimen {src_file: a, trg_file: b}
"#;
    let err = parse(text).unwrap_err();
    assert!(
        matches!(err, ConfigError::UnknownTag { ref path, .. } if path == "exp.model.encoder")
    );
}

#[test]
fn test_custom_placeholders() {
    let text = r#"
exp: !Experiment
  exp_global:
    placeholders:
      DATA: /corpus
  model: !DefaultTranslator
    src_reader: !PlainTextReader {}
    trg_reader: !PlainTextReader {}
  train: !SimpleTrainingRegimen
    src_file: '{DATA}/train.ja'
    trg_file: '{DATA}/train.en'
"#;
    let exp = parse(text).unwrap().experiments[0].resolve().unwrap().experiment;
    assert_eq!(exp.train.simple().trg_file, "/corpus/train.en");
}

#[test]
fn test_references_collected_but_not_followed() {
    let text = r#"
exp: !Experiment
  model: !DefaultTranslator
    src_reader: !PlainTextReader {}
    trg_reader: !PlainTextReader {}
    encoder: !LoadSerialized
      filename: '{EXP_DIR}/models/pre.mod'
      path: model.encoder
  train: !SimpleTrainingRegimen {src_file: a, trg_file: b}
"#;
    let file = parse(text).unwrap();
    let exp = &file.experiments[0];
    assert_eq!(exp.references.len(), 1);
    assert_eq!(exp.references[0].spec.filename, "/cfg/models/pre.mod");
    assert!(!exp.is_resolvable_now());
    assert!(matches!(
        exp.resolve(),
        Err(ConfigError::SavedModelNotFound { .. })
    ));
}

#[test]
fn test_load_serialized_resolves_after_save() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("chain.yaml");
    std::fs::write(
        &config,
        r#"
pre: !Experiment
  model: !DefaultTranslator
    src_reader: !PlainTextReader {}
    trg_reader: !PlainTextReader {}
    encoder: !BiLSTMSeqTransducer {layers: 4}
  train: !SimpleTrainingRegimen {src_file: a, trg_file: b}

post: !Experiment
  model: !DefaultTranslator
    src_reader: !PlainTextReader {}
    trg_reader: !PlainTextReader {}
    encoder: !LoadSerialized
      filename: '{EXP_DIR}/models/pre.mod'
      path: model.encoder
      overwrite:
        - {path: dropout, val: 0.1}
  train: !SimpleTrainingRegimen {src_file: a, trg_file: b}
"#,
    )
    .unwrap();
    let file = load_experiment_file(&config).unwrap();

    let pre = file.get("pre").unwrap();
    let saved = pre.resolve().unwrap().experiment;
    let model_file = pre.model_file().unwrap();
    write_model_file(Path::new(&model_file), "pre", &saved, &[], &[]).unwrap();

    let post = file.get("post").unwrap();
    assert!(post.is_resolvable_now());
    let resolved = post.resolve().unwrap();
    assert_eq!(resolved.loaded.len(), 1);
    let crate::manifest::Transducer::BiLstm(enc) = &resolved.experiment.model.translator().encoder
    else {
        panic!("expected BiLSTM encoder");
    };
    assert_eq!(enc.layers, 4);
    assert_eq!(enc.dropout, Some(0.1));
}

#[test]
fn test_missing_config_file() {
    let err = load_experiment_file(Path::new("/nonexistent/exps.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
}
