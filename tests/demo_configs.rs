//! Demo Configuration Tests
//!
//! Every YAML file under demos/ must load, pass validation and run to
//! completion with the baseline engine. Runs happen in a temporary copy of
//! the demos directory so outputs never land in the source tree.

use nmt_exp::cli::LogLevel;
use nmt_exp::engine::CopyEngineFactory;
use nmt_exp::persistence::load_experiment_file;
use nmt_exp::persistence::node::get_path;
use nmt_exp::runner::{plan, run_file, ExperimentStatus, RunOptions};
use nmt_exp::validation::{validate_experiment, validate_run_order, ValidationOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DEMOS: &[&str] = &[
    "standard.yaml",
    "pretrain_finetune.yaml",
    "minrisk_modular.yaml",
    "inference_modes.yaml",
];

fn demos_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos")
}

/// Copy demos/ (configs and data) into a fresh temporary directory
fn copy_demos() -> TempDir {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();
    for entry in fs::read_dir(demos_dir().join("data")).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), data.join(entry.file_name())).unwrap();
    }
    for name in DEMOS {
        fs::copy(demos_dir().join(name), dir.path().join(name)).unwrap();
    }
    dir
}

fn quiet() -> RunOptions {
    RunOptions {
        log_level: LogLevel::Quiet,
        ..Default::default()
    }
}

#[test]
fn demos_load_and_validate() {
    for name in DEMOS {
        let path = demos_dir().join(name);
        let file = load_experiment_file(&path).unwrap_or_else(|e| panic!("{name}: {e}"));
        let selected = file.select(&[]).unwrap();
        validate_run_order(&selected).unwrap_or_else(|e| panic!("{name}: {e}"));

        for raw in selected.iter().filter(|r| r.references.is_empty()) {
            let resolved = raw.resolve().unwrap_or_else(|e| panic!("{name}/{}: {e}", raw.name));
            validate_experiment(&resolved.experiment, &ValidationOptions { check_files: true })
                .unwrap_or_else(|e| panic!("{name}/{}: {e}", raw.name));
        }
    }
}

#[test]
fn demos_dry_run() {
    let dir = copy_demos();
    for name in DEMOS {
        let options = RunOptions {
            dry_run: true,
            check_files: true,
            ..quiet()
        };
        let report = run_file(&dir.path().join(name), &options, &CopyEngineFactory)
            .unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(report.succeeded(), "{name}: {:?}", report.outcomes);
    }
    assert!(!dir.path().join("out").exists());
}

#[test]
fn demos_run_to_completion() {
    let dir = copy_demos();
    for name in DEMOS {
        let report = run_file(&dir.path().join(name), &quiet(), &CopyEngineFactory)
            .unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(report.succeeded(), "{name}: {:?}", report.outcomes);
        for outcome in &report.outcomes {
            assert_eq!(outcome.status, ExperimentStatus::Completed, "{name}");
            assert!(outcome.model_file.as_ref().unwrap().is_file(), "{name}");
            assert!(outcome.log_file.as_ref().unwrap().is_file(), "{name}");
        }
    }
}

#[test]
fn standard_demo_scores_test_set() {
    let dir = copy_demos();
    let report = run_file(&dir.path().join("standard.yaml"), &quiet(), &CopyEngineFactory).unwrap();
    let outcome = report.get("standard").unwrap();
    let names: Vec<&str> = outcome.scores.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["BLEU4", "WER", "CER"]);
    assert!(dir.path().join("out/hyp/standard.test.hyp").is_file());
    assert!(dir.path().join("out/hyp/standard.dev.hyp").is_file());
}

#[test]
fn inference_modes_demo_writes_reports() {
    let dir = copy_demos();
    let report = run_file(
        &dir.path().join("inference_modes.yaml"),
        &quiet(),
        &CopyEngineFactory,
    )
    .unwrap();
    let outcome = report.get("modes").unwrap();
    // forced decoding reproduces the reference exactly
    assert_eq!(outcome.scores[0].name, "Accuracy");
    assert!((outcome.scores[0].value - 1.0).abs() < 1e-10);

    let forced = fs::read_to_string(dir.path().join("out/hyp/modes.forced.hyp")).unwrap();
    let reference = fs::read_to_string(dir.path().join("data/test.en")).unwrap();
    assert_eq!(forced.lines().collect::<Vec<_>>(), reference.lines().collect::<Vec<_>>());

    let reports = dir.path().join("out/reports");
    assert!(reports.join("modes.forced.html").is_file());
    assert!(reports.join("modes.forced.txt").is_file());
}

#[test]
fn pretrain_finetune_plan() {
    let file = load_experiment_file(&demos_dir().join("pretrain_finetune.yaml")).unwrap();
    let entries = plan(&file, &[]).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["pretrain", "finetune", "encoder_reuse"]);
    assert!(entries[0].loads.is_empty());
    for entry in &entries[1..] {
        assert_eq!(entry.loads.len(), 1);
        assert_eq!(entry.loads[0].produced_by.as_deref(), Some("pretrain"));
    }
    assert_eq!(entries[2].loads[0].path, "model.encoder");
}

#[test]
fn pretrain_finetune_reuses_saved_components() {
    let dir = copy_demos();
    let report = run_file(
        &dir.path().join("pretrain_finetune.yaml"),
        &quiet(),
        &CopyEngineFactory,
    )
    .unwrap();
    assert!(report.succeeded(), "{:?}", report.outcomes);

    let log = fs::read_to_string(dir.path().join("out/logs/finetune.log")).unwrap();
    assert!(log.contains("Initialized parameters from"));

    let saved = fs::read_to_string(dir.path().join("out/models/encoder_reuse.mod")).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&saved).unwrap();
    let encoder_layers = get_path(&doc, "model.encoder.layers").and_then(|v| v.as_u64());
    assert_eq!(encoder_layers, Some(2), "encoder comes from pretrain");
    let dropout = get_path(&doc, "model.encoder.dropout").and_then(|v| v.as_f64());
    assert_eq!(dropout, Some(0.1), "overwrite applied");
}
