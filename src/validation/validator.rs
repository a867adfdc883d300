//! Experiment validation logic
//!
//! Runs after decode and shared defaults, before anything is trained.

use std::path::{Path, PathBuf};

use super::error::ValidationError;
use crate::eval::Metric;
use crate::manifest::{
    Attender, Batcher, Bridge, Decoder, Embedder, EvalTask, ExpGlobal, Experiment, Inference,
    LossCalculator, MlpConfig, Reader, SearchStrategy, SimpleTrainingRegimen, Trainer,
    Transducer, MLP_ACTIVATIONS,
};
use crate::persistence::RawExperiment;

/// Valid `report_type` entries
pub const VALID_REPORT_TYPES: &[&str] = &["file", "html"];

/// What to check beyond the schema itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Require input files (corpora, vocab files) to exist.
    pub check_files: bool,
}

/// Validate one decoded experiment.
///
/// Checks:
/// - Output paths are set
/// - Numeric values are in valid ranges
/// - Comma-separated option lists name known values
/// - `i2w` and `vocab_file` are not both given
/// - Input files exist, when requested
pub fn validate_experiment(
    exp: &Experiment,
    options: &ValidationOptions,
) -> Result<(), ValidationError> {
    validate_exp_global(&exp.exp_global)?;

    let t = exp.model.translator();
    validate_reader(&t.src_reader, "model.src_reader", options)?;
    validate_reader(&t.trg_reader, "model.trg_reader", options)?;
    validate_embedder(&t.src_embedder, "model.src_embedder")?;
    validate_transducer(&t.encoder, "model.encoder")?;
    validate_attender(&t.attender, "model.attender")?;
    validate_embedder(&t.trg_embedder, "model.trg_embedder")?;
    validate_decoder(&t.decoder, "model.decoder")?;
    validate_inference(&t.inference, "model.inference")?;

    validate_regimen(exp.train.simple(), "train", options)?;

    for (i, task) in exp.evaluate.iter().enumerate() {
        validate_eval_task(task, &format!("evaluate.{i}"), options)?;
    }
    Ok(())
}

/// Check that every `!LoadSerialized` can be satisfied when its experiment
/// runs: the file exists already, or an experiment earlier in `run_order`
/// writes it.
pub fn validate_run_order(run_order: &[&RawExperiment]) -> Result<(), ValidationError> {
    let mut produced: Vec<PathBuf> = Vec::new();
    for exp in run_order {
        for reference in &exp.references {
            let file = reference.spec.file();
            if !file.is_file() && !produced.iter().any(|p| same_path(p, &file)) {
                return Err(ValidationError::UnresolvableLoad {
                    path: reference.node_path.clone(),
                    filename: reference.spec.filename.clone(),
                });
            }
        }
        if let Some(model_file) = exp.model_file() {
            produced.push(PathBuf::from(model_file));
        }
    }
    Ok(())
}

fn same_path(a: &Path, b: &Path) -> bool {
    a.components().eq(b.components())
}

// ---------------------------------------------------------------------------
// Shared range-check helpers
// ---------------------------------------------------------------------------

fn invalid_range(field: &str, value: impl ToString, constraint: &str) -> ValidationError {
    ValidationError::InvalidRange {
        field: field.to_string(),
        value: value.to_string(),
        constraint: constraint.to_string(),
    }
}

fn validate_nonzero(value: usize, field: &str) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(invalid_range(field, value, ">= 1"));
    }
    Ok(())
}

/// Dimensions left unset are filled from `exp_global`, so only explicit zeros fail.
fn validate_dim(value: Option<usize>, field: &str) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| validate_nonzero(v, field))
}

fn validate_positive_f64(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_nan() || value <= 0.0 {
        return Err(invalid_range(field, value, "> 0"));
    }
    Ok(())
}

fn validate_nonneg_f64(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_nan() || value < 0.0 {
        return Err(invalid_range(field, value, ">= 0"));
    }
    Ok(())
}

/// Dropout-style probabilities lie in [0, 1)
fn validate_probability(value: f64, field: &str) -> Result<(), ValidationError> {
    if !(0.0..1.0).contains(&value) {
        return Err(invalid_range(field, value, "in [0, 1)"));
    }
    Ok(())
}

fn validate_open_unit(value: f64, field: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || value >= 1.0 || value.is_nan() {
        return Err(invalid_range(field, value, "in (0, 1)"));
    }
    Ok(())
}

fn validate_non_empty(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyRequiredField(field.to_string()));
    }
    Ok(())
}

fn validate_choice(value: &str, valid: &[&str], field: &str) -> Result<(), ValidationError> {
    if !valid.contains(&value) {
        return Err(ValidationError::InvalidChoice {
            field: field.to_string(),
            value: value.to_string(),
            valid: valid.join(", "),
        });
    }
    Ok(())
}

fn validate_file(path: &str, field: &str, options: &ValidationOptions) -> Result<(), ValidationError> {
    if options.check_files && !Path::new(path).is_file() {
        return Err(ValidationError::FileNotFound {
            field: field.to_string(),
            path: path.to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Global settings
// ---------------------------------------------------------------------------

fn validate_exp_global(g: &ExpGlobal) -> Result<(), ValidationError> {
    validate_non_empty(&g.model_file, "exp_global.model_file")?;
    validate_non_empty(&g.log_file, "exp_global.log_file")?;
    validate_probability(g.dropout, "exp_global.dropout")?;
    validate_nonneg_f64(g.weight_noise, "exp_global.weight_noise")?;
    validate_nonzero(g.default_layer_dim, "exp_global.default_layer_dim")?;
    validate_nonzero(g.save_num_checkpoints, "exp_global.save_num_checkpoints")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Model components
// ---------------------------------------------------------------------------

fn validate_reader(
    reader: &Reader,
    field: &str,
    options: &ValidationOptions,
) -> Result<(), ValidationError> {
    let r = reader.plain();
    if let Some(n) = r.max_num_sents {
        validate_nonzero(n, &format!("{field}.max_num_sents"))?;
    }
    let Some(vocab) = &r.vocab else {
        return Ok(());
    };
    match (&vocab.i2w, &vocab.vocab_file) {
        (Some(_), Some(_)) => Err(ValidationError::MutuallyExclusive {
            field1: format!("{field}.vocab.i2w"),
            field2: format!("{field}.vocab.vocab_file"),
        }),
        (None, None) => Err(ValidationError::EmptyRequiredField(format!(
            "{field}.vocab (i2w or vocab_file)"
        ))),
        (Some(_), None) => Ok(()),
        (None, Some(file)) => validate_file(file, &format!("{field}.vocab.vocab_file"), options),
    }
}

fn validate_embedder(embedder: &Embedder, field: &str) -> Result<(), ValidationError> {
    match embedder {
        Embedder::SimpleWordEmbedder(e) => {
            validate_dim(e.emb_dim, &format!("{field}.emb_dim"))?;
            validate_dim(e.vocab_size, &format!("{field}.vocab_size"))?;
            validate_probability(e.word_dropout, &format!("{field}.word_dropout"))?;
            if let Some(noise) = e.weight_noise {
                validate_nonneg_f64(noise, &format!("{field}.weight_noise"))?;
            }
            if let Some(norm) = e.fix_norm {
                validate_positive_f64(norm, &format!("{field}.fix_norm"))?;
            }
        }
    }
    Ok(())
}

fn validate_lstm(
    layers: usize,
    dims: [(Option<usize>, &str); 2],
    dropout: Option<f64>,
    field: &str,
) -> Result<(), ValidationError> {
    validate_nonzero(layers, &format!("{field}.layers"))?;
    for (dim, name) in dims {
        validate_dim(dim, &format!("{field}.{name}"))?;
    }
    if let Some(p) = dropout {
        validate_probability(p, &format!("{field}.dropout"))?;
    }
    Ok(())
}

fn validate_transducer(transducer: &Transducer, field: &str) -> Result<(), ValidationError> {
    match transducer {
        Transducer::BiLstm(t) => {
            validate_lstm(
                t.layers,
                [(t.input_dim, "input_dim"), (t.hidden_dim, "hidden_dim")],
                t.dropout,
                field,
            )?;
            if let Some(h) = t.hidden_dim {
                if h % 2 != 0 {
                    return Err(invalid_range(&format!("{field}.hidden_dim"), h, "an even number"));
                }
            }
            Ok(())
        }
        Transducer::UniLstm(t) => {
            validate_lstm(
                t.layers,
                [(t.input_dim, "input_dim"), (t.hidden_dim, "hidden_dim")],
                t.dropout,
                field,
            )?;
            validate_dim(t.decoder_input_dim, &format!("{field}.decoder_input_dim"))
        }
        Transducer::Modular(t) => {
            validate_dim(t.input_dim, &format!("{field}.input_dim"))?;
            if t.modules.is_empty() {
                return Err(ValidationError::EmptyRequiredField(format!("{field}.modules")));
            }
            for (i, module) in t.modules.iter().enumerate() {
                validate_transducer(module, &format!("{field}.modules.{i}"))?;
            }
            Ok(())
        }
    }
}

fn validate_attender(attender: &Attender, field: &str) -> Result<(), ValidationError> {
    if let Attender::MlpAttender(a) = attender {
        validate_dim(a.input_dim, &format!("{field}.input_dim"))?;
        validate_dim(a.state_dim, &format!("{field}.state_dim"))?;
        validate_dim(a.hidden_dim, &format!("{field}.hidden_dim"))?;
    }
    Ok(())
}

fn validate_decoder(decoder: &Decoder, field: &str) -> Result<(), ValidationError> {
    let Decoder::MlpSoftmaxDecoder(d) = decoder;
    validate_dim(d.input_dim, &format!("{field}.input_dim"))?;
    validate_dim(d.trg_embed_dim, &format!("{field}.trg_embed_dim"))?;
    validate_probability(d.label_smoothing, &format!("{field}.label_smoothing"))?;
    validate_transducer(&d.rnn_layer, &format!("{field}.rnn_layer"))?;
    validate_mlp(&d.mlp_layer, &format!("{field}.mlp_layer"))?;
    validate_bridge(&d.bridge, &format!("{field}.bridge"))
}

fn validate_mlp(mlp: &MlpConfig, field: &str) -> Result<(), ValidationError> {
    validate_dim(mlp.input_dim, &format!("{field}.input_dim"))?;
    validate_dim(mlp.hidden_dim, &format!("{field}.hidden_dim"))?;
    validate_dim(mlp.output_dim, &format!("{field}.output_dim"))?;
    validate_choice(&mlp.activation, MLP_ACTIVATIONS, &format!("{field}.activation"))
}

fn validate_bridge(bridge: &Bridge, field: &str) -> Result<(), ValidationError> {
    validate_nonzero(bridge.dec_layers(), &format!("{field}.dec_layers"))?;
    match bridge {
        Bridge::NoBridge(b) | Bridge::CopyBridge(b) => {
            validate_dim(b.dec_dim, &format!("{field}.dec_dim"))
        }
        Bridge::LinearBridge(b) => {
            validate_dim(b.enc_dim, &format!("{field}.enc_dim"))?;
            validate_dim(b.dec_dim, &format!("{field}.dec_dim"))
        }
    }
}

// ---------------------------------------------------------------------------
// Inference and search
// ---------------------------------------------------------------------------

fn validate_inference(inference: &Inference, field: &str) -> Result<(), ValidationError> {
    let i = inference.simple();
    validate_dim(i.max_src_len, &format!("{field}.max_src_len"))?;
    validate_dim(i.max_len, &format!("{field}.max_len"))?;
    let report_types = i.report_types();
    if i.report_path.is_some() && report_types.is_empty() {
        return Err(ValidationError::EmptyRequiredField(format!("{field}.report_type")));
    }
    for report_type in &report_types {
        validate_choice(report_type, VALID_REPORT_TYPES, &format!("{field}.report_type"))?;
    }
    validate_search(&i.search_strategy, &format!("{field}.search_strategy"))
}

fn validate_search(search: &SearchStrategy, field: &str) -> Result<(), ValidationError> {
    validate_nonzero(search.max_len(), &format!("{field}.max_len"))?;
    match search {
        SearchStrategy::BeamSearch(b) => validate_nonzero(b.beam_size, &format!("{field}.beam_size")),
        SearchStrategy::GreedySearch(_) => Ok(()),
        SearchStrategy::SamplingSearch(s) => {
            validate_nonzero(s.sample_size, &format!("{field}.sample_size"))
        }
    }
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

fn validate_regimen(
    r: &SimpleTrainingRegimen,
    field: &str,
    options: &ValidationOptions,
) -> Result<(), ValidationError> {
    validate_non_empty(&r.src_file, &format!("{field}.src_file"))?;
    validate_non_empty(&r.trg_file, &format!("{field}.trg_file"))?;
    validate_file(&r.src_file, &format!("{field}.src_file"), options)?;
    validate_file(&r.trg_file, &format!("{field}.trg_file"), options)?;

    if let Some(epochs) = r.run_for_epochs {
        validate_nonzero(epochs, &format!("{field}.run_for_epochs"))?;
    }
    validate_batcher(&r.batcher, &format!("{field}.batcher"))?;
    validate_trainer(&r.trainer, &format!("{field}.trainer"))?;
    validate_loss(&r.loss_calculator, &format!("{field}.loss_calculator"))?;

    if r.lr_decay <= 0.0 || r.lr_decay > 1.0 || r.lr_decay.is_nan() {
        return Err(invalid_range(&format!("{field}.lr_decay"), r.lr_decay, "in (0, 1]"));
    }
    validate_nonzero(r.patience, &format!("{field}.patience"))?;
    if let Some(p) = r.initial_patience {
        validate_nonzero(p, &format!("{field}.initial_patience"))?;
    }
    for (name, limit) in [
        ("max_num_train_sents", r.max_num_train_sents),
        ("max_src_len", r.max_src_len),
        ("max_trg_len", r.max_trg_len),
    ] {
        validate_dim(limit, &format!("{field}.{name}"))?;
    }

    for (i, task) in r.dev_tasks.iter().enumerate() {
        validate_eval_task(task, &format!("{field}.dev_tasks.{i}"), options)?;
    }
    Ok(())
}

fn validate_batcher(batcher: &Batcher, field: &str) -> Result<(), ValidationError> {
    validate_nonzero(batcher.batch_size(), &format!("{field}.batch_size"))
}

fn validate_trainer(trainer: &Trainer, field: &str) -> Result<(), ValidationError> {
    validate_nonzero(trainer.update_every(), &format!("{field}.update_every"))?;
    match trainer {
        Trainer::AdamTrainer(t) => {
            validate_positive_f64(t.alpha, &format!("{field}.alpha"))?;
            validate_open_unit(t.beta_1, &format!("{field}.beta_1"))?;
            validate_open_unit(t.beta_2, &format!("{field}.beta_2"))?;
            validate_positive_f64(t.eps, &format!("{field}.eps"))
        }
        Trainer::SimpleSgdTrainer(t) => validate_positive_f64(t.e0, &format!("{field}.e0")),
    }
}

fn validate_loss(loss: &LossCalculator, field: &str) -> Result<(), ValidationError> {
    match loss {
        LossCalculator::MleLoss(_) => Ok(()),
        LossCalculator::MinRiskLoss(m) => {
            validate_positive_f64(m.alpha, &format!("{field}.alpha"))?;
            validate_search(&m.search_strategy, &format!("{field}.search_strategy"))
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

fn validate_eval_task(
    task: &EvalTask,
    field: &str,
    options: &ValidationOptions,
) -> Result<(), ValidationError> {
    validate_non_empty(task.src_file(), &format!("{field}.src_file"))?;
    validate_non_empty(task.ref_file(), &format!("{field}.ref_file"))?;
    validate_file(task.src_file(), &format!("{field}.src_file"), options)?;
    validate_file(task.ref_file(), &format!("{field}.ref_file"), options)?;

    match task {
        EvalTask::LossEvalTask(t) => {
            if let Some(b) = &t.batcher {
                validate_batcher(b, &format!("{field}.batcher"))?;
            }
            validate_loss(&t.loss_calculator, &format!("{field}.loss_calculator"))?;
            validate_dim(t.max_num_sents, &format!("{field}.max_num_sents"))
        }
        EvalTask::AccuracyEvalTask(t) => {
            validate_non_empty(&t.hyp_file, &format!("{field}.hyp_file"))?;
            let metrics = t.metric_names();
            if metrics.is_empty() {
                return Err(ValidationError::EmptyRequiredField(format!("{field}.eval_metrics")));
            }
            for name in &metrics {
                name.parse::<Metric>().map_err(|_| ValidationError::InvalidChoice {
                    field: format!("{field}.eval_metrics"),
                    value: name.clone(),
                    valid: Metric::NAMES.join(", "),
                })?;
            }
            if let Some(inference) = &t.inference {
                validate_inference(inference, &format!("{field}.inference"))?;
            }
            Ok(())
        }
    }
}
