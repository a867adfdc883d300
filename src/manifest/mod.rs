//! Typed experiment schema
//!
//! The raw node tree produced by [`crate::persistence`] is decoded into these
//! types with serde. Each component slot is an enum whose variant is chosen
//! by the YAML tag, so `encoder: !BiLSTMSeqTransducer {...}` decodes into
//! `Transducer::BiLstm(..)`.
//!
//! - `experiment` - Experiment root, ExpGlobal
//! - `model` - DefaultTranslator and its components
//! - `reader` - PlainTextReader, VocabConfig
//! - `training` - SimpleTrainingRegimen, batchers, trainers, losses
//! - `eval` - LossEvalTask, AccuracyEvalTask
//! - `inference` - SimpleInference, search strategies, post-processing

pub mod eval;
pub mod experiment;
pub mod inference;
pub mod model;
pub mod reader;
pub mod training;

pub use eval::{AccuracyEvalTask, EvalTask, LossEvalTask};
pub use experiment::{
    ExpGlobal, Experiment, LossCombMethod, DEFAULT_LOG_FILE, DEFAULT_MODEL_FILE,
};
pub use inference::{
    split_list, BeamSearch, GreedySearch, Inference, InferenceMode, LengthNormalization,
    PostProcess, SamplingSearch, SearchStrategy, SimpleInference,
};
pub use model::{
    Attender, Bridge, Decoder, DefaultTranslator, Embedder, MlpConfig, Model, SharedDefaults,
    Transducer, MLP_ACTIVATIONS,
};
pub use reader::{PlainTextReader, Reader, VocabConfig};
pub use training::{
    AdamTrainer, BatchSize, Batcher, LossCalculator, MinRiskLoss, Regimen, SimpleSgdTrainer,
    SimpleTrainingRegimen, Trainer,
};

impl Experiment {
    /// Fill unset dimensions, dropout and weight noise from `exp_global`.
    pub fn apply_shared_defaults(&mut self) {
        let defaults = SharedDefaults {
            layer_dim: self.exp_global.default_layer_dim,
            dropout: self.exp_global.dropout,
            weight_noise: self.exp_global.weight_noise,
        };
        self.model.apply_shared_defaults(&defaults);
    }

    /// Dev tasks first, then final evaluation tasks.
    pub fn all_eval_tasks(&self) -> impl Iterator<Item = &EvalTask> {
        self.train.simple().dev_tasks.iter().chain(self.evaluate.iter())
    }
}
