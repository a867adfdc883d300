//! Model architecture configuration
//!
//! Component slots are enums whose variant is chosen by the YAML tag.
//! Dimensions, dropout and weight noise left unset are filled from
//! `exp_global` by [`Model::apply_shared_defaults`].

use serde::{Deserialize, Serialize};

use super::inference::Inference;
use super::reader::Reader;

/// Values a component inherits from `exp_global` when it leaves them unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedDefaults {
    pub layer_dim: usize,
    pub dropout: f64,
    pub weight_noise: f64,
}

fn fill<T: Copy>(slot: &mut Option<T>, value: T) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Model slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Model {
    DefaultTranslator(DefaultTranslator),
}

impl Model {
    pub fn translator(&self) -> &DefaultTranslator {
        match self {
            Model::DefaultTranslator(t) => t,
        }
    }

    pub fn translator_mut(&mut self) -> &mut DefaultTranslator {
        match self {
            Model::DefaultTranslator(t) => t,
        }
    }

    pub fn apply_shared_defaults(&mut self, d: &SharedDefaults) {
        let t = self.translator_mut();
        t.src_embedder.apply_shared_defaults(d);
        t.encoder.apply_shared_defaults(d);
        t.attender.apply_shared_defaults(d);
        t.trg_embedder.apply_shared_defaults(d);
        t.decoder.apply_shared_defaults(d);
    }
}

/// Attentional encoder-decoder translator (`!DefaultTranslator`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultTranslator {
    pub src_reader: Reader,
    pub trg_reader: Reader,
    #[serde(default)]
    pub src_embedder: Embedder,
    #[serde(default)]
    pub encoder: Transducer,
    #[serde(default)]
    pub attender: Attender,
    #[serde(default)]
    pub trg_embedder: Embedder,
    #[serde(default)]
    pub decoder: Decoder,
    #[serde(default)]
    pub inference: Inference,
}

// ============================================================================
// EMBEDDERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Embedder {
    SimpleWordEmbedder(SimpleWordEmbedder),
}

impl Default for Embedder {
    fn default() -> Self {
        Embedder::SimpleWordEmbedder(SimpleWordEmbedder::default())
    }
}

impl Embedder {
    fn apply_shared_defaults(&mut self, d: &SharedDefaults) {
        match self {
            Embedder::SimpleWordEmbedder(e) => {
                fill(&mut e.emb_dim, d.layer_dim);
                fill(&mut e.weight_noise, d.weight_noise);
            }
        }
    }

    pub fn emb_dim(&self) -> Option<usize> {
        match self {
            Embedder::SimpleWordEmbedder(e) => e.emb_dim,
        }
    }
}

/// Word lookup embedder (`!SimpleWordEmbedder`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleWordEmbedder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emb_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_noise: Option<f64>,
    pub word_dropout: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_norm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocab_size: Option<usize>,
}

// ============================================================================
// TRANSDUCERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transducer {
    #[serde(rename = "BiLSTMSeqTransducer")]
    BiLstm(LstmTransducer),
    #[serde(rename = "UniLSTMSeqTransducer")]
    UniLstm(UniLstmTransducer),
    #[serde(rename = "ModularSeqTransducer")]
    Modular(ModularTransducer),
}

impl Default for Transducer {
    fn default() -> Self {
        Transducer::BiLstm(LstmTransducer::default())
    }
}

impl Transducer {
    fn apply_shared_defaults(&mut self, d: &SharedDefaults) {
        match self {
            Transducer::BiLstm(t) => t.apply_shared_defaults(d),
            Transducer::UniLstm(t) => {
                fill(&mut t.input_dim, d.layer_dim);
                fill(&mut t.hidden_dim, d.layer_dim);
                fill(&mut t.dropout, d.dropout);
                fill(&mut t.weightnoise_std, d.weight_noise);
                fill(&mut t.decoder_input_dim, d.layer_dim);
            }
            Transducer::Modular(t) => {
                fill(&mut t.input_dim, d.layer_dim);
                for module in &mut t.modules {
                    module.apply_shared_defaults(d);
                }
            }
        }
    }

    /// Tag name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Transducer::BiLstm(_) => "BiLSTMSeqTransducer",
            Transducer::UniLstm(_) => "UniLSTMSeqTransducer",
            Transducer::Modular(_) => "ModularSeqTransducer",
        }
    }
}

/// Shared LSTM parameters (`!BiLSTMSeqTransducer`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LstmTransducer {
    pub layers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropout: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weightnoise_std: Option<f64>,
}

impl Default for LstmTransducer {
    fn default() -> Self {
        Self {
            layers: 1,
            input_dim: None,
            hidden_dim: None,
            dropout: None,
            weightnoise_std: None,
        }
    }
}

impl LstmTransducer {
    fn apply_shared_defaults(&mut self, d: &SharedDefaults) {
        fill(&mut self.input_dim, d.layer_dim);
        fill(&mut self.hidden_dim, d.layer_dim);
        fill(&mut self.dropout, d.dropout);
        fill(&mut self.weightnoise_std, d.weight_noise);
    }
}

/// Unidirectional LSTM (`!UniLSTMSeqTransducer`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniLstmTransducer {
    pub layers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropout: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weightnoise_std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoder_input_dim: Option<usize>,
    pub decoder_input_feeding: bool,
}

impl Default for UniLstmTransducer {
    fn default() -> Self {
        Self {
            layers: 1,
            input_dim: None,
            hidden_dim: None,
            dropout: None,
            weightnoise_std: None,
            decoder_input_dim: None,
            decoder_input_feeding: true,
        }
    }
}

/// Stack of transducers applied in order (`!ModularSeqTransducer`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModularTransducer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dim: Option<usize>,
    pub modules: Vec<Transducer>,
}

// ============================================================================
// ATTENDERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attender {
    MlpAttender(MlpAttender),
    DotAttender(DotAttender),
}

impl Default for Attender {
    fn default() -> Self {
        Attender::MlpAttender(MlpAttender::default())
    }
}

impl Attender {
    fn apply_shared_defaults(&mut self, d: &SharedDefaults) {
        if let Attender::MlpAttender(a) = self {
            fill(&mut a.input_dim, d.layer_dim);
            fill(&mut a.state_dim, d.layer_dim);
            fill(&mut a.hidden_dim, d.layer_dim);
        }
    }
}

/// Additive attention (`!MlpAttender`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MlpAttender {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_dim: Option<usize>,
}

/// Dot-product attention (`!DotAttender`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotAttender {
    pub scale: bool,
}

impl Default for DotAttender {
    fn default() -> Self {
        Self { scale: true }
    }
}

// ============================================================================
// DECODERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decoder {
    MlpSoftmaxDecoder(MlpSoftmaxDecoder),
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::MlpSoftmaxDecoder(MlpSoftmaxDecoder::default())
    }
}

impl Decoder {
    fn apply_shared_defaults(&mut self, d: &SharedDefaults) {
        match self {
            Decoder::MlpSoftmaxDecoder(dec) => {
                fill(&mut dec.input_dim, d.layer_dim);
                fill(&mut dec.trg_embed_dim, d.layer_dim);
                dec.rnn_layer.apply_shared_defaults(d);
                dec.mlp_layer.apply_shared_defaults(d);
                dec.bridge.apply_shared_defaults(d);
            }
        }
    }
}

/// RNN decoder with an MLP softmax output layer (`!MlpSoftmaxDecoder`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlpSoftmaxDecoder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trg_embed_dim: Option<usize>,
    pub input_feeding: bool,
    pub rnn_layer: Transducer,
    pub mlp_layer: MlpConfig,
    pub bridge: Bridge,
    pub label_smoothing: f64,
}

impl Default for MlpSoftmaxDecoder {
    fn default() -> Self {
        Self {
            input_dim: None,
            trg_embed_dim: None,
            input_feeding: true,
            rnn_layer: Transducer::UniLstm(UniLstmTransducer::default()),
            mlp_layer: MlpConfig::default(),
            bridge: Bridge::default(),
            label_smoothing: 0.0,
        }
    }
}

/// Activations accepted by [`MlpConfig::activation`]
pub const MLP_ACTIVATIONS: &[&str] = &["tanh", "relu", "sigmoid", "elu", "selu", "linear"];

/// Feed-forward layer (`!MLP`)
///
/// `output_dim` left unset means "target vocabulary size".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlpConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dim: Option<usize>,
    pub activation: String,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            input_dim: None,
            hidden_dim: None,
            output_dim: None,
            activation: "tanh".to_string(),
        }
    }
}

impl MlpConfig {
    fn apply_shared_defaults(&mut self, d: &SharedDefaults) {
        fill(&mut self.input_dim, d.layer_dim);
        fill(&mut self.hidden_dim, d.layer_dim);
    }
}

// ============================================================================
// BRIDGES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Bridge {
    NoBridge(BridgeDims),
    CopyBridge(BridgeDims),
    LinearBridge(LinearBridge),
}

impl Default for Bridge {
    fn default() -> Self {
        Bridge::CopyBridge(BridgeDims::default())
    }
}

impl Bridge {
    fn apply_shared_defaults(&mut self, d: &SharedDefaults) {
        match self {
            Bridge::NoBridge(b) | Bridge::CopyBridge(b) => fill(&mut b.dec_dim, d.layer_dim),
            Bridge::LinearBridge(b) => {
                fill(&mut b.enc_dim, d.layer_dim);
                fill(&mut b.dec_dim, d.layer_dim);
            }
        }
    }

    pub fn dec_layers(&self) -> usize {
        match self {
            Bridge::NoBridge(b) | Bridge::CopyBridge(b) => b.dec_layers,
            Bridge::LinearBridge(b) => b.dec_layers,
        }
    }
}

/// `!NoBridge` / `!CopyBridge`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeDims {
    pub dec_layers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dec_dim: Option<usize>,
}

impl Default for BridgeDims {
    fn default() -> Self {
        Self {
            dec_layers: 1,
            dec_dim: None,
        }
    }
}

/// `!LinearBridge`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearBridge {
    pub dec_layers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enc_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dec_dim: Option<usize>,
}

impl Default for LinearBridge {
    fn default() -> Self {
        Self {
            dec_layers: 1,
            enc_dim: None,
            dec_dim: None,
        }
    }
}
