//! Inference and search configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inference slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inference {
    SimpleInference(SimpleInference),
}

impl Default for Inference {
    fn default() -> Self {
        Inference::SimpleInference(SimpleInference::default())
    }
}

impl Inference {
    pub fn simple(&self) -> &SimpleInference {
        match self {
            Inference::SimpleInference(i) => i,
        }
    }

    pub fn simple_mut(&mut self) -> &mut SimpleInference {
        match self {
            Inference::SimpleInference(i) => i,
        }
    }
}

/// Decode a source file into a hypothesis file (`!SimpleInference`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleInference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trg_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_src_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
    pub post_process: PostProcess,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    pub report_type: String,
    pub search_strategy: SearchStrategy,
    pub mode: InferenceMode,
}

impl Default for SimpleInference {
    fn default() -> Self {
        Self {
            src_file: None,
            trg_file: None,
            ref_file: None,
            max_src_len: None,
            max_len: None,
            post_process: PostProcess::Plain,
            report_path: None,
            report_type: "html".to_string(),
            search_strategy: SearchStrategy::default(),
            mode: InferenceMode::OneBest,
        }
    }
}

impl SimpleInference {
    /// Maximum output length: `max_len` if set, else the search strategy's.
    pub fn effective_max_len(&self) -> usize {
        self.max_len.unwrap_or_else(|| self.search_strategy.max_len())
    }

    /// Report formats named in `report_type`.
    pub fn report_types(&self) -> Vec<String> {
        split_list(&self.report_type)
    }
}

/// Split a comma-separated option, dropping empty entries.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Output post-processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostProcess {
    #[default]
    #[serde(rename = "none")]
    Plain,
    JoinChar,
    JoinBpe,
    JoinPiece,
}

impl fmt::Display for PostProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PostProcess::Plain => "none",
            PostProcess::JoinChar => "join-char",
            PostProcess::JoinBpe => "join-bpe",
            PostProcess::JoinPiece => "join-piece",
        })
    }
}

/// What inference produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceMode {
    /// Best hypothesis per source sentence
    #[default]
    OneBest,
    /// Force-decode the reference
    Forced,
    /// Force-decode and cross-check the forced score against the loss
    ForcedDebug,
    /// Score `idx ||| hypothesis` lines from `ref_file`
    Score,
}

impl InferenceMode {
    pub fn needs_ref(self) -> bool {
        !matches!(self, InferenceMode::OneBest)
    }
}

impl fmt::Display for InferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InferenceMode::OneBest => "onebest",
            InferenceMode::Forced => "forced",
            InferenceMode::ForcedDebug => "forceddebug",
            InferenceMode::Score => "score",
        })
    }
}

impl FromStr for InferenceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "onebest" => Ok(InferenceMode::OneBest),
            "forced" => Ok(InferenceMode::Forced),
            "forceddebug" => Ok(InferenceMode::ForcedDebug),
            "score" => Ok(InferenceMode::Score),
            _ => Err(format!(
                "Unknown inference mode: {s}. Valid: onebest, forced, forceddebug, score"
            )),
        }
    }
}

// ============================================================================
// SEARCH STRATEGIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchStrategy {
    BeamSearch(BeamSearch),
    GreedySearch(GreedySearch),
    SamplingSearch(SamplingSearch),
}

impl Default for SearchStrategy {
    fn default() -> Self {
        SearchStrategy::BeamSearch(BeamSearch::default())
    }
}

impl SearchStrategy {
    pub fn max_len(&self) -> usize {
        match self {
            SearchStrategy::BeamSearch(s) => s.max_len,
            SearchStrategy::GreedySearch(s) => s.max_len,
            SearchStrategy::SamplingSearch(s) => s.max_len,
        }
    }

    /// Copy of the strategy with its length limit replaced.
    pub fn with_max_len(&self, max_len: usize) -> Self {
        let mut search = self.clone();
        match &mut search {
            SearchStrategy::BeamSearch(s) => s.max_len = max_len,
            SearchStrategy::GreedySearch(s) => s.max_len = max_len,
            SearchStrategy::SamplingSearch(s) => s.max_len = max_len,
        }
        search
    }

    /// Length normalization applied to final scores.
    pub fn len_norm(&self) -> Option<&LengthNormalization> {
        match self {
            SearchStrategy::BeamSearch(s) => Some(&s.len_norm),
            _ => None,
        }
    }

    /// Number of hypotheses the strategy keeps per sentence.
    pub fn width(&self) -> usize {
        match self {
            SearchStrategy::BeamSearch(s) => s.beam_size,
            SearchStrategy::GreedySearch(_) => 1,
            SearchStrategy::SamplingSearch(s) => s.sample_size,
        }
    }
}

/// `!BeamSearch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamSearch {
    pub beam_size: usize,
    pub max_len: usize,
    pub len_norm: LengthNormalization,
    pub one_best: bool,
}

impl Default for BeamSearch {
    fn default() -> Self {
        Self {
            beam_size: 1,
            max_len: 100,
            len_norm: LengthNormalization::default(),
            one_best: true,
        }
    }
}

/// `!GreedySearch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreedySearch {
    pub max_len: usize,
}

impl Default for GreedySearch {
    fn default() -> Self {
        Self { max_len: 100 }
    }
}

/// `!SamplingSearch`. `max_length` is accepted as an alias of `max_len`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSearch {
    #[serde(alias = "max_length")]
    pub max_len: usize,
    pub sample_size: usize,
}

impl Default for SamplingSearch {
    fn default() -> Self {
        Self {
            max_len: 100,
            sample_size: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LengthNormalization {
    NoNormalization(NoNormalization),
    PolynomialNormalization(PolynomialNormalization),
}

impl Default for LengthNormalization {
    fn default() -> Self {
        LengthNormalization::NoNormalization(NoNormalization {})
    }
}

impl LengthNormalization {
    /// Normalize a total log-probability over `len` output words.
    pub fn normalize(&self, score: f64, len: usize) -> f64 {
        match self {
            LengthNormalization::NoNormalization(_) => score,
            LengthNormalization::PolynomialNormalization(p) => {
                score / (len.max(1) as f64).powf(p.m)
            }
        }
    }
}

/// `!NoNormalization`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NoNormalization {}

/// `!PolynomialNormalization`: divide by `len^m`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolynomialNormalization {
    pub m: f64,
    pub apply_during_search: bool,
}

impl Default for PolynomialNormalization {
    fn default() -> Self {
        Self {
            m: 1.0,
            apply_during_search: false,
        }
    }
}
