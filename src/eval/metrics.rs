//! Corpus-level translation metrics
//!
//! BLEU-4, word and character error rates, and exact-match accuracy. All
//! metrics take hypotheses and references as whole lines and tokenize on
//! whitespace.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::error::{EvalError, Result};

/// Maximum n-gram order for BLEU.
pub const BLEU_MAX_N: usize = 4;

/// Metric named in `eval_metrics`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Bleu,
    Wer,
    Cer,
    Accuracy,
}

impl Metric {
    /// Names accepted by [`FromStr`]
    pub const NAMES: &'static [&'static str] = &["bleu", "wer", "cer", "accuracy"];

    /// Parse a comma-separated metric list such as `bleu,wer`.
    pub fn parse_list(list: &str) -> Result<Vec<Metric>> {
        let metrics = crate::manifest::split_list(list)
            .iter()
            .map(|name| name.parse::<Metric>())
            .collect::<Result<Vec<_>>>()?;
        if metrics.is_empty() {
            return Err(EvalError::NoMetrics);
        }
        Ok(metrics)
    }

    pub fn higher_is_better(self) -> bool {
        matches!(self, Metric::Bleu | Metric::Accuracy)
    }

    /// Score `hyps` against `refs`, line by line.
    pub fn score(self, hyps: &[String], refs: &[String]) -> Result<f64> {
        if hyps.len() != refs.len() {
            return Err(EvalError::LineCountMismatch {
                hyp_lines: hyps.len(),
                ref_lines: refs.len(),
            });
        }
        if refs.is_empty() {
            return Err(EvalError::EmptyCorpus);
        }
        let pairs: Vec<(&str, &str)> = refs
            .iter()
            .zip(hyps)
            .map(|(r, h)| (r.as_str(), h.as_str()))
            .collect();
        Ok(match self {
            Metric::Bleu => corpus_bleu(&pairs, BLEU_MAX_N),
            Metric::Wer => word_error_rate(&pairs),
            Metric::Cer => char_error_rate(&pairs),
            Metric::Accuracy => sentence_accuracy(&pairs),
        })
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Bleu => "BLEU4",
            Metric::Wer => "WER",
            Metric::Cer => "CER",
            Metric::Accuracy => "Accuracy",
        })
    }
}

impl FromStr for Metric {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bleu" => Ok(Metric::Bleu),
            "wer" => Ok(Metric::Wer),
            "cer" => Ok(Metric::Cer),
            "accuracy" => Ok(Metric::Accuracy),
            _ => Err(EvalError::UnknownMetric {
                name: s.to_string(),
                valid: Metric::NAMES.join(", "),
            }),
        }
    }
}

/// One evaluation result.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalScore {
    /// Metric name as printed, e.g. `BLEU4` or `Loss`
    pub name: String,
    pub value: f64,
    pub higher_is_better: bool,
    pub desc: Option<String>,
}

impl EvalScore {
    pub fn from_metric(metric: Metric, value: f64, desc: Option<&str>) -> Self {
        Self {
            name: metric.to_string(),
            value,
            higher_is_better: metric.higher_is_better(),
            desc: desc.map(str::to_string),
        }
    }

    /// Per-word loss; lower is better.
    pub fn loss(value: f64, desc: Option<&str>) -> Self {
        Self {
            name: "Loss".to_string(),
            value,
            higher_is_better: false,
            desc: desc.map(str::to_string),
        }
    }

    /// Strictly better than `other` in this score's direction.
    pub fn better_than(&self, other: &EvalScore) -> bool {
        if self.higher_is_better {
            self.value > other.value
        } else {
            self.value < other.value
        }
    }
}

impl fmt::Display for EvalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.4}", self.name, self.value)?;
        if let Some(desc) = &self.desc {
            write!(f, " ({desc})")?;
        }
        Ok(())
    }
}

// ============================================================================
// BLEU
// ============================================================================

/// Corpus BLEU over `(reference, hypothesis)` pairs.
///
/// Clipped n-gram matches and hypothesis n-gram counts are summed over the
/// whole corpus before taking precisions, and the brevity penalty compares
/// total hypothesis and reference lengths. Returns a value in [0, 1].
pub fn corpus_bleu(pairs: &[(&str, &str)], max_n: usize) -> f64 {
    let mut clipped = vec![0usize; max_n];
    let mut totals = vec![0usize; max_n];
    let mut hyp_len = 0usize;
    let mut ref_len = 0usize;

    for (reference, hypothesis) in pairs {
        let ref_tokens: Vec<&str> = reference.split_whitespace().collect();
        let hyp_tokens: Vec<&str> = hypothesis.split_whitespace().collect();
        ref_len += ref_tokens.len();
        hyp_len += hyp_tokens.len();

        for n in 1..=max_n {
            let ref_ngrams = extract_ngrams(&ref_tokens, n);
            for (ngram, count) in extract_ngrams(&hyp_tokens, n) {
                clipped[n - 1] += count.min(ref_ngrams.get(&ngram).copied().unwrap_or(0));
                totals[n - 1] += count;
            }
        }
    }

    if hyp_len == 0 {
        return 0.0;
    }

    let mut log_precision = 0.0;
    for (&matched, &total) in clipped.iter().zip(&totals) {
        if matched == 0 || total == 0 {
            return 0.0;
        }
        log_precision += (matched as f64 / total as f64).ln();
    }
    log_precision /= max_n.max(1) as f64;

    let bp = if hyp_len >= ref_len {
        1.0
    } else {
        (1.0 - ref_len as f64 / hyp_len as f64).exp()
    };

    bp * log_precision.exp()
}

/// Count n-grams of order `n`.
fn extract_ngrams<'a>(tokens: &[&'a str], n: usize) -> HashMap<Vec<&'a str>, usize> {
    let mut counts = HashMap::new();
    if n > 0 && tokens.len() >= n {
        for window in tokens.windows(n) {
            *counts.entry(window.to_vec()).or_insert(0) += 1;
        }
    }
    counts
}

// ============================================================================
// ERROR RATES
// ============================================================================

/// Levenshtein distance with unit costs.
pub fn edit_distance<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> usize {
    let mut prev: Vec<usize> = (0..=hypothesis.len()).collect();
    let mut curr = vec![0usize; hypothesis.len() + 1];

    for (i, r) in reference.iter().enumerate() {
        curr[0] = i + 1;
        for (j, h) in hypothesis.iter().enumerate() {
            let cost = usize::from(r != h);
            curr[j + 1] = (prev[j + 1] + 1) // deletion
                .min(curr[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[hypothesis.len()]
}

/// Summed edit distance over summed reference length.
///
/// An empty reference side gives 0.0 for empty hypotheses and infinity
/// otherwise.
fn error_rate<T: PartialEq>(units: impl Iterator<Item = (Vec<T>, Vec<T>)>) -> f64 {
    let mut errors = 0usize;
    let mut ref_len = 0usize;
    for (reference, hypothesis) in units {
        errors += edit_distance(&reference, &hypothesis);
        ref_len += reference.len();
    }
    match (ref_len, errors) {
        (0, 0) => 0.0,
        (0, _) => f64::INFINITY,
        _ => errors as f64 / ref_len as f64,
    }
}

/// Corpus word error rate.
pub fn word_error_rate(pairs: &[(&str, &str)]) -> f64 {
    error_rate(pairs.iter().map(|(r, h)| {
        (
            r.split_whitespace().collect::<Vec<_>>(),
            h.split_whitespace().collect::<Vec<_>>(),
        )
    }))
}

/// Corpus character error rate. Runs of whitespace count as one space.
pub fn char_error_rate(pairs: &[(&str, &str)]) -> f64 {
    fn chars(s: &str) -> Vec<char> {
        s.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .collect()
    }
    error_rate(pairs.iter().map(|(r, h)| (chars(r), chars(h))))
}

/// Fraction of sentences whose tokens match the reference exactly.
pub fn sentence_accuracy(pairs: &[(&str, &str)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let correct = pairs
        .iter()
        .filter(|(r, h)| r.split_whitespace().eq(h.split_whitespace()))
        .count();
    correct as f64 / pairs.len() as f64
}
