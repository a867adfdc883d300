//! Decoding source files with a trained engine.
//!
//! Four modes: `onebest` decodes every sentence, `forced` scores the
//! reference, `forceddebug` additionally cross-checks the forced score
//! against the loss, and `score` rescores `index ||| hypothesis` lines.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::TranslationEngine;
use crate::error::{make_parent_dir, Error, Result};
use crate::manifest::{InferenceMode, SimpleInference};
use crate::output::render;
use crate::reader::{read_lines, PlainTextReader, Sentence};
use crate::runner::log::ExperimentLog;

/// Output line for a sentence longer than `max_src_len`.
pub const NO_DECODING_ATTEMPTED: &str = "@@NO_DECODING_ATTEMPTED@@";

/// Relative difference tolerated between `-loss` and the forced score.
pub const FORCED_DEBUG_TOLERANCE: f64 = 1e-5;

/// Files an inference run reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceFiles {
    pub src_file: PathBuf,
    pub trg_file: PathBuf,
    pub ref_file: Option<PathBuf>,
}

impl InferenceFiles {
    /// Files named by the configuration itself.
    pub fn from_config(config: &SimpleInference) -> Result<Self> {
        let (Some(src), Some(trg)) = (&config.src_file, &config.trg_file) else {
            return Err(Error::Inference(
                "src_file and trg_file must be set".to_string(),
            ));
        };
        Ok(Self {
            src_file: PathBuf::from(src),
            trg_file: PathBuf::from(trg),
            ref_file: config.ref_file.as_ref().map(PathBuf::from),
        })
    }
}

/// One decoded sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSentence {
    pub source: String,
    pub output: String,
    /// `None` when decoding was skipped
    pub score: Option<f64>,
}

/// Result of an inference run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InferenceOutput {
    pub sentences: Vec<DecodedSentence>,
    /// Report files written
    pub reports: Vec<PathBuf>,
    /// Sentences whose forced score disagreed with the loss
    pub mismatches: usize,
}

impl InferenceOutput {
    pub fn lines(&self) -> Vec<&str> {
        self.sentences.iter().map(|s| s.output.as_str()).collect()
    }
}

/// Run inference and write `files.trg_file`.
///
/// Both readers must already be frozen with an unknown-word token.
pub fn perform_inference(
    engine: &dyn TranslationEngine,
    src_reader: &mut PlainTextReader,
    trg_reader: &mut PlainTextReader,
    config: &SimpleInference,
    files: &InferenceFiles,
    compute_report: bool,
    log: &mut ExperimentLog,
) -> Result<InferenceOutput> {
    let src_lines = read_lines(&files.src_file)?;
    let mut output = match config.mode {
        InferenceMode::OneBest => decode_onebest(engine, src_reader, trg_reader, config, &src_lines)?,
        InferenceMode::Forced | InferenceMode::ForcedDebug => decode_forced(
            engine,
            src_reader,
            trg_reader,
            config,
            &src_lines,
            require_ref(files, config.mode)?,
            log,
        )?,
        InferenceMode::Score => score_hypotheses(
            engine,
            src_reader,
            trg_reader,
            &src_lines,
            require_ref(files, config.mode)?,
        )?,
    };

    write_lines(&files.trg_file, &output.lines())?;
    log.debug(format!(
        "Wrote {} {} outputs to {}",
        output.sentences.len(),
        config.mode,
        files.trg_file.display()
    ));

    match (&config.report_path, compute_report) {
        (Some(report_path), true) => {
            output.reports = write_reports(Path::new(report_path), &config.report_types(), &output)?;
        }
        (Some(_), false) => {
            log.warn("report_path is set but exp_global.compute_report is false; no report written");
        }
        _ => {}
    }
    Ok(output)
}

fn require_ref(files: &InferenceFiles, mode: InferenceMode) -> Result<&Path> {
    files
        .ref_file
        .as_deref()
        .ok_or_else(|| Error::Inference(format!("mode '{mode}' requires a ref_file")))
}

/// `src` is a read sentence, so its length includes `</s>`.
fn too_long(config: &SimpleInference, src: &Sentence) -> bool {
    config.max_src_len.is_some_and(|max| src.len() > max)
}

fn decode_onebest(
    engine: &dyn TranslationEngine,
    src_reader: &mut PlainTextReader,
    trg_reader: &PlainTextReader,
    config: &SimpleInference,
    src_lines: &[String],
) -> Result<InferenceOutput> {
    let search = config
        .search_strategy
        .with_max_len(config.effective_max_len());
    let mut out = InferenceOutput::default();
    for line in src_lines {
        let src = src_reader.read_sent(line)?;
        if too_long(config, &src) {
            out.sentences.push(DecodedSentence {
                source: line.clone(),
                output: NO_DECODING_ATTEMPTED.to_string(),
                score: None,
            });
            continue;
        }
        let hyp = engine.generate(&src, &search, None)?;
        let words = hyp.ids.len();
        let score = match search.len_norm() {
            Some(norm) => norm.normalize(hyp.score, words),
            None => hyp.score,
        };
        out.sentences.push(DecodedSentence {
            source: line.clone(),
            output: render(trg_reader.vocab(), &hyp.ids, config.post_process),
            score: Some(score),
        });
    }
    Ok(out)
}

fn decode_forced(
    engine: &dyn TranslationEngine,
    src_reader: &mut PlainTextReader,
    trg_reader: &mut PlainTextReader,
    config: &SimpleInference,
    src_lines: &[String],
    ref_file: &Path,
    log: &mut ExperimentLog,
) -> Result<InferenceOutput> {
    let ref_lines = read_lines(ref_file)?;
    if ref_lines.len() != src_lines.len() {
        return Err(Error::Inference(format!(
            "{} has {} lines but the source has {}",
            ref_file.display(),
            ref_lines.len(),
            src_lines.len()
        )));
    }
    let debug = config.mode == InferenceMode::ForcedDebug;
    let search = &config.search_strategy;
    let mut out = InferenceOutput::default();

    for (i, (line, ref_line)) in src_lines.iter().zip(&ref_lines).enumerate() {
        let src = src_reader.read_sent(line)?;
        if too_long(config, &src) {
            out.sentences.push(DecodedSentence {
                source: line.clone(),
                output: NO_DECODING_ATTEMPTED.to_string(),
                score: None,
            });
            continue;
        }
        let reference = trg_reader.read_sent(ref_line)?;
        let hyp = engine.generate(&src, search, Some(&reference))?;

        if debug {
            let loss = engine.calc_loss(&src, &reference)?;
            let scale = hyp.score.abs().max(loss.abs()).max(f64::MIN_POSITIVE);
            if ((-loss) - hyp.score).abs() / scale > FORCED_DEBUG_TOLERANCE {
                log.error(format!(
                    "Forced decoding score {} does not match loss {} for sentence {i}",
                    hyp.score, loss
                ));
                out.mismatches += 1;
            }
        }
        out.sentences.push(DecodedSentence {
            source: line.clone(),
            output: render(trg_reader.vocab(), &hyp.ids, config.post_process),
            score: Some(hyp.score),
        });
    }
    Ok(out)
}

fn score_hypotheses(
    engine: &dyn TranslationEngine,
    src_reader: &mut PlainTextReader,
    trg_reader: &mut PlainTextReader,
    src_lines: &[String],
    ref_file: &Path,
) -> Result<InferenceOutput> {
    let mut out = InferenceOutput::default();
    for (n, line) in read_lines(ref_file)?.into_iter().enumerate() {
        let (index, hypothesis) = parse_nbest_line(&line).ok_or_else(|| {
            Error::Inference(format!(
                "{}:{}: expected 'index ||| hypothesis'",
                ref_file.display(),
                n + 1
            ))
        })?;
        let source = src_lines.get(index).ok_or_else(|| {
            Error::Inference(format!(
                "{}:{}: index {index} out of range ({} source sentences)",
                ref_file.display(),
                n + 1,
                src_lines.len()
            ))
        })?;
        let src = src_reader.read_sent(source)?;
        let hyp = trg_reader.read_sent(hypothesis)?;
        let score = -engine.calc_loss(&src, &hyp)?;
        out.sentences.push(DecodedSentence {
            source: source.clone(),
            output: format!("{line} ||| score={score}"),
            score: Some(score),
        });
    }
    Ok(out)
}

/// Split `index ||| hypothesis`.
fn parse_nbest_line(line: &str) -> Option<(usize, &str)> {
    let (index, rest) = line.split_once("|||")?;
    let index = index.trim().parse().ok()?;
    let hypothesis = rest.split("|||").next().unwrap_or("").trim();
    Some((index, hypothesis))
}

/// Write one line per entry, creating parent directories.
pub fn write_lines(path: &Path, lines: &[&str]) -> Result<()> {
    make_parent_dir(path)?;
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    fs::write(path, text).map_err(|e| Error::io(format!("writing {}", path.display()), e))
}

fn write_reports(
    report_path: &Path,
    report_types: &[String],
    output: &InferenceOutput,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for report_type in report_types {
        let (ext, text) = match report_type.as_str() {
            "file" => ("txt", text_report(output)),
            "html" => ("html", html_report(output)),
            other => {
                return Err(Error::Inference(format!("unknown report type '{other}'")));
            }
        };
        let mut name = report_path.as_os_str().to_owned();
        name.push(format!(".{ext}"));
        let path = PathBuf::from(name);
        make_parent_dir(&path)?;
        fs::write(&path, text).map_err(|e| Error::io(format!("writing {}", path.display()), e))?;
        written.push(path);
    }
    Ok(written)
}

fn score_text(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{s:.4}"))
}

fn text_report(output: &InferenceOutput) -> String {
    let mut text = String::new();
    for (i, s) in output.sentences.iter().enumerate() {
        let _ = writeln!(
            text,
            "[{i}]\nsource: {}\noutput: {}\nscore:  {}\n",
            s.source,
            s.output,
            score_text(s.score)
        );
    }
    text
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn html_report(output: &InferenceOutput) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Translation report</title></head>\n<body>\n<table>\n<tr><th>#</th><th>Source</th><th>Output</th><th>Score</th></tr>\n",
    );
    for (i, s) in output.sentences.iter().enumerate() {
        let _ = writeln!(
            html,
            "<tr><td>{i}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&s.source),
            escape_html(&s.output),
            score_text(s.score)
        );
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}
