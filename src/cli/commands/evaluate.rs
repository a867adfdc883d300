//! Evaluate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::EvaluateArgs;
use crate::eval::{score_files, Metric};

pub fn run_evaluate(args: EvaluateArgs, level: LogLevel) -> Result<(), String> {
    let metrics = Metric::parse_list(&args.metric).map_err(|e| e.to_string())?;
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "Scoring {} against {}",
            args.hyp.display(),
            args.reference.display()
        ),
    );

    let scores = score_files(&args.hyp, &args.reference, &metrics).map_err(|e| e.to_string())?;
    for score in &scores {
        // printed regardless of --quiet
        println!("{score}");
    }
    Ok(())
}
