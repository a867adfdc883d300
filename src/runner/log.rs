//! Per-experiment log
//!
//! Every message goes to the experiment's log file with a timestamp and a
//! severity, and to the console when the CLI log level allows it.

use chrono::Local;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::error::{make_parent_dir, Error, Result};

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        })
    }
}

/// Log sink for one experiment
#[derive(Debug)]
pub struct ExperimentLog {
    level: LogLevel,
    file: Option<File>,
    path: Option<PathBuf>,
    entries: Vec<(Severity, String)>,
}

impl ExperimentLog {
    /// Console-only log.
    pub fn console(level: LogLevel) -> Self {
        Self {
            level,
            file: None,
            path: None,
            entries: Vec::new(),
        }
    }

    /// Log to `path` (truncated) as well as the console.
    pub fn create(path: &Path, level: LogLevel) -> Result<Self> {
        make_parent_dir(path)?;
        let file = File::create(path)
            .map_err(|e| Error::io(format!("creating log file {}", path.display()), e))?;
        Ok(Self {
            level,
            file: Some(file),
            path: Some(path.to_path_buf()),
            entries: Vec::new(),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Messages logged so far.
    pub fn entries(&self) -> &[(Severity, String)] {
        &self.entries
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|(s, _)| *s == severity).count()
    }

    pub fn debug(&mut self, msg: impl Into<String>) {
        self.write(Severity::Debug, msg.into());
    }

    pub fn info(&mut self, msg: impl Into<String>) {
        self.write(Severity::Info, msg.into());
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.write(Severity::Warning, msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.write(Severity::Error, msg.into());
    }

    fn write(&mut self, severity: Severity, msg: String) {
        match severity {
            Severity::Debug => log(self.level, LogLevel::Verbose, &msg),
            Severity::Info => log(self.level, LogLevel::Normal, &msg),
            Severity::Warning | Severity::Error => {
                if self.level != LogLevel::Quiet {
                    eprintln!("{severity}: {msg}");
                }
            }
        }

        if let Some(file) = &mut self.file {
            let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            if let Err(e) = writeln!(file, "{stamp} [{severity}] {msg}") {
                eprintln!("Warning: log file disabled after write failure: {e}");
                self.file = None;
            }
        }
        self.entries.push((severity, msg));
    }
}
