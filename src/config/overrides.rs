//! Command-line overrides applied to every decoded experiment

use super::cli::RunArgs;
use crate::manifest::Experiment;

/// Values given on the command line that replace configured ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// Replaces `train.run_for_epochs`
    pub epochs: Option<usize>,
}

impl From<&RunArgs> for Overrides {
    fn from(args: &RunArgs) -> Self {
        Self {
            epochs: args.epochs,
        }
    }
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.epochs.is_none()
    }
}

/// Apply command-line overrides to an Experiment
pub fn apply_overrides(experiment: &mut Experiment, overrides: &Overrides) {
    if let Some(epochs) = overrides.epochs {
        experiment.train.simple_mut().run_for_epochs = Some(epochs);
    }
}
