//! Experiment validation
//!
//! Validates decoded experiments for correctness before anything runs.

mod error;
mod validator;

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod tests;

pub use error::ValidationError;
pub use validator::{
    validate_experiment, validate_run_order, ValidationOptions, VALID_REPORT_TYPES,
};
