//! Configuration persistence: loading experiment files, placeholder
//! expansion, `!LoadSerialized` resolution and saved model files.

mod check;
pub mod error;
pub mod load_serialized;
pub mod loader;
pub mod model_file;
pub mod node;
pub mod placeholders;
pub mod registry;

pub use error::ConfigError;
pub use load_serialized::{LoadReference, LoadSerialized, Overwrite, MAX_LOAD_DEPTH};
pub use loader::{
    load_experiment_file, parse_experiment_file, ExperimentFile, RawExperiment, Resolved,
};
pub use model_file::{data_dir, rotate_checkpoints, write_model_file};
pub use placeholders::{placeholder_names, Placeholders};
pub use registry::Category;

#[cfg(test)]
mod tests;
