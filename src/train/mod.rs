//! Training
//!
//! - `batcher`: length filtering and batch packing
//! - `patience`: best-score tracking, patience and learning-rate decay
//! - `checkpoint`: model file and engine parameter saving
//! - `regimen`: the `SimpleTrainingRegimen` epoch loop

mod batcher;
mod checkpoint;
mod patience;
mod regimen;

pub use batcher::{filter_pairs, group_updates, pack_batches, sent_len};
pub use checkpoint::ModelCheckpoint;
pub use patience::{CheckpointAction, PatienceTracker};
pub use regimen::{load_training_data, run_regimen, RegimenContext, TrainingSummary};
