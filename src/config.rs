//! Run-time configuration, created once per operation and immutable after.

use std::path::PathBuf;

use crate::sampler::BoundSpec;

pub const DEFAULT_DATASET: &str = "data/antenna_data.csv";
pub const DEFAULT_MODEL: &str = "models/antenna_model.bin";

/// Settings for one generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// How many new samples to attempt.
    pub samples: usize,
    /// Loop iterations between whole-file dataset rewrites.
    pub checkpoint_every: usize,
    pub dataset_path: PathBuf,
    pub bounds: BoundSpec,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            samples: 10,
            checkpoint_every: 5,
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            bounds: BoundSpec::u_slot_patch(),
        }
    }
}

/// Settings for one training run.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    /// Rows with `s11_min` at or above this are dropped before training.
    pub quality_cutoff_db: f64,
    /// Fewer usable rows than this aborts the training step.
    pub min_usable_rows: usize,
    /// Fraction of usable rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the shuffled split and the forests.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            model_path: PathBuf::from(DEFAULT_MODEL),
            quality_cutoff_db: -5.0,
            min_usable_rows: 10,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}
