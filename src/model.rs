//! Geometry regression: frequency in, four dimensions out.
//!
//! smartcore's random forest is single-output, so the model is one forest
//! per geometry dimension behind a thin multi-output wrapper. The wrapper
//! is the persisted artifact; its internals are owned by smartcore and
//! opaque to everything outside this module.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::info;

use crate::config::TrainConfig;
use crate::recorder;
use crate::{Error, Result};

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Multi-output wrapper: one fitted forest per named geometry dimension,
/// all driven by the single `res_freq` feature.
#[derive(Serialize, Deserialize)]
pub struct GeometryModel {
    feature: String,
    targets: Vec<String>,
    forests: Vec<Forest>,
}

impl GeometryModel {
    /// Fit one 100-tree forest per target column. `xs` is the feature
    /// vector, `ys` one column per entry of `targets`, all of equal length.
    pub fn fit(xs: &[f64], ys: &[Vec<f64>], targets: Vec<String>, seed: u64) -> Result<Self> {
        let rows: Vec<Vec<f64>> = xs.iter().map(|&x| vec![x]).collect();
        let x = DenseMatrix::from_2d_vec(&rows);

        let mut forests = Vec::with_capacity(ys.len());
        for (k, column) in ys.iter().enumerate() {
            let params = RandomForestRegressorParameters::default()
                .with_n_trees(100)
                .with_seed(seed + k as u64);
            let forest = Forest::fit(&x, column, params)
                .map_err(|e| Error::Training(format!("target `{}`: {e}", targets[k])))?;
            forests.push(forest);
        }
        Ok(Self {
            feature: recorder::RES_FREQ_COL.to_owned(),
            targets,
            forests,
        })
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Predict all dimensions for a single target frequency.
    pub fn predict(&self, freq: f64) -> Result<Vec<f64>> {
        let x = DenseMatrix::from_2d_vec(&vec![vec![freq]]);
        let mut dims = Vec::with_capacity(self.forests.len());
        for (forest, target) in self.forests.iter().zip(&self.targets) {
            let y = forest
                .predict(&x)
                .map_err(|e| Error::Training(format!("target `{target}`: {e}")))?;
            dims.push(y[0]);
        }
        Ok(dims)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ModelMissing(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Ok(bincode::deserialize_from(BufReader::new(file))?)
    }
}

/// What training saw and how the held-out split scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainReport {
    pub rows_total: usize,
    pub rows_usable: usize,
    pub mae: f64,
    pub r2: f64,
}

/// Full training pipeline: load, quality-filter, gate on the minimum row
/// count, split, fit, score, persist. No model file is written unless
/// every step succeeds.
pub fn train(cfg: &TrainConfig) -> Result<TrainReport> {
    let (columns, mut records) = recorder::load(&cfg.dataset_path)?;
    let rows_total = records.len();
    info!(rows = rows_total, dataset = %cfg.dataset_path.display(), "loaded dataset");

    // Keep only geometries with a real impedance dip.
    records.retain(|r| r.s11_min < cfg.quality_cutoff_db);
    let rows_usable = records.len();
    info!(
        usable = rows_usable,
        total = rows_total,
        cutoff_db = cfg.quality_cutoff_db,
        "filtered poorly matched antennas"
    );

    if rows_usable < cfg.min_usable_rows {
        return Err(Error::InsufficientData {
            found: rows_usable,
            needed: cfg.min_usable_rows,
        });
    }

    let targets: Vec<String> = columns[..columns.len() - 2].to_vec();
    let n_targets = targets.len();

    // Deterministic shuffled split.
    let mut indices: Vec<usize> = (0..rows_usable).collect();
    let mut rng = ChaCha20Rng::seed_from_u64(cfg.seed);
    indices.shuffle(&mut rng);
    let test_n = ((rows_usable as f64) * cfg.test_fraction).round() as usize;
    let test_n = test_n.clamp(1, rows_usable - 1);
    let (test_idx, train_idx) = indices.split_at(test_n);

    let xs: Vec<f64> = train_idx.iter().map(|&i| records[i].res_freq).collect();
    let ys: Vec<Vec<f64>> = (0..n_targets)
        .map(|k| train_idx.iter().map(|&i| records[i].params.value_at(k)).collect())
        .collect();

    info!(train = train_idx.len(), test = test_idx.len(), "fitting random forests");
    let model = GeometryModel::fit(&xs, &ys, targets, cfg.seed)?;

    // Held-out error, aggregated over every target cell (MAE) and averaged
    // per target (R²).
    let mut truth: Vec<Vec<f64>> = vec![Vec::new(); n_targets];
    let mut preds: Vec<Vec<f64>> = vec![Vec::new(); n_targets];
    let mut abs_err_sum = 0.0;
    for &i in test_idx {
        let p = model.predict(records[i].res_freq)?;
        for k in 0..n_targets {
            let t = records[i].params.value_at(k);
            abs_err_sum += (p[k] - t).abs();
            truth[k].push(t);
            preds[k].push(p[k]);
        }
    }
    let mae = abs_err_sum / (test_idx.len() * n_targets) as f64;
    let r2 = truth
        .iter()
        .zip(&preds)
        .map(|(t, p)| r_squared(t, p))
        .sum::<f64>()
        / n_targets as f64;

    info!(mae, r2, "held-out evaluation");

    model.save(&cfg.model_path)?;
    info!(path = %cfg.model_path.display(), "model saved");

    Ok(TrainReport {
        rows_total,
        rows_usable,
        mae,
        r2,
    })
}

/// Load the persisted model and synthesize dimensions for one frequency.
pub fn predict_design(model_path: &Path, freq: f64) -> Result<Vec<(String, f64)>> {
    let model = GeometryModel::load(model_path)?;
    let dims = model.predict(freq)?;
    Ok(model.targets.iter().cloned().zip(dims).collect())
}

fn r_squared(truth: &[f64], pred: &[f64]) -> f64 {
    let n = truth.len() as f64;
    let mean = truth.iter().sum::<f64>() / n;
    let ss_tot: f64 = truth.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = truth.iter().zip(pred).map(|(t, p)| (t - p).powi(2)).sum();
    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}
