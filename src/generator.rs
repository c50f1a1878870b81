//! The data-collection loop: draw a geometry, run the solver, extract the
//! resonance, record, checkpoint. One sample at a time; the solver session
//! is a single shared external resource and is never invoked concurrently.

use std::fmt;

use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use tracing::{info, warn};

use crate::config::GeneratorConfig;
use crate::curve::Resonance;
use crate::recorder::{Recorder, SampleRecord};
use crate::sampler::{ParameterSet, Sampler};
use crate::session::SimulationSession;
use crate::{Error, Result};

/// Why one loop iteration produced no record.
#[derive(Debug)]
pub enum SkipReason {
    /// The solver call itself failed.
    Fault(Error),
    /// The run finished but left no curve to read.
    NoCurve,
    /// A curve came back with no points, so no minimum exists.
    EmptyCurve,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Fault(e) => write!(f, "{e}"),
            SkipReason::NoCurve => write!(f, "solver produced no reflection curve"),
            SkipReason::EmptyCurve => write!(f, "reflection curve was empty"),
        }
    }
}

/// Counters for one generation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub requested: usize,
    pub recorded: usize,
    pub skipped: usize,
    pub checkpoints: usize,
    /// Dataset size after the final checkpoint, prior rows included.
    pub total_rows: usize,
}

/// Run the full loop for `cfg.samples` iterations. Per-iteration failures
/// are logged and skipped; the loop always attempts the requested count.
/// Only checkpoint write failures (and an invalid bound spec) abort.
pub fn run<S, R>(cfg: &GeneratorConfig, session: &mut S, rng: &mut R) -> Result<RunSummary>
where
    S: SimulationSession,
    R: Rng,
{
    let sampler = Sampler::new(cfg.bounds.clone())?;
    let mut recorder = Recorder::open(&cfg.dataset_path, &cfg.bounds.names());
    let every = cfg.checkpoint_every.max(1);

    info!(
        samples = cfg.samples,
        existing = recorder.len(),
        dataset = %cfg.dataset_path.display(),
        "starting generation run"
    );

    let bar = ProgressBar::new(cfg.samples as u64);
    bar.set_style(
        ProgressStyle::with_template(" {bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}]")
            .unwrap(),
    );

    let mut summary = RunSummary {
        requested: cfg.samples,
        ..Default::default()
    };

    for i in 0..cfg.samples {
        let params = sampler.draw(rng);
        match evaluate_candidate(session, &params) {
            Ok(res) => {
                info!(
                    iteration = i + 1,
                    freq = res.freq,
                    dip = res.mag,
                    %params,
                    "recorded sample"
                );
                recorder.push(SampleRecord::new(params, res));
                summary.recorded += 1;
            }
            Err(reason) => {
                warn!(iteration = i + 1, %params, %reason, "skipped sample");
                summary.skipped += 1;
            }
        }

        // Fires on iteration zero as well, so even a run that dies early
        // leaves a file behind.
        if i % every == 0 {
            recorder.checkpoint()?;
            summary.checkpoints += 1;
        }
        bar.inc(1);
    }

    recorder.checkpoint()?;
    summary.checkpoints += 1;
    bar.finish();

    summary.total_rows = recorder.len();
    info!(
        recorded = summary.recorded,
        skipped = summary.skipped,
        total = summary.total_rows,
        "generation complete"
    );
    Ok(summary)
}

/// One sample end to end. Every failure maps to a [`SkipReason`] so the
/// caller can log it and move on; nothing here aborts the batch.
fn evaluate_candidate<S: SimulationSession>(
    session: &mut S,
    params: &ParameterSet,
) -> std::result::Result<Resonance, SkipReason> {
    session.apply(params).map_err(SkipReason::Fault)?;
    session.run_evaluation().map_err(SkipReason::Fault)?;
    let curve = session
        .read_curve()
        .map_err(SkipReason::Fault)?
        .ok_or(SkipReason::NoCurve)?;
    curve.resonance().ok_or(SkipReason::EmptyCurve)
}
