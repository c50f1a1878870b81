// session.rs - capability interface over one live solver session

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use csv::ReaderBuilder;
use tracing::debug;

use crate::curve::Curve;
use crate::sampler::ParameterSet;
use crate::{Error, Result};

/// One open project in the electromagnetic solver. The session is stateful
/// and externally owned, which is why the generation loop never evaluates
/// two candidates concurrently.
///
/// Calls are synchronous and may block for as long as the solver needs; a
/// hang blocks the run. `read_curve` returns `Ok(None)` when the last run
/// produced no usable output, which callers treat as a skip.
pub trait SimulationSession {
    /// Push a parameter set into the open project.
    fn apply(&mut self, params: &ParameterSet) -> Result<()>;
    /// Rebuild the geometry and run the solver to completion.
    fn run_evaluation(&mut self) -> Result<()>;
    /// Fetch the reflection curve from the last run, if one exists.
    fn read_curve(&mut self) -> Result<Option<Curve>>;
}

/// Drives an external solver binary through the filesystem: parameters go
/// out as `params.csv`, the reflection sweep comes back as a two-column
/// `curve.csv`, and the command is invoked once per evaluation with both
/// paths appended to its argument list.
pub struct CommandSession {
    program: String,
    args: Vec<String>,
    params_path: PathBuf,
    curve_path: PathBuf,
}

impl CommandSession {
    /// Establish the session. Errors here abort a whole generation run,
    /// unlike per-iteration solver faults.
    pub fn connect(program: &str, args: &[String], exchange_dir: &Path) -> Result<Self> {
        if program.trim().is_empty() {
            return Err(Error::Connect("no solver command configured".into()));
        }
        fs::create_dir_all(exchange_dir).map_err(|e| {
            Error::Connect(format!("cannot prepare {}: {e}", exchange_dir.display()))
        })?;
        debug!(program, exchange = %exchange_dir.display(), "solver session ready");
        Ok(Self {
            program: program.to_owned(),
            args: args.to_vec(),
            params_path: exchange_dir.join("params.csv"),
            curve_path: exchange_dir.join("curve.csv"),
        })
    }
}

impl SimulationSession for CommandSession {
    fn apply(&mut self, params: &ParameterSet) -> Result<()> {
        let mut out = String::new();
        for (name, value) in params.iter() {
            out.push_str(&format!("{name},{value}\n"));
        }
        fs::write(&self.params_path, out).map_err(|e| {
            Error::Solver(format!("writing {}: {e}", self.params_path.display()))
        })
    }

    fn run_evaluation(&mut self) -> Result<()> {
        // Stale output must never be mistaken for fresh results.
        if self.curve_path.exists() {
            let _ = fs::remove_file(&self.curve_path);
        }
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.params_path)
            .arg(&self.curve_path)
            .status()
            .map_err(|e| Error::Solver(format!("spawning {}: {e}", self.program)))?;
        if !status.success() {
            return Err(Error::Solver(format!("{} exited with {status}", self.program)));
        }
        Ok(())
    }

    fn read_curve(&mut self) -> Result<Option<Curve>> {
        if !self.curve_path.exists() {
            return Ok(None);
        }
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .from_path(&self.curve_path)?;
        let mut freq = Vec::new();
        let mut mag = Vec::new();
        for result in rdr.records() {
            let record = result?;
            if record.len() < 2 {
                return Err(Error::Solver(format!(
                    "curve row needs two columns, got {}",
                    record.len()
                )));
            }
            let f: f64 = record[0].trim().parse().map_err(|_| {
                Error::Solver(format!("bad curve value `{}`", &record[0]))
            })?;
            let m: f64 = record[1].trim().parse().map_err(|_| {
                Error::Solver(format!("bad curve value `{}`", &record[1]))
            })?;
            freq.push(f);
            mag.push(m);
        }
        Ok(Some(Curve { freq, mag }))
    }
}
