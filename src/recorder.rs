//! Dataset accumulation and whole-file CSV checkpointing.
//!
//! The recorder keeps the session's record list in memory, seeded from any
//! prior dataset on disk. Checkpoints rewrite the entire file from that
//! list, so a crash between checkpoints loses only the unpersisted tail.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, warn};

use crate::curve::Resonance;
use crate::sampler::ParameterSet;
use crate::{Error, Result};

pub const RES_FREQ_COL: &str = "res_freq";
pub const S11_MIN_COL: &str = "s11_min";

/// One completed evaluation: the drawn geometry plus its extracted
/// response. Immutable once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub params: ParameterSet,
    pub res_freq: f64,
    pub s11_min: f64,
}

impl SampleRecord {
    pub fn new(params: ParameterSet, res: Resonance) -> Self {
        Self {
            params,
            res_freq: res.freq,
            s11_min: res.mag,
        }
    }
}

/// Strict parse of a dataset file into `(parameter columns, records)`.
///
/// Callers that can tolerate a bad file (the generator seeding its session
/// list) downgrade the error to an empty dataset; the trainer propagates it.
pub fn load(path: &Path) -> Result<(Vec<String>, Vec<SampleRecord>)> {
    if !path.exists() {
        return Err(Error::DatasetMissing(path.to_path_buf()));
    }
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    let n = columns.len();
    if n < 3 || columns[n - 2] != RES_FREQ_COL || columns[n - 1] != S11_MIN_COL {
        return Err(Error::Dataset {
            path: path.to_path_buf(),
            detail: format!("unexpected columns {columns:?}"),
        });
    }
    let param_names = &columns[..n - 2];

    let mut records = Vec::new();
    for (row_idx, result) in rdr.records().enumerate() {
        let record = result?;
        let mut values = Vec::with_capacity(record.len());
        for field in record.iter() {
            let v: f64 = field.trim().parse().map_err(|_| Error::Dataset {
                path: path.to_path_buf(),
                detail: format!("row {}: non-numeric field `{field}`", row_idx + 2),
            })?;
            values.push(v);
        }
        if values.len() != n {
            return Err(Error::Dataset {
                path: path.to_path_buf(),
                detail: format!("row {}: expected {n} fields, got {}", row_idx + 2, values.len()),
            });
        }
        let params = ParameterSet::from_pairs(
            param_names
                .iter()
                .cloned()
                .zip(values.iter().copied())
                .collect(),
        );
        records.push(SampleRecord {
            params,
            res_freq: values[n - 2],
            s11_min: values[n - 1],
        });
    }
    Ok((columns, records))
}

/// In-memory ordered record list with periodic whole-file persistence.
pub struct Recorder {
    path: PathBuf,
    param_names: Vec<String>,
    records: Vec<SampleRecord>,
}

impl Recorder {
    /// Seed the session list from an existing dataset. A missing,
    /// unreadable, or incompatible file just means an empty prior dataset;
    /// only a genuinely readable one is merged.
    pub fn open(path: &Path, param_names: &[String]) -> Self {
        let records = match load(path) {
            Ok((columns, records)) if columns[..columns.len() - 2] == *param_names => {
                debug!(rows = records.len(), path = %path.display(), "loaded existing dataset");
                records
            }
            Ok((columns, _)) => {
                warn!(
                    path = %path.display(),
                    found = ?columns,
                    expected = ?param_names,
                    "dataset columns do not match current bounds, starting fresh"
                );
                Vec::new()
            }
            Err(Error::DatasetMissing(_)) => Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read prior dataset, starting fresh");
                Vec::new()
            }
        };
        Self {
            path: path.to_path_buf(),
            param_names: param_names.to_vec(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    pub fn push(&mut self, record: SampleRecord) {
        self.records.push(record);
    }

    /// Rewrite the whole dataset file from the in-memory list. Output is
    /// deterministic: the same list always serializes to the same bytes.
    pub fn checkpoint(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let mut wtr = WriterBuilder::new().from_path(&self.path)?;

        let mut header: Vec<&str> = self.param_names.iter().map(String::as_str).collect();
        header.push(RES_FREQ_COL);
        header.push(S11_MIN_COL);
        wtr.write_record(&header)?;

        for rec in &self.records {
            let mut row: Vec<String> = rec.params.values().map(|v| v.to_string()).collect();
            row.push(rec.res_freq.to_string());
            row.push(rec.s11_min.to_string());
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        debug!(rows = self.records.len(), path = %self.path.display(), "checkpoint written");
        Ok(())
    }
}
