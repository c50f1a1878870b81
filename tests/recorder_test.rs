//! Dataset persistence: round-trips, idempotent checkpoints, and tolerant
//! loading of prior data.

use std::fs;
use std::path::PathBuf;

use patchsyn::curve::Resonance;
use patchsyn::recorder::{self, Recorder, SampleRecord};
use patchsyn::sampler::ParameterSet;

fn temp(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let _ = fs::remove_file(&path);
    path
}

fn param_names() -> Vec<String> {
    vec!["W".into(), "L".into(), "Ls".into(), "Ws".into()]
}

fn record(w: f64, l: f64, ls: f64, ws: f64, freq: f64, dip: f64) -> SampleRecord {
    SampleRecord::new(
        ParameterSet::from_pairs(vec![
            ("W".into(), w),
            ("L".into(), l),
            ("Ls".into(), ls),
            ("Ws".into(), ws),
        ]),
        Resonance { freq, mag: dip },
    )
}

#[test]
fn roundtrip_preserves_values_and_order() {
    let path = temp("patchsyn_recorder_roundtrip.csv");

    let originals = vec![
        record(42.11, 30.25, 14.0, 4.5, 2.44, -17.3),
        record(31.0, 39.99, 10.02, 2.0, 3.1, -6.25),
        record(48.6, 25.5, 20.75, 8.9, 1.85, -11.0),
    ];
    let mut rec = Recorder::open(&path, &param_names());
    for r in &originals {
        rec.push(r.clone());
    }
    rec.checkpoint().unwrap();

    let (columns, loaded) = recorder::load(&path).unwrap();
    assert_eq!(columns, ["W", "L", "Ls", "Ws", "res_freq", "s11_min"]);
    assert_eq!(loaded, originals, "reloaded records must match in order and value");

    let _ = fs::remove_file(&path);
}

#[test]
fn checkpoint_is_byte_identical_when_repeated() {
    let path = temp("patchsyn_recorder_idempotent.csv");

    let mut rec = Recorder::open(&path, &param_names());
    rec.push(record(40.0, 30.0, 12.5, 3.25, 2.4, -12.0));
    rec.push(record(35.5, 28.0, 11.0, 2.75, 2.9, -8.5));

    rec.checkpoint().unwrap();
    let first = fs::read(&path).unwrap();
    rec.checkpoint().unwrap();
    let second = fs::read(&path).unwrap();
    assert_eq!(first, second, "same in-memory list must serialize identically");

    let _ = fs::remove_file(&path);
}

#[test]
fn missing_file_means_empty_prior_dataset() {
    let path = temp("patchsyn_recorder_missing.csv");
    let rec = Recorder::open(&path, &param_names());
    assert!(rec.is_empty());
}

#[test]
fn unparseable_file_means_empty_prior_dataset() {
    let path = temp("patchsyn_recorder_garbage.csv");
    fs::write(&path, "this is not,a dataset\n1,2\n").unwrap();

    let rec = Recorder::open(&path, &param_names());
    assert!(rec.is_empty(), "garbage input must be swallowed, not crash");

    let _ = fs::remove_file(&path);
}

#[test]
fn mismatched_columns_start_fresh() {
    let path = temp("patchsyn_recorder_mismatch.csv");
    fs::write(&path, "A,B,res_freq,s11_min\n1,2,2.4,-9\n").unwrap();

    let rec = Recorder::open(&path, &param_names());
    assert!(rec.is_empty());

    let _ = fs::remove_file(&path);
}

#[test]
fn reopening_merges_prior_records_with_new_ones() {
    let path = temp("patchsyn_recorder_merge.csv");

    let mut first = Recorder::open(&path, &param_names());
    first.push(record(40.0, 30.0, 12.0, 3.0, 2.4, -12.0));
    first.push(record(44.0, 32.0, 15.0, 4.0, 2.2, -14.5));
    first.checkpoint().unwrap();

    let mut second = Recorder::open(&path, &param_names());
    assert_eq!(second.len(), 2, "reopen must seed from the persisted rows");
    second.push(record(38.0, 27.0, 11.0, 2.5, 2.8, -7.75));
    second.checkpoint().unwrap();

    let (_, loaded) = recorder::load(&path).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[2].res_freq, 2.8);

    let _ = fs::remove_file(&path);
}

#[test]
fn strict_load_reports_non_numeric_rows() {
    let path = temp("patchsyn_recorder_strict.csv");
    fs::write(&path, "W,L,Ls,Ws,res_freq,s11_min\n40,30,12,3,abc,-9\n").unwrap();

    assert!(recorder::load(&path).is_err());

    let _ = fs::remove_file(&path);
}
