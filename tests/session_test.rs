//! CommandSession against tiny shell stand-ins for the solver.

#![cfg(unix)]

use std::fs;
use std::path::PathBuf;

use patchsyn::sampler::ParameterSet;
use patchsyn::session::{CommandSession, SimulationSession};
use patchsyn::Error;

fn exchange(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn params() -> ParameterSet {
    ParameterSet::from_pairs(vec![("W".into(), 42.5), ("L".into(), 30.0)])
}

#[test]
fn empty_command_is_a_connect_failure() {
    let dir = exchange("patchsyn_session_empty");
    assert!(matches!(
        CommandSession::connect("", &[], &dir),
        Err(Error::Connect(_))
    ));
}

#[test]
fn curve_written_by_the_command_is_read_back() {
    let dir = exchange("patchsyn_session_ok");
    // The stand-in solver ignores the params file ($0) and writes a canned
    // two-column sweep to the curve path ($1).
    let script = "printf '2.0,-4.0\\n2.4,-11.5\\n3.0,-3.0\\n' > \"$1\"".to_string();
    let mut session =
        CommandSession::connect("sh", &["-c".into(), script], &dir).unwrap();

    session.apply(&params()).unwrap();
    session.run_evaluation().unwrap();
    let curve = session.read_curve().unwrap().expect("curve file was written");

    assert_eq!(curve.freq, vec![2.0, 2.4, 3.0]);
    assert_eq!(curve.mag, vec![-4.0, -11.5, -3.0]);
    let res = curve.resonance().unwrap();
    assert_eq!((res.freq, res.mag), (2.4, -11.5));

    // apply left the parameters where the solver expects them
    let written = fs::read_to_string(dir.join("params.csv")).unwrap();
    assert_eq!(written, "W,42.5\nL,30\n");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn nonzero_exit_is_a_per_iteration_fault() {
    let dir = exchange("patchsyn_session_exit");
    let mut session =
        CommandSession::connect("sh", &["-c".into(), "exit 3".into()], &dir).unwrap();

    session.apply(&params()).unwrap();
    assert!(matches!(session.run_evaluation(), Err(Error::Solver(_))));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_curve_file_reads_as_none() {
    let dir = exchange("patchsyn_session_none");
    let mut session =
        CommandSession::connect("sh", &["-c".into(), "true".into()], &dir).unwrap();

    session.apply(&params()).unwrap();
    session.run_evaluation().unwrap();
    assert!(session.read_curve().unwrap().is_none());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn stale_curves_are_cleared_before_each_run() {
    let dir = exchange("patchsyn_session_stale");
    let mut session =
        CommandSession::connect("sh", &["-c".into(), "true".into()], &dir).unwrap();

    // Leave a stale curve behind, then run a solver that writes nothing.
    fs::write(dir.join("curve.csv"), "1.0,-2.0\n").unwrap();
    session.apply(&params()).unwrap();
    session.run_evaluation().unwrap();
    assert!(
        session.read_curve().unwrap().is_none(),
        "output of an earlier run must not leak into this one"
    );

    let _ = fs::remove_dir_all(&dir);
}
