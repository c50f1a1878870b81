//! Resonance extraction semantics.

use patchsyn::curve::Curve;

#[test]
fn unique_minimum_is_returned_exactly() {
    let c = Curve {
        freq: vec![1.0, 1.5, 2.0, 2.5, 3.0],
        mag: vec![-2.0, -4.0, -18.5, -6.0, -1.0],
    };
    let r = c.resonance().unwrap();
    assert_eq!(r.freq, 2.0);
    assert_eq!(r.mag, -18.5);
}

#[test]
fn ties_resolve_to_the_first_occurrence() {
    let c = Curve {
        freq: vec![1.0, 2.0, 3.0, 4.0],
        mag: vec![-3.0, -7.0, -7.0, -2.0],
    };
    let r = c.resonance().unwrap();
    assert_eq!(r.freq, 2.0, "tie must keep the lowest-index point");
    assert_eq!(r.mag, -7.0);
}

#[test]
fn empty_curve_has_no_resonance() {
    let c = Curve { freq: vec![], mag: vec![] };
    assert!(c.resonance().is_none());
}

#[test]
fn single_point_curve_is_its_own_minimum() {
    let c = Curve { freq: vec![2.4], mag: vec![-9.0] };
    let r = c.resonance().unwrap();
    assert_eq!((r.freq, r.mag), (2.4, -9.0));
}
