use super::*;

const ALL: [Ease; 7] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
];

fn samples() -> impl Iterator<Item = f64> {
    (0..=1000).map(|i| f64::from(i) / 1000.0)
}

#[test]
fn endpoints_are_fixed() {
    for ease in ALL {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ease:?}");
    }
}

#[test]
fn output_stays_in_unit_interval() {
    for ease in ALL {
        for t in samples() {
            let v = ease.apply(t);
            assert!((0.0..=1.0).contains(&v), "{ease:?}({t}) = {v}");
        }
    }
}

#[test]
fn in_out_cubic_matches_closed_form() {
    let e = Ease::InOutCubic;
    assert_eq!(e.apply(0.5), 0.5);
    assert!((e.apply(0.25) - 0.0625).abs() < 1e-12);
    assert!((e.apply(0.75) - 0.9375).abs() < 1e-12);
}

#[test]
fn in_out_curves_are_point_symmetric() {
    for ease in [Ease::Linear, Ease::InOutQuad, Ease::InOutCubic] {
        for t in samples() {
            let lhs = ease.apply(1.0 - t);
            let rhs = 1.0 - ease.apply(t);
            assert!((lhs - rhs).abs() < 1e-12, "{ease:?} at {t}");
        }
    }
}

#[test]
fn in_out_cubic_is_monotonic() {
    let mut prev = 0.0;
    for t in samples() {
        let v = Ease::InOutCubic.apply(t);
        assert!(v >= prev);
        prev = v;
    }
}

#[test]
fn out_of_range_input_is_clamped() {
    assert_eq!(Ease::InOutCubic.apply(-3.0), 0.0);
    assert_eq!(Ease::InOutCubic.apply(7.0), 1.0);
}

#[test]
fn serde_names_are_snake_case() {
    let s = serde_json::to_string(&Ease::InOutCubic).unwrap();
    assert_eq!(s, "\"in_out_cubic\"");
    let e: Ease = serde_json::from_str("\"out_quad\"").unwrap();
    assert_eq!(e, Ease::OutQuad);
}
