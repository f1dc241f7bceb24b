//! One-sample confidence sequence scenarios.

use peeksafe::{
    BernoulliMixtureCS, ClipMode, ConfidenceSequence, DataKind, EmpiricalBernsteinCS,
    GuaranteeTier, HoeffdingCS, StreamSpec,
};

fn unit_spec(alpha: f64) -> StreamSpec {
    StreamSpec::new(alpha, DataKind::Bounded, (0.0, 1.0)).unwrap()
}

#[test]
fn hoeffding_constant_half_stream() {
    let mut cs = HoeffdingCS::new(unit_spec(0.05)).unwrap();
    for _ in 0..100 {
        cs.update(0.5).unwrap();
    }
    let iv = cs.interval();
    assert_eq!(iv.t, 100);
    assert!((iv.estimate - 0.5).abs() < 1e-12);
    assert!(iv.lo >= 0.0);
    assert!(iv.hi <= 1.0);
    assert!(iv.width() > 0.0 && iv.width() < 1.0);
    assert_eq!(iv.tier, GuaranteeTier::Guaranteed);
    assert_eq!(iv.diagnostics.method, "hoeffding");
}

#[test]
fn empirical_bernstein_beats_hoeffding_on_degenerate_stream() {
    let mut eb = EmpiricalBernsteinCS::new(unit_spec(0.05)).unwrap();
    let mut hf = HoeffdingCS::new(unit_spec(0.05)).unwrap();
    for _ in 0..100 {
        eb.update(0.5).unwrap();
        hf.update(0.5).unwrap();
    }
    // Zero empirical variance: the variance-adaptive bound must win.
    assert!(eb.interval().width() < hf.interval().width());
}

#[test]
fn bernoulli_mixture_all_ones() {
    let spec = StreamSpec::bernoulli(0.05).unwrap();
    let mut cs = BernoulliMixtureCS::new(spec).unwrap();
    for _ in 0..10 {
        cs.update(1.0).unwrap();
    }
    let iv = cs.interval();
    assert!(iv.lo > 0.0);
    assert_eq!(iv.hi, 1.0);
    assert_eq!(iv.tier, GuaranteeTier::Guaranteed);
}

#[test]
fn error_clip_mode_rejects_third_observation() {
    let mut cs = HoeffdingCS::new(unit_spec(0.05)).unwrap();
    cs.update(0.2).unwrap();
    assert_eq!(cs.interval().tier, GuaranteeTier::Guaranteed);
    cs.update(0.8).unwrap();
    assert_eq!(cs.interval().tier, GuaranteeTier::Guaranteed);

    let err = cs.update(1.5).unwrap_err();
    assert_eq!(err.value, 1.5);
    assert_eq!(err.t, 2);
    assert_eq!(err.method, "hoeffding");
    // The rejected observation was not applied.
    assert_eq!(cs.interval().t, 2);
}

#[test]
fn clip_mode_clamps_third_observation() {
    let spec = unit_spec(0.05).with_clip_mode(ClipMode::Clip);
    let mut cs = HoeffdingCS::new(spec).unwrap();
    cs.update(0.2).unwrap();
    cs.update(0.8).unwrap();
    cs.update(1.5).unwrap();

    let iv = cs.interval();
    assert_eq!(iv.t, 3);
    assert_eq!(iv.tier, GuaranteeTier::Clipped);
    assert_eq!(iv.diagnostics.clipped_count, 1);
    assert_eq!(iv.diagnostics.out_of_range_count, 1);
    // 1.5 was clamped to 1.0 before entering the estimator.
    assert!((iv.estimate - (0.2 + 0.8 + 1.0) / 3.0).abs() < 1e-12);
}

#[test]
fn missing_values_are_skipped_not_counted() {
    let mut cs = EmpiricalBernsteinCS::new(unit_spec(0.05)).unwrap();
    cs.update(0.5).unwrap();
    cs.update(f64::NAN).unwrap();
    cs.update(0.5).unwrap();
    let iv = cs.interval();
    assert_eq!(iv.t, 2);
    assert_eq!(iv.diagnostics.missing_count, 1);
}

#[test]
fn drift_ramp_downgrades_to_diagnostic() {
    let mut cs = EmpiricalBernsteinCS::new(unit_spec(0.05)).unwrap();
    let n = 1000;
    for i in 0..n {
        cs.update(i as f64 / n as f64).unwrap();
    }
    let iv = cs.interval();
    assert!(iv.diagnostics.drift_detected);
    assert_eq!(iv.tier, GuaranteeTier::Diagnostic);
}

#[test]
fn interval_narrows_over_time() {
    let mut cs = HoeffdingCS::new(unit_spec(0.05)).unwrap();
    let mut widths = Vec::new();
    for i in 0..500 {
        cs.update(if i % 2 == 0 { 0.4 } else { 0.6 }).unwrap();
        if i % 100 == 99 {
            widths.push(cs.interval().width());
        }
    }
    for pair in widths.windows(2) {
        assert!(pair[1] < pair[0], "widths must shrink: {widths:?}");
    }
}

#[test]
fn narrower_support_is_respected() {
    let spec = StreamSpec::new(0.05, DataKind::Bounded, (2.0, 5.0)).unwrap();
    let mut cs = EmpiricalBernsteinCS::new(spec).unwrap();
    for i in 0..50 {
        cs.update(3.0 + (i % 3) as f64 * 0.5).unwrap();
    }
    let iv = cs.interval();
    assert!(iv.lo >= 2.0);
    assert!(iv.hi <= 5.0);
    assert!(iv.lo <= iv.estimate && iv.estimate <= iv.hi);
}
