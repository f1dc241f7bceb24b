//! E-process behavior: fast decisions, latching, log-space safety.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use peeksafe::{
    ABSpec, Arm, BernoulliMixtureE, DataKind, Side, StreamSpec, TwoSampleMeanMixtureE,
};

fn bernoulli_spec(alpha: f64) -> StreamSpec {
    StreamSpec::bernoulli(alpha).unwrap()
}

#[test]
fn all_ones_decides_quickly_and_latches() {
    let mut e = BernoulliMixtureE::new(bernoulli_spec(0.05), 0.5, Side::Ge).unwrap();
    let mut decided_at = None;
    for t in 1..=50u64 {
        e.update(1.0).unwrap();
        let ev = e.evalue();
        if ev.decision && decided_at.is_none() {
            decided_at = Some(t);
        }
        if let Some(at) = decided_at {
            // Once latched, every later snapshot must keep the decision.
            assert!(ev.decision, "decision retracted after t={at}");
        }
    }
    assert!(decided_at.is_some(), "no decision within 50 steps");
}

#[test]
fn e_starts_at_one() {
    let e = BernoulliMixtureE::new(bernoulli_spec(0.05), 0.5, Side::Two).unwrap();
    let ev = e.evalue();
    assert_eq!(ev.t, 0);
    assert!((ev.e - 1.0).abs() < 1e-12);
    assert!(!ev.decision);
}

#[test]
fn decision_threshold_matches_inverse_alpha() {
    // At alpha = 0.05 the threshold is e >= 20; the snapshot where the
    // decision first appears must carry e at or above it.
    let mut e = BernoulliMixtureE::new(bernoulli_spec(0.05), 0.5, Side::Ge).unwrap();
    loop {
        e.update(1.0).unwrap();
        let ev = e.evalue();
        if ev.decision {
            assert!(ev.e >= 20.0);
            break;
        }
        assert!(ev.t < 100, "decision must arrive well before t = 100");
    }
}

#[test]
fn million_step_bernoulli_stream_is_log_space_safe() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    let mut e = BernoulliMixtureE::new(bernoulli_spec(0.05), 0.5, Side::Ge).unwrap();
    for _ in 0..1_000_000u32 {
        let x = f64::from(u8::from(rng.gen::<f64>() < 0.9));
        e.update(x).unwrap();
    }
    let ev = e.evalue();
    assert!(ev.e.is_finite());
    assert!(ev.e > 0.0);
    assert!(ev.decision);
    assert_eq!(ev.t, 1_000_000);
}

#[test]
fn two_sided_null_rarely_moves() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    let mut e = BernoulliMixtureE::new(bernoulli_spec(0.05), 0.5, Side::Two).unwrap();
    for _ in 0..2000 {
        let x = f64::from(u8::from(rng.gen::<f64>() < 0.5));
        e.update(x).unwrap();
    }
    let ev = e.evalue();
    assert!(!ev.decision, "null stream produced a decision, e = {}", ev.e);
}

#[test]
fn paired_e_detects_lift_and_latches() {
    let spec = ABSpec::new(0.05, DataKind::Bounded, (0.0, 1.0)).unwrap();
    let mut e = TwoSampleMeanMixtureE::new(spec, 0.0, Side::Ge).unwrap();
    let mut decided_at = None;
    for t in 1..=300u64 {
        e.update(Arm::A, 0.1).unwrap();
        e.update(Arm::B, 0.6).unwrap();
        if e.evalue().decision && decided_at.is_none() {
            decided_at = Some(t);
        }
    }
    let at = decided_at.expect("0.5 lift must be detected within 300 pairs");
    assert!(at < 300);
    // Contrary data cannot retract the decision.
    for _ in 0..100 {
        e.update(Arm::A, 0.9).unwrap();
        e.update(Arm::B, 0.1).unwrap();
    }
    assert!(e.evalue().decision);
}

#[test]
fn paired_e_two_sided_fires_on_either_direction() {
    let spec = ABSpec::new(0.05, DataKind::Bounded, (0.0, 1.0)).unwrap();
    let mut negative_lift = TwoSampleMeanMixtureE::new(spec.clone(), 0.0, Side::Two).unwrap();
    let mut positive_lift = TwoSampleMeanMixtureE::new(spec, 0.0, Side::Two).unwrap();
    for _ in 0..300 {
        negative_lift.update(Arm::A, 0.7).unwrap();
        negative_lift.update(Arm::B, 0.2).unwrap();
        positive_lift.update(Arm::A, 0.2).unwrap();
        positive_lift.update(Arm::B, 0.7).unwrap();
    }
    assert!(negative_lift.evalue().decision);
    assert!(positive_lift.evalue().decision);
}

#[test]
fn reset_clears_latch_and_counts() {
    let mut e = BernoulliMixtureE::new(bernoulli_spec(0.05), 0.5, Side::Ge).unwrap();
    for _ in 0..60 {
        e.update(1.0).unwrap();
    }
    assert!(e.evalue().decision);
    e.reset();
    let ev = e.evalue();
    assert_eq!(ev.t, 0);
    assert!(!ev.decision);
    assert!((ev.e - 1.0).abs() < 1e-12);
}
