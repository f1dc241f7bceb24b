//! Property-based invariants over arbitrary in-range streams.

use proptest::prelude::*;

use peeksafe::{
    BernoulliMixtureCS, ClipMode, ConfidenceSequence, DataKind, EmpiricalBernsteinCS,
    GuaranteeTier, HoeffdingCS, OnlineVariance, StreamSpec, TwoSampleHoeffdingCS,
};
use peeksafe::{ABSpec, Arm};

fn unit_spec(alpha: f64) -> StreamSpec {
    StreamSpec::new(alpha, DataKind::Bounded, (0.0, 1.0)).unwrap()
}

fn tier_rank(tier: GuaranteeTier) -> u8 {
    match tier {
        GuaranteeTier::Guaranteed => 2,
        GuaranteeTier::Clipped => 1,
        GuaranteeTier::Diagnostic => 0,
    }
}

fn assert_endpoint_invariants(iv: &peeksafe::Interval, a: f64, b: f64) {
    assert!(iv.lo.is_finite() && iv.hi.is_finite() && iv.estimate.is_finite());
    assert!(iv.lo >= a - 1e-12, "lo {} below support", iv.lo);
    assert!(iv.hi <= b + 1e-12, "hi {} above support", iv.hi);
    assert!(iv.lo <= iv.estimate + 1e-12);
    assert!(iv.estimate <= iv.hi + 1e-12);
    assert!(iv.width() >= -1e-12);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn hoeffding_endpoints_always_ordered(data in prop::collection::vec(0.0..=1.0f64, 1..120)) {
        let mut cs = HoeffdingCS::new(unit_spec(0.05)).unwrap();
        for &x in &data {
            cs.update(x).unwrap();
            assert_endpoint_invariants(&cs.interval(), 0.0, 1.0);
        }
    }

    #[test]
    fn empirical_bernstein_endpoints_always_ordered(data in prop::collection::vec(0.0..=1.0f64, 1..120)) {
        let mut cs = EmpiricalBernsteinCS::new(unit_spec(0.05)).unwrap();
        for &x in &data {
            cs.update(x).unwrap();
            assert_endpoint_invariants(&cs.interval(), 0.0, 1.0);
        }
    }

    #[test]
    fn bernoulli_mixture_endpoints_always_ordered(data in prop::collection::vec(prop::bool::ANY, 1..120)) {
        let mut cs = BernoulliMixtureCS::new(StreamSpec::bernoulli(0.05).unwrap()).unwrap();
        for &bit in &data {
            cs.update(f64::from(u8::from(bit))).unwrap();
            assert_endpoint_invariants(&cs.interval(), 0.0, 1.0);
        }
    }

    #[test]
    fn width_is_monotone_in_alpha(
        data in prop::collection::vec(0.0..=1.0f64, 2..100),
        alpha_lo in 0.01..0.15f64,
        alpha_gap in 0.05..0.5f64,
    ) {
        let alpha_hi = (alpha_lo + alpha_gap).min(0.9);
        let mut strict = EmpiricalBernsteinCS::new(unit_spec(alpha_lo)).unwrap();
        let mut loose = EmpiricalBernsteinCS::new(unit_spec(alpha_hi)).unwrap();
        for &x in &data {
            strict.update(x).unwrap();
            loose.update(x).unwrap();
        }
        // Smaller alpha means more confidence, so a wider (or equal) band.
        prop_assert!(strict.interval().width() >= loose.interval().width() - 1e-12);
    }

    #[test]
    fn online_matches_two_pass_batch(data in prop::collection::vec(-1e3..1e3f64, 2..200)) {
        let mut online = OnlineVariance::new();
        for &x in &data {
            online.update(x);
        }
        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let var = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);

        let mean_scale = mean.abs().max(1.0);
        prop_assert!((online.mean() - mean).abs() / mean_scale < 1e-8);
        let var_scale = var.abs().max(1.0);
        prop_assert!((online.variance() - var).abs() / var_scale < 1e-8);
    }

    #[test]
    fn arm_swap_symmetry(stream in prop::collection::vec((prop::bool::ANY, 0.0..=1.0f64), 2..150)) {
        let spec = ABSpec::new(0.05, DataKind::Bounded, (0.0, 1.0)).unwrap();
        let mut fwd = TwoSampleHoeffdingCS::new(spec.clone()).unwrap();
        let mut rev = TwoSampleHoeffdingCS::new(spec).unwrap();
        for &(is_b, x) in &stream {
            let arm = if is_b { Arm::B } else { Arm::A };
            fwd.update(arm, x).unwrap();
            rev.update(arm.other(), x).unwrap();
        }
        let f = fwd.interval();
        let r = rev.interval();
        prop_assert!((f.estimate + r.estimate).abs() < 1e-9);
        prop_assert!((f.lo + r.hi).abs() < 1e-9);
        prop_assert!((f.hi + r.lo).abs() < 1e-9);
        prop_assert_eq!(f.tier, r.tier);
        prop_assert!((f.width() - r.width()).abs() < 1e-9);
    }

    #[test]
    fn tier_never_upgrades_within_an_epoch(
        raw in prop::collection::vec(-0.5..=1.5f64, 1..150),
    ) {
        // Values outside [0, 1] get clipped; tier may only walk downward.
        let spec = unit_spec(0.05).with_clip_mode(ClipMode::Clip);
        let mut cs = HoeffdingCS::new(spec).unwrap();
        let mut prev = tier_rank(cs.interval().tier);
        for &x in &raw {
            cs.update(x).unwrap();
            let cur = tier_rank(cs.interval().tier);
            prop_assert!(cur <= prev, "tier upgraded from {prev} to {cur}");
            prev = cur;
        }
        // A new epoch restores the full guarantee.
        cs.reset();
        prop_assert_eq!(cs.interval().tier, GuaranteeTier::Guaranteed);
    }
}
