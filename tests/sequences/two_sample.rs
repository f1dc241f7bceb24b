//! Two-sample confidence sequence scenarios.

use peeksafe::{
    ABSpec, Arm, DataKind, GuaranteeTier, TwoSampleEmpiricalBernsteinCS, TwoSampleHoeffdingCS,
};

fn unit_spec() -> ABSpec {
    ABSpec::new(0.05, DataKind::Bounded, (0.0, 1.0)).unwrap()
}

#[test]
fn separated_arms_eventually_exclude_zero() {
    let mut cs = TwoSampleEmpiricalBernsteinCS::new(unit_spec()).unwrap();
    let mut excluded_at = None;
    for i in 0..200 {
        cs.update(Arm::A, 0.1).unwrap();
        cs.update(Arm::B, 0.6).unwrap();
        if excluded_at.is_none() && cs.interval().lo > 0.0 {
            excluded_at = Some(i + 1);
        }
    }
    let iv = cs.interval();
    assert!((iv.estimate - 0.5).abs() < 1e-9);
    assert!(iv.lo > 0.0, "lo = {}", iv.lo);
    assert_eq!(iv.tier, GuaranteeTier::Guaranteed);
    assert!(
        excluded_at.is_some(),
        "a 0.5 lift must be detected within 200 pairs"
    );
}

#[test]
fn arm_swap_symmetry_on_mixed_stream() {
    let stream: Vec<(Arm, f64)> = (0..300)
        .map(|i| {
            let arm = if i % 2 == 0 { Arm::A } else { Arm::B };
            let x = match arm {
                Arm::A => 0.2 + 0.01 * (i % 7) as f64,
                Arm::B => 0.5 + 0.01 * (i % 5) as f64,
            };
            (arm, x)
        })
        .collect();

    let mut fwd = TwoSampleEmpiricalBernsteinCS::new(unit_spec()).unwrap();
    let mut rev = TwoSampleEmpiricalBernsteinCS::new(unit_spec()).unwrap();
    for &(arm, x) in &stream {
        fwd.update(arm, x).unwrap();
        rev.update(arm.other(), x).unwrap();
    }

    let f = fwd.interval();
    let r = rev.interval();
    assert!((f.estimate + r.estimate).abs() < 1e-12);
    assert!((f.lo + r.hi).abs() < 1e-12);
    assert!((f.hi + r.lo).abs() < 1e-12);
    assert_eq!(f.tier, r.tier);
    assert!((f.width() - r.width()).abs() < 1e-12);
}

#[test]
fn empty_arm_is_surfaced_as_diagnostic() {
    let mut cs = TwoSampleHoeffdingCS::new(unit_spec()).unwrap();
    for _ in 0..100 {
        cs.update(Arm::B, 0.7).unwrap();
    }
    let iv = cs.interval();
    assert_eq!(iv.tier, GuaranteeTier::Diagnostic);
    assert_eq!((iv.lo, iv.hi), (-1.0, 1.0));
    assert!(iv
        .diagnostics
        .notes
        .iter()
        .any(|n| n.contains("unidentified")));
}

#[test]
fn tier_is_minimum_of_arms() {
    use peeksafe::ClipMode;
    let spec = unit_spec().with_clip_mode(ClipMode::Clip);
    let mut cs = TwoSampleHoeffdingCS::new(spec).unwrap();
    cs.update(Arm::A, 0.5).unwrap();
    cs.update(Arm::B, 1.5).unwrap(); // clipped on arm B only
    let iv = cs.interval();
    assert_eq!(iv.tier, GuaranteeTier::Clipped);
    assert_eq!(iv.diagnostics.clipped_count, 1);
}

#[test]
fn null_arms_keep_zero_inside() {
    let mut cs = TwoSampleEmpiricalBernsteinCS::new(unit_spec()).unwrap();
    for i in 0..400 {
        let x = 0.3 + 0.05 * (((i / 2) % 4) as f64 - 1.5);
        cs.update(if i % 2 == 0 { Arm::A } else { Arm::B }, x).unwrap();
    }
    let iv = cs.interval();
    assert!(iv.lo <= 0.0 && 0.0 <= iv.hi);
    assert!(iv.estimate.abs() < 1e-12);
}

#[test]
fn interval_t_counts_both_arms() {
    let mut cs = TwoSampleHoeffdingCS::new(unit_spec()).unwrap();
    for _ in 0..30 {
        cs.update(Arm::A, 0.4).unwrap();
    }
    for _ in 0..20 {
        cs.update(Arm::B, 0.6).unwrap();
    }
    assert_eq!(cs.interval().t, 50);
}
