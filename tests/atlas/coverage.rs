//! Anytime coverage and Type I error under optional stopping.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use peeksafe::atlas::{
    one_sample_scenarios, AtlasRunner, EvalueSpec, ExcludeDirection, OneSampleSource, Scenario,
    StoppingRule,
};
use peeksafe::{
    BernoulliMixtureE, DataKind, Method, Side, StreamSpec,
};

fn bernoulli_scenario(p: f64, n_max: u64, seed: u64, is_null: bool) -> Scenario {
    Scenario {
        name: format!("bernoulli_{p}"),
        true_mean: p,
        source: OneSampleSource::Bernoulli { p },
        support: (0.0, 1.0),
        n_max,
        seed,
        is_null,
    }
}

/// Coverage must clear `1 - alpha` minus a Monte-Carlo tolerance; the
/// bounds are conservative, so realized coverage sits well above it.
const COVERAGE_FLOOR: f64 = 0.93;

#[test]
fn hoeffding_anytime_coverage_on_bernoulli_030() {
    let runner = AtlasRunner::new(200);
    let scenario = bernoulli_scenario(0.3, 300, 42, false);
    let spec = StreamSpec::new(0.05, DataKind::Bounded, (0.0, 1.0)).unwrap();
    let m = runner
        .run_one_sample(&scenario, &spec, Method::HoeffdingCS, StoppingRule::FixedHorizon, None)
        .unwrap();
    assert!(m.coverage >= COVERAGE_FLOOR, "coverage = {}", m.coverage);
    assert!(m.final_coverage >= m.coverage);
}

#[test]
fn empirical_bernstein_anytime_coverage_on_bernoulli_030() {
    let runner = AtlasRunner::new(200);
    let scenario = bernoulli_scenario(0.3, 300, 43, false);
    let spec = StreamSpec::new(0.05, DataKind::Bounded, (0.0, 1.0)).unwrap();
    let m = runner
        .run_one_sample(
            &scenario,
            &spec,
            Method::EmpiricalBernsteinCS,
            StoppingRule::FixedHorizon,
            None,
        )
        .unwrap();
    assert!(m.coverage >= COVERAGE_FLOOR, "coverage = {}", m.coverage);
}

#[test]
fn bernoulli_mixture_anytime_coverage_on_bernoulli_030() {
    let runner = AtlasRunner::new(100);
    let scenario = bernoulli_scenario(0.3, 200, 44, false);
    let spec = StreamSpec::bernoulli(0.05).unwrap();
    let m = runner
        .run_one_sample(
            &scenario,
            &spec,
            Method::BernoulliMixtureCS,
            StoppingRule::FixedHorizon,
            None,
        )
        .unwrap();
    assert!(m.coverage >= COVERAGE_FLOOR, "coverage = {}", m.coverage);
}

#[test]
fn coverage_holds_under_stop_when_excluded() {
    // Optional stopping must not break coverage; this is the point of the
    // time-uniform construction.
    let runner = AtlasRunner::new(200);
    let scenario = bernoulli_scenario(0.3, 300, 45, false);
    let spec = StreamSpec::bernoulli(0.05).unwrap();
    let stopping = StoppingRule::ExcludeThreshold {
        threshold: 0.5,
        direction: ExcludeDirection::Both,
    };
    let m = runner
        .run_one_sample(&scenario, &spec, Method::BernoulliMixtureCS, stopping, None)
        .unwrap();
    assert!(m.coverage >= COVERAGE_FLOOR, "coverage = {}", m.coverage);
}

#[test]
fn cs_type_i_error_is_controlled_on_null() {
    // Null scenario: stopping when the interval excludes the true value is
    // exactly a false rejection.
    let runner = AtlasRunner::new(300);
    let scenario = bernoulli_scenario(0.5, 300, 46, true);
    let spec = StreamSpec::bernoulli(0.05).unwrap();
    let stopping = StoppingRule::ExcludeThreshold {
        threshold: 0.5,
        direction: ExcludeDirection::Both,
    };
    let m = runner
        .run_one_sample(&scenario, &spec, Method::BernoulliMixtureCS, stopping, None)
        .unwrap();
    assert!(m.type_i_error <= 0.08, "type I = {}", m.type_i_error);
}

#[test]
fn evalue_type_i_error_is_controlled_on_null() {
    // Anytime Type I for the e-process: fraction of null replicates that
    // ever latch a decision stays near alpha.
    let n_sim = 400u64;
    let n_max = 500u64;
    let mut latched = 0u64;
    for rep in 0..n_sim {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1000 + rep);
        let mut e =
            BernoulliMixtureE::new(StreamSpec::bernoulli(0.05).unwrap(), 0.5, Side::Two).unwrap();
        for _ in 0..n_max {
            let x = f64::from(u8::from(rng.gen::<f64>() < 0.5));
            e.update(x).unwrap();
            if e.evalue().decision {
                latched += 1;
                break;
            }
        }
    }
    let rate = latched as f64 / n_sim as f64;
    assert!(rate <= 0.08, "anytime type I = {rate}");
}

#[test]
fn evalue_power_under_alternative() {
    let runner = AtlasRunner::new(100);
    let scenario = bernoulli_scenario(0.8, 300, 47, false);
    let spec = StreamSpec::bernoulli(0.05).unwrap();
    let m = runner
        .run_one_sample(
            &scenario,
            &spec,
            Method::BernoulliMixtureCS,
            StoppingRule::FixedHorizon,
            Some(EvalueSpec {
                p0: 0.5,
                side: Side::Ge,
            }),
        )
        .unwrap();
    assert!(m.evalue_decision_rate >= 0.95, "rate = {}", m.evalue_decision_rate);
}

#[test]
fn periodic_looks_behave_like_sparser_exclusion() {
    let runner = AtlasRunner::new(100);
    let scenario = bernoulli_scenario(0.8, 300, 48, false);
    let spec = StreamSpec::bernoulli(0.05).unwrap();
    let every_step = StoppingRule::ExcludeThreshold {
        threshold: 0.5,
        direction: ExcludeDirection::Both,
    };
    let periodic = StoppingRule::PeriodicLook {
        every: 50,
        threshold: 0.5,
        direction: ExcludeDirection::Both,
    };
    let m_every = runner
        .run_one_sample(&scenario, &spec, Method::BernoulliMixtureCS, every_step, None)
        .unwrap();
    let m_periodic = runner
        .run_one_sample(&scenario, &spec, Method::BernoulliMixtureCS, periodic, None)
        .unwrap();
    assert!(m_every.power >= 0.95);
    assert!(m_periodic.power >= 0.95);
    // Looking less often can only delay the stop.
    assert!(m_periodic.median_stop_time >= m_every.median_stop_time);
}

/// Full-scale catalog sweep at the contractual replicate count. Slow; run
/// with `cargo test --release -- --ignored`.
#[test]
#[ignore]
fn full_catalog_one_sample_sweep() {
    let runner = AtlasRunner::new(1000);
    let spec_bounded = StreamSpec::new(0.05, DataKind::Bounded, (0.0, 1.0)).unwrap();
    for scenario in one_sample_scenarios(500) {
        for method in [Method::HoeffdingCS, Method::EmpiricalBernsteinCS] {
            let m = runner
                .run_one_sample(&scenario, &spec_bounded, method, StoppingRule::FixedHorizon, None)
                .unwrap();
            // The drift scenario violates the i.i.d. assumption; coverage
            // is only contractual for the stationary scenarios.
            if scenario.name != "drift_ramp" {
                assert!(
                    m.coverage >= 0.95 - 0.02,
                    "{} / {:?}: coverage = {}",
                    scenario.name,
                    method,
                    m.coverage
                );
            }
        }
    }
}
