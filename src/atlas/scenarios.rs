//! Scenario catalog, seeded data generators, and stopping rules.
//!
//! Scenarios cover the regimes the methods claim to handle (Bernoulli at
//! several rates, low-variance and high-variance bounded continuous,
//! bimodal mixtures) plus the pathologies the diagnostics layer exists for
//! (drift ramps). Null scenarios back the Type I checks.

use rand::{Rng, SeedableRng};
use rand_distr::{Beta as BetaDist, Distribution};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::spec::Arm;
use crate::types::Interval;

/// One-sample data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OneSampleSource {
    /// I.i.d. Bernoulli at rate `p`.
    Bernoulli {
        /// Success rate in [0, 1].
        p: f64,
    },
    /// I.i.d. uniform over the scenario support.
    Uniform,
    /// I.i.d. Beta, scaled to the unit interval.
    Beta {
        /// Shape `alpha > 0`.
        alpha: f64,
        /// Shape `beta > 0`.
        beta: f64,
    },
    /// Two Beta clusters mixed by weight; stresses variance adaptivity.
    BimodalBeta {
        /// Mean of the first cluster, in (0, 1).
        mu1: f64,
        /// Mean of the second cluster, in (0, 1).
        mu2: f64,
        /// Probability of drawing from the first cluster.
        w1: f64,
        /// Beta concentration; higher is tighter clusters.
        concentration: f64,
    },
    /// Bernoulli with the rate ramping linearly from `p_start` to `p_end`
    /// over the stream; exercises the drift gate.
    DriftRampBernoulli {
        /// Rate at the first observation.
        p_start: f64,
        /// Rate at the last observation.
        p_end: f64,
    },
}

/// Two-sample data source. `ratio_a = 0.5` alternates arms
/// deterministically; any other ratio assigns arms at random.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TwoSampleSource {
    /// Bernoulli arms at rates `p_a`, `p_b`.
    Bernoulli {
        /// Arm A success rate.
        p_a: f64,
        /// Arm B success rate.
        p_b: f64,
        /// Fraction of observations assigned to arm A.
        ratio_a: f64,
    },
    /// Beta arms parameterized by mean and concentration; unequal
    /// concentrations give heteroscedastic arms.
    Beta {
        /// Arm A mean, in (0, 1).
        mean_a: f64,
        /// Arm B mean, in (0, 1).
        mean_b: f64,
        /// Arm A concentration.
        concentration_a: f64,
        /// Arm B concentration.
        concentration_b: f64,
        /// Fraction of observations assigned to arm A.
        ratio_a: f64,
    },
}

/// A one-sample benchmark scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name, stable across runs; keys the report tables.
    pub name: String,
    /// True stream mean, used for coverage accounting.
    pub true_mean: f64,
    /// Data source.
    pub source: OneSampleSource,
    /// Support the spec under test should declare.
    pub support: (f64, f64),
    /// Maximum horizon per replicate.
    pub n_max: u64,
    /// Base seed; replicate `i` uses `seed + i`.
    pub seed: u64,
    /// Whether this scenario represents a true null (for Type I).
    pub is_null: bool,
}

/// A two-sample benchmark scenario. The governing parameter is the lift
/// `delta = mu_B - mu_A`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ABScenario {
    /// Scenario name.
    pub name: String,
    /// True lift.
    pub true_lift: f64,
    /// Data source.
    pub source: TwoSampleSource,
    /// Support the spec under test should declare.
    pub support: (f64, f64),
    /// Maximum total observations per replicate (both arms).
    pub n_max: u64,
    /// Base seed; replicate `i` uses `seed + i`.
    pub seed: u64,
    /// Whether this scenario represents a true null.
    pub is_null: bool,
}

fn validate_probability(p: f64, name: &str) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigError::Invalid {
            message: format!("{name} must be in [0, 1], got {p}"),
        });
    }
    Ok(())
}

/// Convert a mean/concentration pair into Beta shape parameters.
fn beta_params_from_mean(mean: f64, concentration: f64) -> Result<(f64, f64), ConfigError> {
    if !(mean > 0.0 && mean < 1.0) {
        return Err(ConfigError::Invalid {
            message: format!("beta mean must be in (0, 1), got {mean}"),
        });
    }
    if concentration <= 0.0 {
        return Err(ConfigError::Invalid {
            message: format!("beta concentration must be positive, got {concentration}"),
        });
    }
    Ok((mean * concentration, (1.0 - mean) * concentration))
}

fn beta_dist(alpha: f64, beta: f64) -> Result<BetaDist<f64>, ConfigError> {
    BetaDist::new(alpha, beta).map_err(|e| ConfigError::Invalid {
        message: format!("invalid beta parameters ({alpha}, {beta}): {e}"),
    })
}

impl Scenario {
    /// Generate one replicate of `n` observations. Replicate `offset`
    /// shifts the seed so Monte-Carlo draws are independent but
    /// reproducible.
    pub fn generate(&self, n: u64, offset: u64) -> Result<Vec<f64>, ConfigError> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed + offset);
        let (a, b) = self.support;
        match &self.source {
            OneSampleSource::Bernoulli { p } => {
                validate_probability(*p, "p")?;
                Ok((0..n)
                    .map(|_| f64::from(u8::from(rng.gen::<f64>() < *p)))
                    .collect())
            }
            OneSampleSource::Uniform => {
                Ok((0..n).map(|_| a + (b - a) * rng.gen::<f64>()).collect())
            }
            OneSampleSource::Beta { alpha, beta } => {
                let dist = beta_dist(*alpha, *beta)?;
                Ok((0..n).map(|_| dist.sample(&mut rng)).collect())
            }
            OneSampleSource::BimodalBeta {
                mu1,
                mu2,
                w1,
                concentration,
            } => {
                validate_probability(*w1, "w1")?;
                let (a1, b1) = beta_params_from_mean(*mu1, *concentration)?;
                let (a2, b2) = beta_params_from_mean(*mu2, *concentration)?;
                let d1 = beta_dist(a1, b1)?;
                let d2 = beta_dist(a2, b2)?;
                Ok((0..n)
                    .map(|_| {
                        if rng.gen::<f64>() < *w1 {
                            d1.sample(&mut rng)
                        } else {
                            d2.sample(&mut rng)
                        }
                    })
                    .collect())
            }
            OneSampleSource::DriftRampBernoulli { p_start, p_end } => {
                validate_probability(*p_start, "p_start")?;
                validate_probability(*p_end, "p_end")?;
                Ok((0..n)
                    .map(|i| {
                        let frac = i as f64 / (n.max(2) - 1) as f64;
                        let p = p_start + frac * (p_end - p_start);
                        f64::from(u8::from(rng.gen::<f64>() < p))
                    })
                    .collect())
            }
        }
    }
}

impl ABScenario {
    /// Generate one replicate of `n` tagged observations.
    pub fn generate(&self, n: u64, offset: u64) -> Result<Vec<(Arm, f64)>, ConfigError> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed + offset);
        match &self.source {
            TwoSampleSource::Bernoulli { p_a, p_b, ratio_a } => {
                validate_probability(*p_a, "p_a")?;
                validate_probability(*p_b, "p_b")?;
                validate_probability(*ratio_a, "ratio_a")?;
                Ok((0..n)
                    .map(|i| {
                        let arm = pick_arm(&mut rng, *ratio_a, i);
                        let p = match arm {
                            Arm::A => *p_a,
                            Arm::B => *p_b,
                        };
                        (arm, f64::from(u8::from(rng.gen::<f64>() < p)))
                    })
                    .collect())
            }
            TwoSampleSource::Beta {
                mean_a,
                mean_b,
                concentration_a,
                concentration_b,
                ratio_a,
            } => {
                validate_probability(*ratio_a, "ratio_a")?;
                let (aa, ab) = beta_params_from_mean(*mean_a, *concentration_a)?;
                let (ba, bb) = beta_params_from_mean(*mean_b, *concentration_b)?;
                let dist_a = beta_dist(aa, ab)?;
                let dist_b = beta_dist(ba, bb)?;
                Ok((0..n)
                    .map(|i| {
                        let arm = pick_arm(&mut rng, *ratio_a, i);
                        let x = match arm {
                            Arm::A => dist_a.sample(&mut rng),
                            Arm::B => dist_b.sample(&mut rng),
                        };
                        (arm, x)
                    })
                    .collect())
            }
        }
    }
}

fn pick_arm(rng: &mut Xoshiro256PlusPlus, ratio_a: f64, i: u64) -> Arm {
    if (ratio_a - 0.5).abs() < f64::EPSILON {
        if i % 2 == 0 {
            Arm::A
        } else {
            Arm::B
        }
    } else if rng.gen::<f64>() < ratio_a {
        Arm::A
    } else {
        Arm::B
    }
}

/// When a stopping rule fires relative to the excluded threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcludeDirection {
    /// Stop when `lo > threshold`.
    Lower,
    /// Stop when `hi < threshold`.
    Upper,
    /// Stop when the interval excludes the threshold on either side.
    Both,
}

/// Stopping rules the atlas exercises. The methods' guarantees must hold
/// under any of them; that is the point of anytime validity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StoppingRule {
    /// Run to the horizon; never stop early.
    FixedHorizon,
    /// Stop as soon as the interval excludes `threshold`.
    ExcludeThreshold {
        /// Parameter value to exclude (0 for a lift null).
        threshold: f64,
        /// Which exclusion counts.
        direction: ExcludeDirection,
    },
    /// Check the exclusion only every `every` observations.
    PeriodicLook {
        /// Look cadence.
        every: u64,
        /// Parameter value to exclude.
        threshold: f64,
        /// Which exclusion counts.
        direction: ExcludeDirection,
    },
}

impl StoppingRule {
    /// Whether to stop after the `t`-th observation given the current
    /// interval.
    pub fn should_stop(&self, interval: &Interval, t: u64) -> bool {
        match *self {
            Self::FixedHorizon => false,
            Self::ExcludeThreshold {
                threshold,
                direction,
            } => excludes(interval, threshold, direction),
            Self::PeriodicLook {
                every,
                threshold,
                direction,
            } => every > 0 && t % every == 0 && excludes(interval, threshold, direction),
        }
    }
}

fn excludes(interval: &Interval, threshold: f64, direction: ExcludeDirection) -> bool {
    match direction {
        ExcludeDirection::Lower => interval.lo > threshold,
        ExcludeDirection::Upper => interval.hi < threshold,
        ExcludeDirection::Both => interval.lo > threshold || interval.hi < threshold,
    }
}

/// The standard one-sample scenario catalog.
pub fn one_sample_scenarios(n_max: u64) -> Vec<Scenario> {
    vec![
        Scenario {
            name: "bernoulli_030".into(),
            true_mean: 0.3,
            source: OneSampleSource::Bernoulli { p: 0.3 },
            support: (0.0, 1.0),
            n_max,
            seed: 42,
            is_null: false,
        },
        Scenario {
            name: "bernoulli_rare_002".into(),
            true_mean: 0.02,
            source: OneSampleSource::Bernoulli { p: 0.02 },
            support: (0.0, 1.0),
            n_max,
            seed: 43,
            is_null: false,
        },
        Scenario {
            name: "bernoulli_balanced_050".into(),
            true_mean: 0.5,
            source: OneSampleSource::Bernoulli { p: 0.5 },
            support: (0.0, 1.0),
            n_max,
            seed: 44,
            is_null: false,
        },
        Scenario {
            name: "beta_2_8_low_variance".into(),
            true_mean: 0.2,
            source: OneSampleSource::Beta {
                alpha: 2.0,
                beta: 8.0,
            },
            support: (0.0, 1.0),
            n_max,
            seed: 45,
            is_null: false,
        },
        Scenario {
            name: "uniform_high_variance".into(),
            true_mean: 0.5,
            source: OneSampleSource::Uniform,
            support: (0.0, 1.0),
            n_max,
            seed: 46,
            is_null: false,
        },
        Scenario {
            name: "bimodal_mixture".into(),
            true_mean: 0.26,
            source: OneSampleSource::BimodalBeta {
                mu1: 0.2,
                mu2: 0.8,
                w1: 0.9,
                concentration: 50.0,
            },
            support: (0.0, 1.0),
            n_max,
            seed: 47,
            is_null: false,
        },
        Scenario {
            name: "drift_ramp".into(),
            true_mean: 0.15,
            source: OneSampleSource::DriftRampBernoulli {
                p_start: 0.1,
                p_end: 0.2,
            },
            support: (0.0, 1.0),
            n_max,
            seed: 48,
            is_null: false,
        },
        Scenario {
            name: "bernoulli_null_050".into(),
            true_mean: 0.5,
            source: OneSampleSource::Bernoulli { p: 0.5 },
            support: (0.0, 1.0),
            n_max,
            seed: 49,
            is_null: true,
        },
    ]
}

/// The standard two-sample scenario catalog.
pub fn two_sample_scenarios(n_max: u64) -> Vec<ABScenario> {
    vec![
        ABScenario {
            name: "ab_bernoulli_10_vs_11".into(),
            true_lift: 0.01,
            source: TwoSampleSource::Bernoulli {
                p_a: 0.10,
                p_b: 0.11,
                ratio_a: 0.5,
            },
            support: (0.0, 1.0),
            n_max,
            seed: 42,
            is_null: false,
        },
        ABScenario {
            name: "ab_bernoulli_null".into(),
            true_lift: 0.0,
            source: TwoSampleSource::Bernoulli {
                p_a: 0.10,
                p_b: 0.10,
                ratio_a: 0.5,
            },
            support: (0.0, 1.0),
            n_max,
            seed: 43,
            is_null: true,
        },
        ABScenario {
            name: "ab_beta_continuous".into(),
            true_lift: 0.01,
            source: TwoSampleSource::Beta {
                mean_a: 0.205,
                mean_b: 0.215,
                concentration_a: 10.0,
                concentration_b: 10.0,
                ratio_a: 0.5,
            },
            support: (0.0, 1.0),
            n_max,
            seed: 44,
            is_null: false,
        },
        ABScenario {
            name: "ab_heteroscedastic".into(),
            true_lift: 0.0,
            source: TwoSampleSource::Beta {
                mean_a: 0.5,
                mean_b: 0.5,
                concentration_a: 40.0,
                concentration_b: 8.0,
                ratio_a: 0.5,
            },
            support: (0.0, 1.0),
            n_max,
            seed: 45,
            is_null: true,
        },
        ABScenario {
            name: "ab_small_effect".into(),
            true_lift: 0.002,
            source: TwoSampleSource::Bernoulli {
                p_a: 0.249,
                p_b: 0.251,
                ratio_a: 0.5,
            },
            support: (0.0, 1.0),
            n_max,
            seed: 46,
            is_null: false,
        },
        ABScenario {
            name: "ab_strong_effect".into(),
            true_lift: 0.05,
            source: TwoSampleSource::Bernoulli {
                p_a: 0.25,
                p_b: 0.30,
                ratio_a: 0.5,
            },
            support: (0.0, 1.0),
            n_max,
            seed: 47,
            is_null: false,
        },
        ABScenario {
            name: "ab_imbalanced_70_30".into(),
            true_lift: 0.01,
            source: TwoSampleSource::Bernoulli {
                p_a: 0.195,
                p_b: 0.205,
                ratio_a: 0.7,
            },
            support: (0.0, 1.0),
            n_max,
            seed: 48,
            is_null: false,
        },
        ABScenario {
            name: "ab_bernoulli_null_ev".into(),
            true_lift: 0.0,
            source: TwoSampleSource::Bernoulli {
                p_a: 0.25,
                p_b: 0.25,
                ratio_a: 0.5,
            },
            support: (0.0, 1.0),
            n_max,
            seed: 49,
            is_null: true,
        },
    ]
}
