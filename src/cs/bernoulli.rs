//! Beta-binomial mixture confidence sequence for Bernoulli streams.
//!
//! Inverts a mixture martingale: with a Jeffreys `Beta(1/2, 1/2)` prior
//! over the rate, the set of `p` whose mixture likelihood ratio has not
//! crossed `1/alpha` is a time-uniform confidence sequence. On genuinely
//! binary data this is strictly tighter than both Hoeffding and empirical
//! Bernstein.
//!
//! Endpoints are found by bisection on the log likelihood-ratio statistic,
//! which is decreasing below the sample rate and increasing above it.

use statrs::function::beta::ln_beta;

use crate::cs::{side_adjusted_alpha, ConfidenceSequence};
use crate::diagnostics::StreamGuard;
use crate::error::{AssumptionViolationError, ConfigError};
use crate::estimators::OnlineMean;
use crate::spec::{DataKind, StreamSpec};
use crate::types::Interval;

const METHOD: &str = "bernoulli_mixture";

/// Jeffreys prior parameters for the beta mixture.
const PRIOR_A: f64 = 0.5;
const PRIOR_B: f64 = 0.5;

/// Bracketing epsilon for the bisection; endpoints inside `[eps, 1 - eps]`.
const ROOT_EPS: f64 = 1e-12;

const BISECT_ITERS: u32 = 80;

/// Exact-support confidence sequence for 0/1 data.
#[derive(Debug, Clone)]
pub struct BernoulliMixtureCS {
    spec: StreamSpec,
    estimator: OnlineMean,
    successes: f64,
    guard: StreamGuard,
}

impl BernoulliMixtureCS {
    /// Construct over a Bernoulli spec.
    ///
    /// # Errors
    ///
    /// [`ConfigError::KindMismatch`] unless `spec.kind` is `Bernoulli`.
    pub fn new(spec: StreamSpec) -> Result<Self, ConfigError> {
        if spec.kind != DataKind::Bernoulli {
            return Err(ConfigError::KindMismatch {
                method: METHOD,
                detail: format!("requires kind = bernoulli, got {}", spec.kind),
            });
        }
        let guard = StreamGuard::new(spec.support, spec.clip_mode, METHOD);
        Ok(Self {
            spec,
            estimator: OnlineMean::new(),
            successes: 0.0,
            guard,
        })
    }

    /// Log mixture likelihood ratio against `Bernoulli(p)` after `s`
    /// successes and `f` failures.
    fn log_stat(&self, p: f64) -> f64 {
        let s = self.successes;
        let f = self.estimator.n() as f64 - s;
        ln_beta(s + PRIOR_A, f + PRIOR_B) - ln_beta(PRIOR_A, PRIOR_B)
            - s * p.ln()
            - f * (-p).ln_1p()
    }

    fn lower_root(&self, target: f64, mean: f64) -> f64 {
        if mean <= ROOT_EPS {
            return 0.0;
        }
        let left = ROOT_EPS;
        let right = mean.min(1.0 - ROOT_EPS);
        // Statistic is decreasing in p below the sample rate.
        if self.log_stat(left) - target <= 0.0 {
            return 0.0;
        }
        if self.log_stat(right) - target >= 0.0 {
            return right;
        }
        bisect(|p| self.log_stat(p) - target, left, right)
    }

    fn upper_root(&self, target: f64, mean: f64) -> f64 {
        if mean >= 1.0 - ROOT_EPS {
            return 1.0;
        }
        let left = mean.max(ROOT_EPS);
        let right = 1.0 - ROOT_EPS;
        // Statistic is increasing in p above the sample rate.
        if self.log_stat(right) - target <= 0.0 {
            return 1.0;
        }
        if self.log_stat(left) - target >= 0.0 {
            return left;
        }
        bisect(|p| self.log_stat(p) - target, left, right)
    }
}

/// Bisection on a monotone bracket with a sign change.
fn bisect<F: Fn(f64) -> f64>(f: F, mut lo: f64, mut hi: f64) -> f64 {
    let sign_lo = f(lo) > 0.0;
    for _ in 0..BISECT_ITERS {
        let mid = 0.5 * (lo + hi);
        if (f(mid) > 0.0) == sign_lo {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

impl ConfidenceSequence for BernoulliMixtureCS {
    fn from_spec(spec: StreamSpec) -> Result<Self, ConfigError> {
        Self::new(spec)
    }

    fn update(&mut self, x: f64) -> Result<(), AssumptionViolationError> {
        let Some(x) = self.guard.admit_bernoulli(x)? else {
            return Ok(());
        };
        self.successes += x;
        self.estimator.update(x);
        Ok(())
    }

    fn interval(&self) -> Interval {
        let t = self.estimator.n();
        if t == 0 {
            return Interval {
                t: 0,
                estimate: 0.5,
                lo: 0.0,
                hi: 1.0,
                tier: self.guard.tier(),
                alpha: self.spec.alpha,
                diagnostics: self.guard.snapshot(),
            };
        }

        let mean = self.estimator.mean();
        let target = (1.0 / side_adjusted_alpha(&self.spec)).ln();

        let s = self.successes;
        let lo = if s == 0.0 {
            0.0
        } else {
            self.lower_root(target, mean)
        };
        let hi = if self.spec.two_sided {
            if s == t as f64 {
                1.0
            } else {
                self.upper_root(target, mean)
            }
        } else {
            1.0
        };

        Interval {
            t,
            estimate: mean,
            lo: lo.clamp(0.0, 1.0),
            hi: hi.clamp(0.0, 1.0),
            tier: self.guard.tier(),
            alpha: self.spec.alpha,
            diagnostics: self.guard.snapshot(),
        }
    }

    fn reset(&mut self) {
        self.estimator.reset();
        self.successes = 0.0;
        self.guard.reset();
    }

    fn method(&self) -> &'static str {
        METHOD
    }
}
