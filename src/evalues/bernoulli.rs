//! One-sample Bernoulli mixture e-process.
//!
//! Tests a null rate `p0` against a `Beta(1/2, 1/2)` mixture alternative.
//! The likelihood ratio of the mixture against `Bernoulli(p0)` is an
//! e-process in closed form: log-Beta function differences, plus
//! regularized incomplete beta tails when the alternative is restricted to
//! one side of `p0`. Updates are O(1).

use statrs::function::beta::{beta_reg, ln_beta};

use crate::diagnostics::StreamGuard;
use crate::error::{AssumptionViolationError, ConfigError};
use crate::estimators::OnlineMean;
use crate::evalues::{clamped_exp, ln_floored};
use crate::spec::{DataKind, Side, StreamSpec};
use crate::types::EValue;

const METHOD: &str = "bernoulli_mixture_e";

const PRIOR_A: f64 = 0.5;
const PRIOR_B: f64 = 0.5;

/// Sequential test for a Bernoulli rate against `p0`.
#[derive(Debug, Clone)]
pub struct BernoulliMixtureE {
    spec: StreamSpec,
    p0: f64,
    side: Side,
    estimator: OnlineMean,
    successes: f64,
    guard: StreamGuard,
    latched: bool,
}

impl BernoulliMixtureE {
    /// Construct a test of `H0: p = p0` (`Side::Two`), `H0: p <= p0`
    /// (`Side::Ge`), or `H0: p >= p0` (`Side::Le`).
    ///
    /// # Errors
    ///
    /// [`ConfigError`] unless `spec.kind` is `Bernoulli` and `p0` lies in
    /// (0, 1).
    pub fn new(spec: StreamSpec, p0: f64, side: Side) -> Result<Self, ConfigError> {
        if spec.kind != DataKind::Bernoulli {
            return Err(ConfigError::KindMismatch {
                method: METHOD,
                detail: format!("requires kind = bernoulli, got {}", spec.kind),
            });
        }
        if !(p0 > 0.0 && p0 < 1.0) {
            return Err(ConfigError::Invalid {
                message: format!("p0 must be in (0, 1), got {p0}"),
            });
        }
        let guard = StreamGuard::new(spec.support, spec.clip_mode, METHOD);
        Ok(Self {
            spec,
            p0,
            side,
            estimator: OnlineMean::new(),
            successes: 0.0,
            guard,
            latched: false,
        })
    }

    /// Fold one binary observation.
    ///
    /// # Errors
    ///
    /// [`AssumptionViolationError`] in `Error` clip mode for values outside
    /// `[0, 1]` or non-binary values inside it; the observation is not
    /// applied.
    pub fn update(&mut self, x: f64) -> Result<(), AssumptionViolationError> {
        let Some(x) = self.guard.admit_bernoulli(x)? else {
            return Ok(());
        };
        self.successes += x;
        self.estimator.update(x);
        if self.log_e() >= (1.0 / self.spec.alpha).ln() {
            self.latched = true;
        }
        Ok(())
    }

    /// Current log e-value.
    fn log_e(&self) -> f64 {
        let t = self.estimator.n();
        if t == 0 {
            return 0.0;
        }
        let s = self.successes;
        let f = t as f64 - s;

        let log_beta_num = ln_beta(s + PRIOR_A, f + PRIOR_B);
        let log_beta_den = ln_beta(PRIOR_A, PRIOR_B);

        // One-sided alternatives renormalize the mixture to the beta mass
        // on the alternative side of p0.
        let (log_tail, log_mass) = match self.side {
            Side::Two => (0.0, 0.0),
            Side::Ge => {
                let posterior_below = beta_reg(s + PRIOR_A, f + PRIOR_B, self.p0);
                let prior_below = beta_reg(PRIOR_A, PRIOR_B, self.p0);
                (ln_floored(1.0 - posterior_below), ln_floored(1.0 - prior_below))
            }
            Side::Le => {
                let posterior_below = beta_reg(s + PRIOR_A, f + PRIOR_B, self.p0);
                let prior_below = beta_reg(PRIOR_A, PRIOR_B, self.p0);
                (ln_floored(posterior_below), ln_floored(prior_below))
            }
        };

        log_beta_num + log_tail - log_beta_den - log_mass
            - s * self.p0.ln()
            - f * (-self.p0).ln_1p()
    }

    /// Immutable snapshot of the current e-value and decision.
    pub fn evalue(&self) -> EValue {
        let t = self.estimator.n();
        let log_e = self.log_e();
        let decision = self.latched || log_e >= (1.0 / self.spec.alpha).ln();
        EValue {
            t,
            e: clamped_exp(log_e),
            decision,
            tier: self.guard.tier(),
            alpha: self.spec.alpha,
            diagnostics: self.guard.snapshot(),
        }
    }

    /// Clear all state, including the decision latch.
    pub fn reset(&mut self) {
        self.estimator.reset();
        self.successes = 0.0;
        self.guard.reset();
        self.latched = false;
    }

    /// Stable method name.
    pub fn method(&self) -> &'static str {
        METHOD
    }

    /// The null rate under test.
    pub fn p0(&self) -> f64 {
        self.p0
    }
}
