//! Two-sample paired e-process for a bounded mean difference.
//!
//! Observations arrive tagged with an arm and are paired FIFO across arms.
//! Each pair contributes a bounded increment `y = (b_obs - a_obs) - delta0`
//! whose conditional mean under `H0: delta <= delta0` is at most zero. Over
//! the increment stream, a Gaussian mixture martingale with variance scale
//! bounded by the squared increment range yields the e-process in closed
//! form.
//!
//! Arrivals do not need to alternate; an arm imbalance only grows the
//! pending queue of the fuller arm. The pair count `t` is what snapshots
//! report.

use std::collections::VecDeque;

use statrs::function::erf::erf;

use crate::diagnostics::{Diagnostics, StreamGuard};
use crate::error::{AssumptionViolationError, ConfigError};
use crate::evalues::{clamped_exp, ln_floored, log_sum_exp, LOG_E_CAP};
use crate::spec::{ABSpec, Arm, Side};
use crate::types::EValue;

const METHOD: &str = "two_sample_mean_mixture_e";

/// Sequential test for the mean difference `delta = mu_B - mu_A`.
#[derive(Debug, Clone)]
pub struct TwoSampleMeanMixtureE {
    spec: ABSpec,
    delta0: f64,
    side: Side,
    queue_a: VecDeque<f64>,
    queue_b: VecDeque<f64>,
    sum: f64,
    pairs: u64,
    /// Sub-Gaussian scale of one increment: `width^2 / 8` for increments
    /// with range `width = 2 * (b - a)`.
    increment_scale: f64,
    /// Mixture precision parameter; `1 / width` spreads the prior over
    /// effect sizes the increments can express.
    tau: f64,
    guard_a: StreamGuard,
    guard_b: StreamGuard,
    latched: bool,
}

impl TwoSampleMeanMixtureE {
    /// Construct a test of `H0: delta <= delta0` (`Side::Ge`),
    /// `H0: delta >= delta0` (`Side::Le`), or `H0: delta = delta0`
    /// (`Side::Two`, the symmetric average of the two one-sided processes).
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when `delta0` is non-finite or lies outside the
    /// representable difference range `[-(b-a), b-a]`.
    pub fn new(spec: ABSpec, delta0: f64, side: Side) -> Result<Self, ConfigError> {
        let range = spec.range();
        if !delta0.is_finite() || delta0.abs() > range {
            return Err(ConfigError::Invalid {
                message: format!(
                    "delta0 must lie in [-{range}, {range}] for support ({}, {}), got {delta0}",
                    spec.support.0, spec.support.1
                ),
            });
        }
        let width = 2.0 * range;
        let guard_a = StreamGuard::new(spec.support, spec.clip_mode, METHOD);
        let guard_b = StreamGuard::new(spec.support, spec.clip_mode, METHOD);
        Ok(Self {
            spec,
            delta0,
            side,
            queue_a: VecDeque::new(),
            queue_b: VecDeque::new(),
            sum: 0.0,
            pairs: 0,
            increment_scale: width * width / 8.0,
            tau: 1.0 / width,
            guard_a,
            guard_b,
            latched: false,
        })
    }

    /// Fold one `(arm, value)` observation, pairing when both arms have
    /// pending values.
    ///
    /// # Errors
    ///
    /// [`AssumptionViolationError`] in `Error` clip mode for out-of-range
    /// values; the observation is not applied or queued.
    pub fn update(&mut self, arm: Arm, x: f64) -> Result<(), AssumptionViolationError> {
        let admitted = match arm {
            Arm::A => self.guard_a.admit(x)?,
            Arm::B => self.guard_b.admit(x)?,
        };
        let Some(x) = admitted else {
            return Ok(());
        };
        match arm {
            Arm::A => self.queue_a.push_back(x),
            Arm::B => self.queue_b.push_back(x),
        }

        while let (Some(&a), Some(&b)) = (self.queue_a.front(), self.queue_b.front()) {
            self.queue_a.pop_front();
            self.queue_b.pop_front();
            self.sum += (b - a) - self.delta0;
            self.pairs += 1;
        }

        if self.log_e() >= (1.0 / self.spec.alpha).ln() {
            self.latched = true;
        }
        Ok(())
    }

    /// Log e-value of the one-sided mixture for increment sum `s` over `t`
    /// pairs:
    ///
    /// ```text
    /// log E = s^2 / (4A) + ln(1 + erf(s / (2 sqrt(A)))) - ln(tau) - ln(2A) / 2
    /// A     = c t + 1 / (2 tau^2)
    /// ```
    fn one_sided_log_e(&self, s: f64) -> f64 {
        let a = self.increment_scale * self.pairs as f64 + 1.0 / (2.0 * self.tau * self.tau);
        let z = s / (2.0 * a.sqrt());
        let growth = (s * s / (4.0 * a)).min(LOG_E_CAP);
        growth + ln_floored(1.0 + erf(z)) - self.tau.ln() - 0.5 * (2.0 * a).ln()
    }

    fn log_e(&self) -> f64 {
        if self.pairs == 0 {
            return 0.0;
        }
        match self.side {
            Side::Ge => self.one_sided_log_e(self.sum),
            Side::Le => self.one_sided_log_e(-self.sum),
            Side::Two => {
                let ge = self.one_sided_log_e(self.sum);
                let le = self.one_sided_log_e(-self.sum);
                log_sum_exp(ge, le) - std::f64::consts::LN_2
            }
        }
    }

    /// Immutable snapshot of the current e-value and decision.
    pub fn evalue(&self) -> EValue {
        let log_e = self.log_e();
        let decision = self.latched || log_e >= (1.0 / self.spec.alpha).ln();
        EValue {
            t: self.pairs,
            e: clamped_exp(log_e),
            decision,
            tier: self.guard_a.tier().degrade(self.guard_b.tier()),
            alpha: self.spec.alpha,
            diagnostics: Diagnostics::merged(
                &self.guard_a.snapshot(),
                &self.guard_b.snapshot(),
                METHOD,
            ),
        }
    }

    /// Clear queues, sums, gates, and the decision latch.
    pub fn reset(&mut self) {
        self.queue_a.clear();
        self.queue_b.clear();
        self.sum = 0.0;
        self.pairs = 0;
        self.guard_a.reset();
        self.guard_b.reset();
        self.latched = false;
    }

    /// Stable method name.
    pub fn method(&self) -> &'static str {
        METHOD
    }
}
