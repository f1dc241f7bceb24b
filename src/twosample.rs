//! Two-sample confidence sequences for the mean difference.
//!
//! Construction: one independent one-sample sequence per arm, each at level
//! `1 - alpha/2`; the interval for `delta = mu_B - mu_A` is the Minkowski
//! difference of the two bands. By a union bound the joint coverage is at
//! least `1 - alpha`, uniformly over time.
//!
//! The construction is generic over the one-sample method: anything
//! implementing [`ConfidenceSequence`] plugs in unchanged.

use crate::cs::{ConfidenceSequence, EmpiricalBernsteinCS, HoeffdingCS};
use crate::diagnostics::Diagnostics;
use crate::error::{AssumptionViolationError, ConfigError};
use crate::spec::{ABSpec, Arm};
use crate::types::{GuaranteeTier, Interval};

/// Union-of-Hoeffding two-sample sequence.
pub type TwoSampleHoeffdingCS = TwoSampleCS<HoeffdingCS>;

/// Union-of-empirical-Bernstein two-sample sequence.
pub type TwoSampleEmpiricalBernsteinCS = TwoSampleCS<EmpiricalBernsteinCS>;

/// Two-sample confidence sequence over any one-sample method.
#[derive(Debug, Clone)]
pub struct TwoSampleCS<C: ConfidenceSequence> {
    spec: ABSpec,
    arm_a: C,
    arm_b: C,
    method: &'static str,
}

impl<C: ConfidenceSequence> TwoSampleCS<C> {
    /// Construct over a validated two-sample spec.
    ///
    /// # Errors
    ///
    /// Propagates the one-sample method's [`ConfigError`] when the spec's
    /// kind is unsupported.
    pub fn new(spec: ABSpec) -> Result<Self, ConfigError> {
        let arm_spec = spec.arm_spec();
        let arm_a = C::from_spec(arm_spec.clone())?;
        let arm_b = C::from_spec(arm_spec)?;
        let method = match arm_a.method() {
            "hoeffding" => "two_sample_hoeffding",
            "empirical_bernstein" => "two_sample_empirical_bernstein",
            "bernoulli_mixture" => "two_sample_bernoulli_mixture",
            _ => "two_sample",
        };
        Ok(Self {
            spec,
            arm_a,
            arm_b,
            method,
        })
    }

    /// Fold one `(arm, value)` observation.
    ///
    /// # Errors
    ///
    /// [`AssumptionViolationError`] under the same conditions as the
    /// one-sample `update` for the targeted arm.
    pub fn update(&mut self, arm: Arm, x: f64) -> Result<(), AssumptionViolationError> {
        match arm {
            Arm::A => self.arm_a.update(x),
            Arm::B => self.arm_b.update(x),
        }
    }

    /// Immutable snapshot of the interval for `delta = mu_B - mu_A`.
    ///
    /// Endpoints always lie in `[-(b-a), b-a]`. While either arm is empty
    /// the interval is the vacuous difference band and the tier is at worst
    /// `Diagnostic`: an empty arm is surfaced, never silently guaranteed.
    pub fn interval(&self) -> Interval {
        let iv_a = self.arm_a.interval();
        let iv_b = self.arm_b.interval();
        let t = iv_a.t + iv_b.t;
        let range = self.spec.range();

        let mut diagnostics =
            Diagnostics::merged(&iv_a.diagnostics, &iv_b.diagnostics, self.method);
        let assumption_tier = iv_a.tier.degrade(iv_b.tier);

        if iv_a.t == 0 || iv_b.t == 0 {
            diagnostics.notes.push(format!(
                "arm counts A={}, B={}: difference is unidentified until both arms report",
                iv_a.t, iv_b.t
            ));
            return Interval {
                t,
                estimate: 0.0,
                lo: -range,
                hi: range,
                tier: assumption_tier.degrade(GuaranteeTier::Diagnostic),
                alpha: self.spec.alpha,
                diagnostics,
            };
        }

        let estimate = iv_b.estimate - iv_a.estimate;
        let lo = (iv_b.lo - iv_a.hi).clamp(-range, range);
        let hi = (iv_b.hi - iv_a.lo).clamp(-range, range);

        Interval {
            t,
            estimate,
            lo,
            hi,
            tier: assumption_tier,
            alpha: self.spec.alpha,
            diagnostics,
        }
    }

    /// Clear both arms and start a new epoch.
    pub fn reset(&mut self) {
        self.arm_a.reset();
        self.arm_b.reset();
    }

    /// Stable method name.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// The spec this sequence was built over.
    pub fn spec(&self) -> &ABSpec {
        &self.spec
    }
}
