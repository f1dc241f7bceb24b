//! Stitched time-uniform Hoeffding confidence sequence.
//!
//! Conservative but assumption-light: validity needs only independent
//! observations inside the declared support. The half-width depends on the
//! support width alone, never on the observed variance.
//!
//! # Reference
//!
//! Hoeffding, W. (1963). "Probability inequalities for sums of bounded
//! random variables." JASA 58(301):13-30. Time-uniform stitching follows
//! Howard, Ramdas, McAuliffe & Sekhon (2021).

use crate::cs::{side_adjusted_alpha, stitched_margin, ConfidenceSequence};
use crate::diagnostics::StreamGuard;
use crate::error::{AssumptionViolationError, ConfigError};
use crate::estimators::OnlineMean;
use crate::spec::{DataKind, StreamSpec};
use crate::types::Interval;

const METHOD: &str = "hoeffding";

/// Hoeffding-style confidence sequence for bounded data.
#[derive(Debug, Clone)]
pub struct HoeffdingCS {
    spec: StreamSpec,
    estimator: OnlineMean,
    guard: StreamGuard,
}

impl HoeffdingCS {
    /// Construct over a bounded or Bernoulli spec.
    ///
    /// # Errors
    ///
    /// Never fails on kind: both declared kinds are bounded. Kept fallible
    /// for uniformity with the trait.
    pub fn new(spec: StreamSpec) -> Result<Self, ConfigError> {
        match spec.kind {
            DataKind::Bounded | DataKind::Bernoulli => {}
        }
        let guard = StreamGuard::new(spec.support, spec.clip_mode, METHOD);
        Ok(Self {
            spec,
            estimator: OnlineMean::new(),
            guard,
        })
    }
}

impl ConfidenceSequence for HoeffdingCS {
    fn from_spec(spec: StreamSpec) -> Result<Self, ConfigError> {
        Self::new(spec)
    }

    fn update(&mut self, x: f64) -> Result<(), AssumptionViolationError> {
        if let Some(x) = self.guard.admit(x)? {
            self.estimator.update(x);
        }
        Ok(())
    }

    fn interval(&self) -> Interval {
        let (a, b) = self.spec.support;
        let t = self.estimator.n();
        if t == 0 {
            return Interval {
                t: 0,
                estimate: (a + b) / 2.0,
                lo: a,
                hi: b,
                tier: self.guard.tier(),
                alpha: self.spec.alpha,
                diagnostics: self.guard.snapshot(),
            };
        }

        let mean = self.estimator.mean();
        let margin = stitched_margin(t, self.spec.range(), side_adjusted_alpha(&self.spec));
        let (lo, hi) = if self.spec.two_sided {
            ((mean - margin).max(a), (mean + margin).min(b))
        } else {
            ((mean - margin).max(a), b)
        };

        Interval {
            t,
            estimate: mean,
            lo,
            hi,
            tier: self.guard.tier(),
            alpha: self.spec.alpha,
            diagnostics: self.guard.snapshot(),
        }
    }

    fn reset(&mut self) {
        self.estimator.reset();
        self.guard.reset();
    }

    fn method(&self) -> &'static str {
        METHOD
    }
}
