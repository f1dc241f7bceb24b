//! Assumption diagnostics: the gates every observation passes before it
//! reaches an estimator, and the snapshot attached to every output.
//!
//! Three gates run in order: missingness (NaN screening), range enforcement
//! (error or clip), and a drift heuristic (CUSUM on residuals against the
//! running mean). Each gate can only degrade the guarantee tier; the tier
//! recovers only through `reset`.
//!
//! The drift gate is advisory. It is not a change-point test and has both
//! false positives and false negatives; its only effect is the tier
//! downgrade.

use serde::{Deserialize, Serialize};

use crate::error::AssumptionViolationError;
use crate::estimators::OnlineMean;
use crate::spec::ClipMode;
use crate::types::GuaranteeTier;

/// Ring capacity for the trailing window of running means.
const DRIFT_RING: usize = 32;

/// Drift latches when a one-sided CUSUM of residuals exceeds
/// `DRIFT_THRESHOLD_SCALE * (b - a) * sqrt(n)`.
const DRIFT_THRESHOLD_SCALE: f64 = 2.0;

/// Minimum accepted observations before the drift gate can latch.
const DRIFT_MIN_OBS: u64 = 16;

/// Missingness degrades the tier once the missing fraction exceeds this.
const MISSING_RATE_LIMIT: f64 = 0.2;

/// Minimum total observations (accepted + missing) before the missingness
/// gate can degrade the tier.
const MISSING_MIN_OBS: u64 = 20;

/// Diagnostic metadata attached to every [`Interval`](crate::types::Interval)
/// and [`EValue`](crate::types::EValue) snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Stable name of the method that produced the output.
    pub method: String,
    /// Values replaced by their nearest admissible value (clip mode only).
    pub clipped_count: u64,
    /// NaN / non-finite inputs skipped.
    pub missing_count: u64,
    /// Values observed outside the declared support (clipped or rejected),
    /// including non-binary values on Bernoulli streams.
    pub out_of_range_count: u64,
    /// Whether the drift heuristic has latched.
    pub drift_detected: bool,
    /// Peak CUSUM excursion as a fraction of the latch threshold.
    pub drift_score: f64,
    /// Human-readable assumption notes, appended on tier transitions.
    pub notes: Vec<String>,
}

impl Diagnostics {
    /// Merge per-arm diagnostics into one record for a two-sample output.
    ///
    /// Counts add, drift flags OR together, scores take the max, and notes
    /// concatenate with arm prefixes.
    pub fn merged(a: &Diagnostics, b: &Diagnostics, method: &str) -> Diagnostics {
        let mut notes = Vec::with_capacity(a.notes.len() + b.notes.len());
        notes.extend(a.notes.iter().map(|n| format!("arm A: {n}")));
        notes.extend(b.notes.iter().map(|n| format!("arm B: {n}")));
        Diagnostics {
            method: method.to_string(),
            clipped_count: a.clipped_count + b.clipped_count,
            missing_count: a.missing_count + b.missing_count,
            out_of_range_count: a.out_of_range_count + b.out_of_range_count,
            drift_detected: a.drift_detected || b.drift_detected,
            drift_score: a.drift_score.max(b.drift_score),
            notes,
        }
    }
}

/// Mutable gate state owned by one inference instance.
///
/// Feeds each inbound value through the missingness, range, and drift gates
/// and tracks the guarantee tier. `admit` returns the (possibly clipped)
/// value to fold into the estimator, `None` when the value is skipped, or
/// an error in [`ClipMode::Error`] when the value is out of range.
#[derive(Debug, Clone)]
pub struct StreamGuard {
    support: (f64, f64),
    clip_mode: ClipMode,
    method: &'static str,
    tier: GuaranteeTier,
    missing: u64,
    out_of_range: u64,
    clipped: u64,
    accepted: u64,
    drift_mean: OnlineMean,
    cusum_pos: f64,
    cusum_neg: f64,
    drift_detected: bool,
    drift_score: f64,
    recent_means: [f64; DRIFT_RING],
    ring_len: usize,
    ring_idx: usize,
    notes: Vec<String>,
    missing_noted: bool,
    clip_noted: bool,
}

impl StreamGuard {
    /// Guard for a stream with the given support and clip policy. `method`
    /// is the stable method name carried into snapshots and errors.
    pub fn new(support: (f64, f64), clip_mode: ClipMode, method: &'static str) -> Self {
        Self {
            support,
            clip_mode,
            method,
            tier: GuaranteeTier::Guaranteed,
            missing: 0,
            out_of_range: 0,
            clipped: 0,
            accepted: 0,
            drift_mean: OnlineMean::new(),
            cusum_pos: 0.0,
            cusum_neg: 0.0,
            drift_detected: false,
            drift_score: 0.0,
            recent_means: [0.0; DRIFT_RING],
            ring_len: 0,
            ring_idx: 0,
            notes: Vec::new(),
            missing_noted: false,
            clip_noted: false,
        }
    }

    /// Run one observation through the gates.
    ///
    /// Returns `Ok(Some(x))` with the admissible (possibly clipped) value,
    /// `Ok(None)` when the observation is skipped as missing, or
    /// `Err` in [`ClipMode::Error`] when `x` falls outside the support. On
    /// `Err` the observation was not applied and the gate counters reflect
    /// the rejection.
    pub fn admit(&mut self, x: f64) -> Result<Option<f64>, AssumptionViolationError> {
        let Some(x) = self.range_gate(x)? else {
            return Ok(None);
        };
        self.observe_for_drift(x);
        Ok(Some(x))
    }

    /// As [`StreamGuard::admit`], but additionally enforce that the value
    /// is binary. Non-binary in-range values reject in `Error` mode and
    /// round to the nearer of {0, 1} (ties up) in `Clip` mode.
    pub fn admit_bernoulli(&mut self, x: f64) -> Result<Option<f64>, AssumptionViolationError> {
        let Some(x) = self.range_gate(x)? else {
            return Ok(None);
        };
        let x = if x == 0.0 || x == 1.0 {
            x
        } else {
            match self.clip_mode {
                ClipMode::Error => return Err(self.violation(x)),
                ClipMode::Clip => {
                    self.out_of_range += 1;
                    self.clipped += 1;
                    self.degrade(GuaranteeTier::Clipped);
                    if !self.clip_noted {
                        self.clip_noted = true;
                        self.notes.push(
                            "non-binary values rounded to the nearest of {0, 1}".to_string(),
                        );
                    }
                    if x >= 0.5 {
                        1.0
                    } else {
                        0.0
                    }
                }
            }
        };
        self.observe_for_drift(x);
        Ok(Some(x))
    }

    /// Missingness and range gates; no drift observation.
    fn range_gate(&mut self, x: f64) -> Result<Option<f64>, AssumptionViolationError> {
        if !x.is_finite() {
            self.missing += 1;
            let total = self.accepted + self.missing;
            if total >= MISSING_MIN_OBS
                && self.missing as f64 / total as f64 > MISSING_RATE_LIMIT
                && !self.missing_noted
            {
                self.missing_noted = true;
                self.degrade(GuaranteeTier::Diagnostic);
                self.notes.push(format!(
                    "missing rate {:.2} exceeds {MISSING_RATE_LIMIT} after {total} observations",
                    self.missing as f64 / total as f64
                ));
                tracing::warn!(
                    method = self.method,
                    missing = self.missing,
                    total,
                    "missingness above threshold, tier degraded to diagnostic"
                );
            }
            return Ok(None);
        }

        let (a, b) = self.support;
        if x < a || x > b {
            self.out_of_range += 1;
            match self.clip_mode {
                ClipMode::Error => {
                    self.degrade(GuaranteeTier::Diagnostic);
                    Err(AssumptionViolationError {
                        method: self.method,
                        t: self.accepted,
                        value: x,
                        support: self.support,
                        out_of_range_count: self.out_of_range,
                    })
                }
                ClipMode::Clip => {
                    self.clipped += 1;
                    self.degrade(GuaranteeTier::Clipped);
                    if !self.clip_noted {
                        self.clip_noted = true;
                        self.notes
                            .push(format!("out-of-range values clipped into [{a}, {b}]"));
                        tracing::debug!(
                            method = self.method,
                            value = x,
                            "out-of-range value clipped, tier degraded to clipped"
                        );
                    }
                    Ok(Some(x.clamp(a, b)))
                }
            }
        } else {
            Ok(Some(x))
        }
    }

    /// Violation for a value the binary gate rejected; the observation was
    /// not applied.
    fn violation(&mut self, value: f64) -> AssumptionViolationError {
        self.out_of_range += 1;
        self.degrade(GuaranteeTier::Diagnostic);
        AssumptionViolationError {
            method: self.method,
            t: self.accepted,
            value,
            support: self.support,
            out_of_range_count: self.out_of_range,
        }
    }

    fn observe_for_drift(&mut self, x: f64) {
        self.accepted += 1;
        self.drift_mean.update(x);
        let mean = self.drift_mean.mean();

        self.recent_means[self.ring_idx] = mean;
        self.ring_idx = (self.ring_idx + 1) % DRIFT_RING;
        if self.ring_len < DRIFT_RING {
            self.ring_len += 1;
        }

        // One-sided CUSUM pair on residuals against the running mean. The
        // running mean lags a drifting stream, so residuals accumulate sign.
        let residual = x - mean;
        self.cusum_pos = (self.cusum_pos + residual).max(0.0);
        self.cusum_neg = (self.cusum_neg + residual).min(0.0);

        let n = self.accepted as f64;
        let range = self.support.1 - self.support.0;
        let threshold = DRIFT_THRESHOLD_SCALE * range * n.sqrt();
        if threshold > 0.0 {
            let excursion = self.cusum_pos.max(-self.cusum_neg);
            self.drift_score = self.drift_score.max(excursion / threshold);
            if self.accepted >= DRIFT_MIN_OBS && excursion > threshold && !self.drift_detected {
                self.drift_detected = true;
                self.degrade(GuaranteeTier::Diagnostic);
                self.notes.push(format!(
                    "drift latched at t={} (score {:.2})",
                    self.accepted, self.drift_score
                ));
                tracing::warn!(
                    method = self.method,
                    t = self.accepted,
                    score = self.drift_score,
                    "drift heuristic latched, tier degraded to diagnostic"
                );
            }
        }
    }

    fn degrade(&mut self, to: GuaranteeTier) {
        self.tier = self.tier.degrade(to);
    }

    /// Current guarantee tier.
    pub fn tier(&self) -> GuaranteeTier {
        self.tier
    }

    /// Accepted observation count (post-gate).
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Mean of the trailing window of running means; 0.0 before any data.
    pub fn recent_mean(&self) -> f64 {
        if self.ring_len == 0 {
            return 0.0;
        }
        self.recent_means[..self.ring_len].iter().sum::<f64>() / self.ring_len as f64
    }

    /// Immutable snapshot for attachment to an output record.
    pub fn snapshot(&self) -> Diagnostics {
        Diagnostics {
            method: self.method.to_string(),
            clipped_count: self.clipped,
            missing_count: self.missing,
            out_of_range_count: self.out_of_range,
            drift_detected: self.drift_detected,
            drift_score: self.drift_score,
            notes: self.notes.clone(),
        }
    }

    /// Clear all gate state; tier returns to `Guaranteed`.
    pub fn reset(&mut self) {
        *self = Self::new(self.support, self.clip_mode, self.method);
    }
}
