//! Result snapshot types.
//!
//! Every query on an inference object returns one of these immutable
//! records. Snapshots outlive the instance that produced them and may be
//! read from any thread.

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;

/// Guarantee level of a statistical output.
///
/// The tier is monotone non-increasing over an instance's lifetime in the
/// lattice `Guaranteed > Clipped > Diagnostic`; `reset()` restores
/// `Guaranteed`. A `Diagnostic` result is the contractual signal "do not
/// make a guarantee-dependent decision on this output".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuaranteeTier {
    /// All declared assumptions satisfied; the time-uniform guarantee holds.
    Guaranteed,
    /// Out-of-range values were clipped into the support; the guarantee
    /// holds for the clipped stream, not the raw one.
    Clipped,
    /// Assumptions violated (heavy missingness, drift, or a degraded
    /// input); no guarantee.
    Diagnostic,
}

impl GuaranteeTier {
    /// Position in the lattice; higher is stronger.
    fn strength(self) -> u8 {
        match self {
            Self::Guaranteed => 2,
            Self::Clipped => 1,
            Self::Diagnostic => 0,
        }
    }

    /// The weaker of two tiers.
    pub fn degrade(self, other: Self) -> Self {
        if other.strength() < self.strength() {
            other
        } else {
            self
        }
    }

    /// Stable lowercase name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guaranteed => "guaranteed",
            Self::Clipped => "clipped",
            Self::Diagnostic => "diagnostic",
        }
    }
}

/// Time-uniform confidence interval snapshot.
///
/// For a one-sample sequence over support `[a, b]`, endpoints satisfy
/// `a <= lo <= estimate <= hi <= b`; for a two-sample sequence they lie in
/// `[-(b-a), b-a]`. Endpoints are always finite and never NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Observation count this snapshot reflects.
    pub t: u64,
    /// Point estimate on the parameter scale (mean, or mean difference).
    pub estimate: f64,
    /// Lower endpoint.
    pub lo: f64,
    /// Upper endpoint.
    pub hi: f64,
    /// Guarantee tier at snapshot time.
    pub tier: GuaranteeTier,
    /// Significance level the sequence was built with.
    pub alpha: f64,
    /// Diagnostics state at snapshot time.
    pub diagnostics: Diagnostics,
}

impl Interval {
    /// Interval width, `hi - lo`. Always nonnegative.
    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    /// Whether the interval excludes a parameter value.
    pub fn excludes(&self, value: f64) -> bool {
        value < self.lo || value > self.hi
    }
}

/// E-value snapshot.
///
/// The e-process is maintained in log space internally; `e` here is the
/// exponentiated value clamped to a large finite ceiling, so it is always a
/// finite nonnegative real. `decision` latches: once true it stays true for
/// every later snapshot from the same instance (until `reset`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EValue {
    /// Observation count (pairs, for two-sample tests) this snapshot
    /// reflects.
    pub t: u64,
    /// Current e-value, `>= 0`, finite.
    pub e: f64,
    /// True iff the e-process has ever reached `1 / alpha`.
    pub decision: bool,
    /// Guarantee tier at snapshot time.
    pub tier: GuaranteeTier,
    /// Significance level of the test.
    pub alpha: f64,
    /// Diagnostics state at snapshot time.
    pub diagnostics: Diagnostics,
}
