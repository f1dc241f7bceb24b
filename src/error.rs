//! Error types for streaming inference.

use std::fmt;

/// Error returned when a specification or construction argument is invalid.
///
/// Configuration errors are synchronous: they arise at construction time and
/// never from data. A caller that holds a successfully constructed instance
/// will not see this error again.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `alpha` outside the open interval (0, 1).
    InvalidAlpha {
        /// The rejected value.
        alpha: f64,
    },

    /// Support bounds with `lo >= hi`, or non-finite bounds.
    InvalidSupport {
        /// Declared lower bound.
        lo: f64,
        /// Declared upper bound.
        hi: f64,
    },

    /// A method was constructed over a spec whose data kind it does not
    /// support (e.g. a Bernoulli mixture over `kind = Bounded`).
    KindMismatch {
        /// Method that rejected the spec.
        method: &'static str,
        /// Human-readable description of the incompatibility.
        detail: String,
    },

    /// The requested one-sided/two-sided combination is not supported.
    UnsupportedSidedness {
        /// Human-readable description of the rejected combination.
        detail: String,
    },

    /// An arm label that is not `A` or `B`.
    UnknownArm {
        /// The rejected label.
        label: String,
    },

    /// Any other invalid configuration (null parameters, malformed scenario
    /// definitions, bad run configs).
    Invalid {
        /// Human-readable description.
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAlpha { alpha } => {
                write!(f, "alpha must be in (0, 1), got {alpha}")
            }
            Self::InvalidSupport { lo, hi } => {
                write!(f, "support must satisfy lo < hi with finite bounds, got ({lo}, {hi})")
            }
            Self::KindMismatch { method, detail } => {
                write!(f, "{method}: {detail}")
            }
            Self::UnsupportedSidedness { detail } => {
                write!(f, "unsupported sidedness: {detail}")
            }
            Self::UnknownArm { label } => {
                write!(f, "unknown arm {label:?}, expected \"A\" or \"B\"")
            }
            Self::Invalid { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error returned from `update` when an observation violates the declared
/// assumptions and the spec's clip mode is [`ClipMode::Error`].
///
/// The offending observation was **not** applied: estimator state is exactly
/// as it was before the call, and the caller may continue updating or
/// construct a fresh instance. All softer assumption concerns (missingness,
/// drift, heavy clipping) degrade the guarantee tier instead of raising.
///
/// [`ClipMode::Error`]: crate::spec::ClipMode::Error
#[derive(Debug, Clone, PartialEq)]
pub struct AssumptionViolationError {
    /// Method that rejected the observation.
    pub method: &'static str,
    /// Observation count at the time of rejection (not counting the
    /// rejected value).
    pub t: u64,
    /// The offending value.
    pub value: f64,
    /// Declared support the value fell outside of.
    pub support: (f64, f64),
    /// Out-of-range observations seen so far, including this one.
    pub out_of_range_count: u64,
}

impl fmt::Display for AssumptionViolationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: value {} outside declared support [{}, {}] at t={} ({} out-of-range so far)",
            self.method, self.value, self.support.0, self.support.1, self.t, self.out_of_range_count
        )
    }
}

impl std::error::Error for AssumptionViolationError {}
