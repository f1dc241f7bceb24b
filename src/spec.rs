//! Stream and A/B test specifications.
//!
//! A spec is an immutable configuration record, validated at construction.
//! Every inference object in this crate is built over a [`StreamSpec`] or an
//! [`ABSpec`]; the spec declares the assumptions (support bounds, data kind)
//! that the validity guarantees rest on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Declared distributional family of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Real-valued observations in a declared bounded support `[a, b]`.
    Bounded,
    /// Binary observations in {0, 1}; support is always `(0, 1)`.
    Bernoulli,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded => write!(f, "bounded"),
            Self::Bernoulli => write!(f, "bernoulli"),
        }
    }
}

impl FromStr for DataKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bounded" => Ok(Self::Bounded),
            "bernoulli" => Ok(Self::Bernoulli),
            other => Err(ConfigError::Invalid {
                message: format!("kind must be \"bounded\" or \"bernoulli\", got {other:?}"),
            }),
        }
    }
}

/// Policy for observations that fall outside the declared support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipMode {
    /// Reject the observation with an
    /// [`AssumptionViolationError`](crate::error::AssumptionViolationError).
    Error,
    /// Clip the observation into the support and degrade the guarantee tier
    /// to at worst [`Clipped`](crate::types::GuaranteeTier::Clipped).
    Clip,
}

impl FromStr for ClipMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "clip" => Ok(Self::Clip),
            other => Err(ConfigError::Invalid {
                message: format!("clip_mode must be \"error\" or \"clip\", got {other:?}"),
            }),
        }
    }
}

/// Arm label for two-sample streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arm {
    /// Control arm.
    A,
    /// Treatment arm.
    B,
}

impl Arm {
    /// The opposite arm.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

impl FromStr for Arm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            other => Err(ConfigError::UnknownArm {
                label: other.to_string(),
            }),
        }
    }
}

/// Direction of a sequential hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Two-sided: H0 pins the parameter to the null value exactly.
    Two,
    /// One-sided, alternative above: H0 says the parameter is at most the
    /// null value.
    Ge,
    /// One-sided, alternative below: H0 says the parameter is at least the
    /// null value.
    Le,
}

impl FromStr for Side {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two" => Ok(Self::Two),
            "ge" => Ok(Self::Ge),
            "le" => Ok(Self::Le),
            other => Err(ConfigError::Invalid {
                message: format!("side must be \"two\", \"ge\", or \"le\", got {other:?}"),
            }),
        }
    }
}

fn validate_alpha(alpha: f64) -> Result<(), ConfigError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ConfigError::InvalidAlpha { alpha });
    }
    Ok(())
}

fn validate_support(kind: DataKind, support: (f64, f64)) -> Result<(), ConfigError> {
    let (lo, hi) = support;
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return Err(ConfigError::InvalidSupport { lo, hi });
    }
    if kind == DataKind::Bernoulli && support != (0.0, 1.0) {
        return Err(ConfigError::Invalid {
            message: format!("bernoulli kind requires support (0, 1), got ({lo}, {hi})"),
        });
    }
    Ok(())
}

/// Specification for one-sample streaming inference on a bounded mean.
///
/// Immutable once constructed; validation happens in [`StreamSpec::new`] (or
/// the [`StreamSpec::bernoulli`] shorthand) and fails with [`ConfigError`]
/// on violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSpec {
    /// Significance level in (0, 1). The confidence sequence covers the
    /// true mean at every time step with probability at least `1 - alpha`.
    pub alpha: f64,
    /// Declared data kind.
    pub kind: DataKind,
    /// Declared support `(a, b)` with `a < b`. For Bernoulli, always
    /// `(0, 1)`.
    pub support: (f64, f64),
    /// Whether intervals are two-sided. One-sided specs produce lower
    /// confidence bounds with the upper endpoint pinned at the support.
    pub two_sided: bool,
    /// Out-of-range policy.
    pub clip_mode: ClipMode,
    /// Optional stream name carried into logs and manifests.
    pub name: String,
}

impl StreamSpec {
    /// Construct and validate a spec for a bounded or Bernoulli stream.
    ///
    /// Defaults: `two_sided = true`, `clip_mode = Error`, empty name. Use
    /// the `with_*` methods to change them.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] on `alpha` outside (0, 1), malformed support, or a
    /// Bernoulli kind with support other than `(0, 1)`.
    pub fn new(alpha: f64, kind: DataKind, support: (f64, f64)) -> Result<Self, ConfigError> {
        validate_alpha(alpha)?;
        validate_support(kind, support)?;
        Ok(Self {
            alpha,
            kind,
            support,
            two_sided: true,
            clip_mode: ClipMode::Error,
            name: String::new(),
        })
    }

    /// Shorthand for a Bernoulli spec with support `(0, 1)`.
    pub fn bernoulli(alpha: f64) -> Result<Self, ConfigError> {
        Self::new(alpha, DataKind::Bernoulli, (0.0, 1.0))
    }

    /// Set the sidedness.
    pub fn with_two_sided(mut self, two_sided: bool) -> Self {
        self.two_sided = two_sided;
        self
    }

    /// Set the out-of-range policy.
    pub fn with_clip_mode(mut self, clip_mode: ClipMode) -> Self {
        self.clip_mode = clip_mode;
        self
    }

    /// Set the stream name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Width of the declared support, `b - a`.
    pub fn range(&self) -> f64 {
        self.support.1 - self.support.0
    }
}

/// Specification for two-sample (A/B) streaming inference.
///
/// The governing parameter is the mean difference `delta = mu_B - mu_A`.
/// Both arms share the same support, kind, and clip mode. Two-sided only:
/// a one-sided construction is rejected at validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ABSpec {
    /// Significance level in (0, 1) for the joint interval on `delta`.
    pub alpha: f64,
    /// Declared data kind, shared by both arms.
    pub kind: DataKind,
    /// Declared support `(a, b)`, shared by both arms.
    pub support: (f64, f64),
    /// Out-of-range policy, shared by both arms.
    pub clip_mode: ClipMode,
    /// Optional test name carried into logs and manifests.
    pub name: String,
}

impl ABSpec {
    /// Construct and validate a two-sample spec.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] on the same conditions as [`StreamSpec::new`].
    pub fn new(alpha: f64, kind: DataKind, support: (f64, f64)) -> Result<Self, ConfigError> {
        validate_alpha(alpha)?;
        validate_support(kind, support)?;
        Ok(Self {
            alpha,
            kind,
            support,
            clip_mode: ClipMode::Error,
            name: String::new(),
        })
    }

    /// Shorthand for a Bernoulli A/B spec with support `(0, 1)`.
    pub fn bernoulli(alpha: f64) -> Result<Self, ConfigError> {
        Self::new(alpha, DataKind::Bernoulli, (0.0, 1.0))
    }

    /// Set the out-of-range policy.
    pub fn with_clip_mode(mut self, clip_mode: ClipMode) -> Self {
        self.clip_mode = clip_mode;
        self
    }

    /// Set the test name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Width of the declared support, `b - a`.
    pub fn range(&self) -> f64 {
        self.support.1 - self.support.0
    }

    /// Per-arm one-sample spec at level `alpha / 2`.
    ///
    /// Two independent arms each at `1 - alpha/2` give joint coverage at
    /// least `1 - alpha` for the Minkowski difference interval.
    pub fn arm_spec(&self) -> StreamSpec {
        StreamSpec {
            alpha: self.alpha / 2.0,
            kind: self.kind,
            support: self.support,
            two_sided: true,
            clip_mode: self.clip_mode,
            name: self.name.clone(),
        }
    }
}
