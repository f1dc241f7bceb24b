//! Deterministic method recommendation.
//!
//! A pure function from spec (plus an optional diagnostics snapshot) to a
//! method choice. The reason strings are stable contract: logs and audit
//! trails compare them verbatim across versions.

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::spec::{ABSpec, DataKind, StreamSpec};
use crate::types::GuaranteeTier;

/// The inference methods the recommender can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    /// One-sample stitched Hoeffding sequence.
    HoeffdingCS,
    /// One-sample empirical Bernstein sequence.
    EmpiricalBernsteinCS,
    /// One-sample beta-binomial mixture sequence.
    BernoulliMixtureCS,
    /// Two-sample union-of-Hoeffding sequence.
    TwoSampleHoeffdingCS,
    /// Two-sample union-of-empirical-Bernstein sequence.
    TwoSampleEmpiricalBernsteinCS,
}

impl Method {
    /// Stable method name, matching the names carried in diagnostics
    /// snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HoeffdingCS => "hoeffding",
            Self::EmpiricalBernsteinCS => "empirical_bernstein",
            Self::BernoulliMixtureCS => "bernoulli_mixture",
            Self::TwoSampleHoeffdingCS => "two_sample_hoeffding",
            Self::TwoSampleEmpiricalBernsteinCS => "two_sample_empirical_bernstein",
        }
    }
}

/// Outcome of a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Selected method.
    pub method: Method,
    /// Stable human-readable justification.
    pub reason: String,
    /// Tier the caller should expect given the supplied diagnostics
    /// (`Guaranteed` when none were supplied).
    pub tier_expected: GuaranteeTier,
}

fn expected_tier(diagnostics: Option<&Diagnostics>) -> GuaranteeTier {
    match diagnostics {
        None => GuaranteeTier::Guaranteed,
        Some(d) if d.drift_detected => GuaranteeTier::Diagnostic,
        Some(d) if d.clipped_count > 0 => GuaranteeTier::Clipped,
        Some(_) => GuaranteeTier::Guaranteed,
    }
}

/// Recommend a one-sample confidence sequence for a spec.
pub fn recommend_cs(spec: &StreamSpec, diagnostics: Option<&Diagnostics>) -> Recommendation {
    let tier_expected = expected_tier(diagnostics);
    match spec.kind {
        DataKind::Bernoulli => Recommendation {
            method: Method::BernoulliMixtureCS,
            reason: "bernoulli mixture CS: exact for binary data, tightest valid intervals"
                .to_string(),
            tier_expected,
        },
        DataKind::Bounded => {
            if diagnostics.is_some_and(|d| d.drift_detected) {
                Recommendation {
                    method: Method::HoeffdingCS,
                    reason: "hoeffding CS: conservative fallback while drift is latched"
                        .to_string(),
                    tier_expected,
                }
            } else {
                Recommendation {
                    method: Method::EmpiricalBernsteinCS,
                    reason: "empirical bernstein CS: variance-adaptive for bounded data"
                        .to_string(),
                    tier_expected,
                }
            }
        }
    }
}

/// Recommend a two-sample confidence sequence for an A/B spec.
pub fn recommend_ab(spec: &ABSpec, diagnostics: Option<&Diagnostics>) -> Recommendation {
    let tier_expected = expected_tier(diagnostics);
    match spec.kind {
        DataKind::Bernoulli => Recommendation {
            method: Method::TwoSampleHoeffdingCS,
            reason: "two-sample hoeffding CS: union bound over bernoulli-support arms"
                .to_string(),
            tier_expected,
        },
        DataKind::Bounded => Recommendation {
            method: Method::TwoSampleEmpiricalBernsteinCS,
            reason: "two-sample empirical bernstein CS: variance-adaptive for bounded arms"
                .to_string(),
            tier_expected,
        },
    }
}
