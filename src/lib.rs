//! # peeksafe
//!
//! Peeking-safe streaming inference for bounded real-valued streams:
//! time-uniform confidence sequences and e-processes whose guarantees hold
//! simultaneously at every time step, so a caller may inspect state and
//! stop after any observation without invalidating them.
//!
//! The crate covers:
//! - One-sample confidence sequences for a bounded mean (Hoeffding,
//!   empirical Bernstein, Bernoulli beta-binomial mixture)
//! - Two-sample confidence sequences for a mean difference
//! - Sequential e-processes for hypothesis decisions, one- and two-sample
//! - An assumption-diagnostic layer that tags every output with a
//!   guarantee tier (`Guaranteed` / `Clipped` / `Diagnostic`)
//! - A deterministic method recommender
//! - Monte-Carlo benchmarking (the atlas) over a scenario catalog
//!
//! ## Quick start
//!
//! ```
//! use peeksafe::{ConfidenceSequence, EmpiricalBernsteinCS, DataKind, StreamSpec};
//!
//! let spec = StreamSpec::new(0.05, DataKind::Bounded, (0.0, 1.0))?;
//! let mut cs = EmpiricalBernsteinCS::new(spec)?;
//! for x in [0.41, 0.52, 0.47, 0.39, 0.55] {
//!     cs.update(x)?;
//!     let iv = cs.interval(); // safe to inspect after every observation
//!     assert!(iv.lo <= iv.estimate && iv.estimate <= iv.hi);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## A/B testing
//!
//! ```
//! use peeksafe::{ABSpec, Arm, DataKind, TwoSampleEmpiricalBernsteinCS};
//!
//! let spec = ABSpec::new(0.05, DataKind::Bounded, (0.0, 1.0))?;
//! let mut cs = TwoSampleEmpiricalBernsteinCS::new(spec)?;
//! cs.update(Arm::A, 0.12)?;
//! cs.update(Arm::B, 0.34)?;
//! let iv = cs.interval(); // interval on the lift mu_B - mu_A
//! assert!(iv.lo >= -1.0 && iv.hi <= 1.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Every `update` and query is O(1) time and memory; instances are
//! single-owner and not safe to mutate concurrently, but every returned
//! snapshot is immutable and freely shareable.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod atlas;
pub mod config;
pub mod cs;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod estimators;
pub mod evalues;
pub mod output;
pub mod recommend;
pub mod spec;
pub mod twosample;
pub mod types;

pub use cs::{BernoulliMixtureCS, ConfidenceSequence, EmpiricalBernsteinCS, HoeffdingCS};
pub use diagnostics::Diagnostics;
pub use error::{AssumptionViolationError, ConfigError};
pub use estimators::{OnlineMean, OnlineVariance};
pub use evalues::{BernoulliMixtureE, TwoSampleMeanMixtureE};
pub use recommend::{recommend_ab, recommend_cs, Method, Recommendation};
pub use spec::{ABSpec, Arm, ClipMode, DataKind, Side, StreamSpec};
pub use twosample::{TwoSampleCS, TwoSampleEmpiricalBernsteinCS, TwoSampleHoeffdingCS};
pub use types::{EValue, GuaranteeTier, Interval};
