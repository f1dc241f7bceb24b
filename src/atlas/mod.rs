//! Monte-Carlo benchmarking ("atlas") for the inference methods.
//!
//! The atlas is how the crate's statistical claims are checked empirically:
//! anytime coverage, Type I error under optional stopping, power, and
//! interval width across a catalog of scenarios and stopping rules. It
//! drives the same public `update`/`interval`/`evalue` surface callers use;
//! nothing here reaches into method internals.
//!
//! All data generation is deterministically seeded per scenario and
//! replicate, so every run is reproducible bit for bit.

mod report;
mod runner;
mod scenarios;

pub use report::{comparison_report, ReportBuilder};
pub use runner::{AtlasError, AtlasRunner, EvalueSpec, Metrics};
pub use scenarios::{
    one_sample_scenarios, two_sample_scenarios, ABScenario, ExcludeDirection, OneSampleSource,
    Scenario, StoppingRule, TwoSampleSource,
};
