//! Monte-Carlo driver and metric aggregation.
//!
//! Each replicate regenerates scenario data from a shifted seed, drives one
//! inference instance observation by observation through the public
//! surface, and applies the stopping rule exactly as a peeking caller
//! would. Coverage is *anytime*: a replicate counts as covered only if the
//! true parameter stayed inside the interval at every step it was observed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::atlas::scenarios::{ABScenario, Scenario, StoppingRule};
use crate::cs::{BernoulliMixtureCS, ConfidenceSequence, EmpiricalBernsteinCS, HoeffdingCS};
use crate::error::{AssumptionViolationError, ConfigError};
use crate::evalues::BernoulliMixtureE;
use crate::recommend::Method;
use crate::spec::{ABSpec, Side, StreamSpec};
use crate::twosample::TwoSampleCS;

/// Error from an atlas run.
#[derive(Debug, Clone, PartialEq)]
pub enum AtlasError {
    /// Construction or scenario parameters were invalid.
    Config(ConfigError),
    /// The method rejected scenario data; the scenario and spec disagree
    /// about the support or clip mode.
    Assumption(AssumptionViolationError),
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "atlas configuration: {e}"),
            Self::Assumption(e) => write!(f, "atlas data rejected: {e}"),
        }
    }
}

impl std::error::Error for AtlasError {}

impl From<ConfigError> for AtlasError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<AssumptionViolationError> for AtlasError {
    fn from(e: AssumptionViolationError) -> Self {
        Self::Assumption(e)
    }
}

/// Aggregated metrics from one scenario x method x stopping-rule cell.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    /// Fraction of replicates where the true parameter stayed inside the
    /// interval at every observed step.
    pub coverage: f64,
    /// Fraction covered at the stopping (or horizon) time only.
    pub final_coverage: f64,
    /// Fraction of null replicates where the stopping rule fired.
    pub type_i_error: f64,
    /// Fraction of alternative replicates where the stopping rule fired.
    pub power: f64,
    /// Mean final interval width.
    pub avg_width: f64,
    /// Median stopping time (horizon when the rule never fired).
    pub median_stop_time: f64,
    /// Fraction of replicates where the companion e-process latched a
    /// decision (zero when no e-process was attached).
    pub evalue_decision_rate: f64,
}

/// Companion e-process configuration for one-sample runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalueSpec {
    /// Null rate under test.
    pub p0: f64,
    /// Test direction.
    pub side: Side,
}

/// Monte-Carlo benchmark runner.
#[derive(Debug, Clone, Copy)]
pub struct AtlasRunner {
    /// Replicates per cell.
    pub n_sim: u64,
}

impl AtlasRunner {
    /// Runner with the given replicate count.
    pub fn new(n_sim: u64) -> Self {
        Self { n_sim }
    }

    /// Run a one-sample cell.
    ///
    /// # Errors
    ///
    /// [`AtlasError`] when the method cannot be built over the spec, the
    /// scenario parameters are invalid, or the generated data violates the
    /// spec's support in `Error` clip mode.
    pub fn run_one_sample(
        &self,
        scenario: &Scenario,
        spec: &StreamSpec,
        method: Method,
        stopping: StoppingRule,
        evalue: Option<EvalueSpec>,
    ) -> Result<Metrics, AtlasError> {
        let mut cs = build_one_sample(method, spec.clone())?;
        let mut companion = match evalue {
            Some(ev) => Some(BernoulliMixtureE::new(spec.clone(), ev.p0, ev.side)?),
            None => None,
        };

        let mut covered_anytime = 0u64;
        let mut covered_final = 0u64;
        let mut stopped_count = 0u64;
        let mut decision_count = 0u64;
        let mut widths = Vec::with_capacity(self.n_sim as usize);
        let mut stop_times = Vec::with_capacity(self.n_sim as usize);

        for rep in 0..self.n_sim {
            cs.reset();
            if let Some(e) = companion.as_mut() {
                e.reset();
            }
            let data = scenario.generate(scenario.n_max, rep)?;

            let mut covered_all = true;
            let mut stopped_at = None;
            let mut decided = false;

            for (i, &x) in data.iter().enumerate() {
                let t = i as u64 + 1;
                cs.update(x)?;
                let iv = cs.interval();
                if iv.excludes(scenario.true_mean) {
                    covered_all = false;
                }
                if let Some(e) = companion.as_mut() {
                    if !decided {
                        e.update(x)?;
                        if e.evalue().decision {
                            decided = true;
                        }
                    }
                }
                if stopped_at.is_none() && stopping.should_stop(&iv, t) {
                    stopped_at = Some(t);
                    break;
                }
            }

            let iv = cs.interval();
            if covered_all {
                covered_anytime += 1;
            }
            if !iv.excludes(scenario.true_mean) {
                covered_final += 1;
            }
            if decided {
                decision_count += 1;
            }
            if let Some(t) = stopped_at {
                stopped_count += 1;
                stop_times.push(t);
            } else {
                stop_times.push(scenario.n_max);
            }
            widths.push(iv.width());
        }

        Ok(self.aggregate(
            scenario.is_null,
            covered_anytime,
            covered_final,
            stopped_count,
            decision_count,
            &widths,
            &mut stop_times,
        ))
    }

    /// Run a two-sample cell.
    ///
    /// # Errors
    ///
    /// As [`AtlasRunner::run_one_sample`]; additionally rejects one-sample
    /// methods.
    pub fn run_two_sample(
        &self,
        scenario: &ABScenario,
        spec: &ABSpec,
        method: Method,
        stopping: StoppingRule,
    ) -> Result<Metrics, AtlasError> {
        match method {
            Method::TwoSampleHoeffdingCS => {
                self.run_two_sample_with::<HoeffdingCS>(scenario, spec, stopping)
            }
            Method::TwoSampleEmpiricalBernsteinCS => {
                self.run_two_sample_with::<EmpiricalBernsteinCS>(scenario, spec, stopping)
            }
            other => Err(AtlasError::Config(ConfigError::Invalid {
                message: format!("{} is not a two-sample method", other.as_str()),
            })),
        }
    }

    fn run_two_sample_with<C: ConfidenceSequence>(
        &self,
        scenario: &ABScenario,
        spec: &ABSpec,
        stopping: StoppingRule,
    ) -> Result<Metrics, AtlasError> {
        let mut cs = TwoSampleCS::<C>::new(spec.clone())?;

        let mut covered_anytime = 0u64;
        let mut covered_final = 0u64;
        let mut stopped_count = 0u64;
        let mut widths = Vec::with_capacity(self.n_sim as usize);
        let mut stop_times = Vec::with_capacity(self.n_sim as usize);

        for rep in 0..self.n_sim {
            cs.reset();
            let data = scenario.generate(scenario.n_max, rep)?;

            let mut covered_all = true;
            let mut stopped_at = None;

            for (i, &(arm, x)) in data.iter().enumerate() {
                let t = i as u64 + 1;
                cs.update(arm, x)?;
                let iv = cs.interval();
                if iv.excludes(scenario.true_lift) {
                    covered_all = false;
                }
                if stopped_at.is_none() && stopping.should_stop(&iv, t) {
                    stopped_at = Some(t);
                    break;
                }
            }

            let iv = cs.interval();
            if covered_all {
                covered_anytime += 1;
            }
            if !iv.excludes(scenario.true_lift) {
                covered_final += 1;
            }
            if let Some(t) = stopped_at {
                stopped_count += 1;
                stop_times.push(t);
            } else {
                stop_times.push(scenario.n_max);
            }
            widths.push(iv.width());
        }

        Ok(self.aggregate(
            scenario.is_null,
            covered_anytime,
            covered_final,
            stopped_count,
            0,
            &widths,
            &mut stop_times,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn aggregate(
        &self,
        is_null: bool,
        covered_anytime: u64,
        covered_final: u64,
        stopped_count: u64,
        decision_count: u64,
        widths: &[f64],
        stop_times: &mut [u64],
    ) -> Metrics {
        let n = self.n_sim as f64;
        let stop_rate = stopped_count as f64 / n;
        Metrics {
            coverage: covered_anytime as f64 / n,
            final_coverage: covered_final as f64 / n,
            type_i_error: if is_null { stop_rate } else { 0.0 },
            power: if is_null { 0.0 } else { stop_rate },
            avg_width: widths.iter().sum::<f64>() / n,
            median_stop_time: median(stop_times),
            evalue_decision_rate: decision_count as f64 / n,
        }
    }
}

fn median(values: &mut [u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) as f64 / 2.0
    } else {
        values[mid] as f64
    }
}

fn build_one_sample(
    method: Method,
    spec: StreamSpec,
) -> Result<Box<dyn ConfidenceSequence>, AtlasError> {
    let cs: Box<dyn ConfidenceSequence> = match method {
        Method::HoeffdingCS => Box::new(HoeffdingCS::from_spec(spec)?),
        Method::EmpiricalBernsteinCS => Box::new(EmpiricalBernsteinCS::from_spec(spec)?),
        Method::BernoulliMixtureCS => Box::new(BernoulliMixtureCS::from_spec(spec)?),
        other => {
            return Err(AtlasError::Config(ConfigError::Invalid {
                message: format!("{} is not a one-sample method", other.as_str()),
            }))
        }
    };
    Ok(cs)
}
