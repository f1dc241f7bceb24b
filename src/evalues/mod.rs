//! Sequential e-processes.
//!
//! An e-process is a nonnegative process with expectation at most 1 under
//! the null at every stopping time, so thresholding at `1/alpha` gives an
//! anytime-valid level-`alpha` test. All internals live in log space;
//! exponentiation happens only at the snapshot boundary, clamped to a
//! finite ceiling, and decisions compare `log E` against `ln(1/alpha)`.

mod bernoulli;
mod twosample;

pub use bernoulli::BernoulliMixtureE;
pub use twosample::TwoSampleMeanMixtureE;

/// Ceiling on `log e` before exponentiation; `exp(700)` is near the f64
/// overflow boundary.
pub(crate) const LOG_E_CAP: f64 = 700.0;

/// Floor on `log e`; anything below exponentiates to zero.
pub(crate) const LOG_E_FLOOR: f64 = -745.0;

/// Exponentiate a log e-value into a finite nonnegative real.
pub(crate) fn clamped_exp(log_e: f64) -> f64 {
    if log_e < LOG_E_FLOOR {
        0.0
    } else {
        log_e.min(LOG_E_CAP).exp()
    }
}

/// Natural log with a finite floor instead of `-inf` at zero.
pub(crate) fn ln_floored(x: f64) -> f64 {
    if x > 0.0 {
        x.ln().max(LOG_E_FLOOR)
    } else {
        LOG_E_FLOOR
    }
}

/// `ln(exp(a) + exp(b))` without overflow.
pub(crate) fn log_sum_exp(a: f64, b: f64) -> f64 {
    let m = a.max(b);
    if m <= LOG_E_FLOOR {
        return LOG_E_FLOOR;
    }
    m + ((a - m).exp() + (b - m).exp()).ln()
}
