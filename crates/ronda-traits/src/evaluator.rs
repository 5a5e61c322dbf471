//! Significance estimator trait for return series.
//!
//! This module defines the `TStatEstimator` trait: given a time series of
//! portfolio returns and a lag, produce the mean and a t-statistic for it.
//! Estimators differ in how the standard error of the mean accounts for serial
//! correlation, which overlapping holding periods induce by construction.

use serde::{Deserialize, Serialize};

/// Mean and t-statistic of a return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TStat {
    /// Mean of the finite observations.
    pub mean: f64,
    /// Mean divided by its standard error; `NaN` when undefined.
    pub t_stat: f64,
    /// Number of finite observations used.
    pub n_obs: usize,
}

impl TStat {
    /// Placeholder for a statistic that could not be computed.
    pub const fn undefined() -> Self {
        Self {
            mean: f64::NAN,
            t_stat: f64::NAN,
            n_obs: 0,
        }
    }

    /// Whether both the mean and the t-statistic are finite.
    pub const fn is_defined(&self) -> bool {
        self.mean.is_finite() && self.t_stat.is_finite()
    }
}

impl Default for TStat {
    fn default() -> Self {
        Self::undefined()
    }
}

/// Estimates the mean of a return series and its t-statistic.
///
/// Undefined observations are encoded as `NaN` and must be ignored.
/// Implementations never fail: degenerate inputs produce `NaN` statistics.
///
/// # Example
///
/// ```no_run
/// use ronda_traits::{TStat, TStatEstimator};
/// use ronda_traits::stats::{mean, ratio_to_std_error, sample_std};
///
/// struct Naive;
///
/// impl TStatEstimator for Naive {
///     fn name(&self) -> &str {
///         "naive"
///     }
///
///     fn estimate(&self, series: &[f64], _lag: usize) -> TStat {
///         let n = series.iter().filter(|x| x.is_finite()).count();
///         let m = mean(series);
///         let se = sample_std(series) / (n as f64).sqrt();
///         TStat { mean: m, t_stat: ratio_to_std_error(m, se), n_obs: n }
///     }
/// }
/// ```
pub trait TStatEstimator: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Estimates mean and t-statistic, allowing for serial correlation up to `lag`.
    fn estimate(&self, series: &[f64], lag: usize) -> TStat;
}
