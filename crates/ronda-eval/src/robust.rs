//! Significance estimators for portfolio return series.
//!
//! Overlapping holding periods make consecutive portfolio returns share
//! cohorts, so their errors are serially correlated up to K - 1 periods. The
//! Newey–West estimator widens the standard error of the mean accordingly.

use ronda_traits::stats::{finite_values, mean, ratio_to_std_error, sample_std};
use ronda_traits::{EstimatorKind, TStat, TStatEstimator};
use serde::{Deserialize, Serialize};

/// Plain t-statistic: mean / (s / sqrt(n)). Ignores `lag`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTStat;

impl TStatEstimator for SimpleTStat {
    fn name(&self) -> &str {
        "simple"
    }

    fn estimate(&self, series: &[f64], _lag: usize) -> TStat {
        let values = finite_values(series);
        let n = values.len();
        if n == 0 {
            return TStat::undefined();
        }

        let m = mean(&values);
        let se = sample_std(&values) / (n as f64).sqrt();

        TStat {
            mean: m,
            t_stat: ratio_to_std_error(m, se),
            n_obs: n,
        }
    }
}

/// Configuration for the Newey–West estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeweyWestConfig {
    /// Scale the long-run variance by n / (n - 1) so that lag 0 reproduces the
    /// simple t-statistic; shrinks t by `sqrt((n - 1) / n)` relative to the
    /// uncorrected estimate
    pub small_sample_correction: bool,
    /// Below this many observations the simple t-statistic is used instead
    pub min_observations: usize,
}

impl Default for NeweyWestConfig {
    fn default() -> Self {
        Self {
            small_sample_correction: true,
            min_observations: 5,
        }
    }
}

/// Newey–West HAC t-statistic of the mean with Bartlett weights.
///
/// Regresses the series on a constant. The long-run variance of the residuals
/// `e` is
///
/// ```text
/// S = sum(e_t^2) + 2 * sum_{l=1..L} (1 - l / (L + 1)) * sum_t e_t e_{t-l}
/// ```
///
/// and the variance of the mean is `S / n^2`. `NaN` observations are dropped
/// before estimation. Lags of `n` or more contribute nothing but still set the
/// Bartlett bandwidth.
///
/// With the default [`NeweyWestConfig`] the variance is also scaled by
/// `n / (n - 1)`, so t-statistics come out smaller by a factor of
/// `sqrt((n - 1) / n)` than an uncorrected HAC estimate such as statsmodels'
/// default.
#[derive(Debug, Clone, Default)]
pub struct NeweyWest {
    config: NeweyWestConfig,
}

impl NeweyWest {
    /// Create an estimator with the given configuration.
    pub const fn new(config: NeweyWestConfig) -> Self {
        Self { config }
    }

    /// Bartlett weight of lag `l` under bandwidth `lag`.
    fn weight(l: usize, lag: usize) -> f64 {
        1.0 - l as f64 / (lag as f64 + 1.0)
    }

    /// Long-run variance of the demeaned series.
    ///
    /// Autocovariances at `n` or beyond are zero; weights keep the full `lag`.
    fn long_run_variance(residuals: &[f64], lag: usize) -> f64 {
        let gamma = |l: usize| -> f64 {
            residuals[l..]
                .iter()
                .zip(residuals)
                .map(|(a, b)| a * b)
                .sum()
        };

        let last = lag.min(residuals.len().saturating_sub(1));
        (1..=last).fold(gamma(0), |s, l| s + 2.0 * Self::weight(l, lag) * gamma(l))
    }
}

impl TStatEstimator for NeweyWest {
    fn name(&self) -> &str {
        "newey-west"
    }

    fn estimate(&self, series: &[f64], lag: usize) -> TStat {
        let values = finite_values(series);
        let n = values.len();
        if n < self.config.min_observations.max(2) {
            return SimpleTStat.estimate(&values, lag);
        }

        let m = mean(&values);
        let residuals: Vec<f64> = values.iter().map(|x| x - m).collect();
        let nf = n as f64;

        let mut variance = Self::long_run_variance(&residuals, lag) / (nf * nf);
        if self.config.small_sample_correction {
            variance *= nf / (nf - 1.0);
        }
        let se = if variance > 0.0 { variance.sqrt() } else { 0.0 };

        TStat {
            mean: m,
            t_stat: ratio_to_std_error(m, se),
            n_obs: n,
        }
    }
}

/// Boxed estimator for a configured kind.
pub fn estimator_for(kind: EstimatorKind) -> Box<dyn TStatEstimator> {
    match kind {
        EstimatorKind::NeweyWest => Box::new(NeweyWest::default()),
        EstimatorKind::Simple => Box::new(SimpleTStat),
    }
}
