//! Overlapping-cohort portfolio returns.
//!
//! With a holding length of K periods, the portfolio held in period `t` is made
//! of the K cohorts formed at `t, t-1, ..., t-(K-1)`. For every bucket, the
//! members of all active cohorts are pooled and the bucket's return in `t` is
//! the equal-weighted mean of their returns in `t`.
//!
//! Pooling concatenates cohorts without removing duplicates: a security held by
//! several active cohorts contributes once per cohort, which weights it by the
//! number of cohorts holding it.

use crate::buckets::BucketHistory;
use ndarray::Array2;
use polars::prelude::*;
use rayon::prelude::*;
use ronda_traits::stats::difference;
use ronda_traits::{Diagnostics, Frequency, Period, Result, ReturnTable, RondaError};
use tracing::debug;

/// Bucket returns of one (signal window, holding length) pair.
///
/// A dense `periods x buckets` matrix; undefined cells are `NaN`. Rows whose
/// period had no active cohort are entirely `NaN`.
#[derive(Debug, Clone)]
pub struct PortfolioReturns {
    signal_window: usize,
    holding_period: usize,
    periods: Vec<Period>,
    returns: Array2<f64>,
    active_cohorts: Vec<usize>,
    diagnostics: Diagnostics,
}

impl PortfolioReturns {
    /// Signal window J.
    pub const fn signal_window(&self) -> usize {
        self.signal_window
    }

    /// Holding length K.
    pub const fn holding_period(&self) -> usize {
        self.holding_period
    }

    /// Number of buckets (matrix columns).
    pub fn n_buckets(&self) -> usize {
        self.returns.ncols()
    }

    /// Evaluation periods (matrix rows).
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// The `periods x buckets` return matrix.
    pub const fn returns(&self) -> &Array2<f64> {
        &self.returns
    }

    /// Active cohorts per evaluation period.
    pub fn active_cohorts(&self) -> &[usize] {
        &self.active_cohorts
    }

    /// Evaluation periods that had at least one active cohort.
    pub fn defined_periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.periods
            .iter()
            .zip(&self.active_cohorts)
            .filter(|(_, active)| **active > 0)
            .map(|(p, _)| *p)
    }

    /// Non-fatal conditions met while building this series.
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Return series of one bucket (1-based). Out-of-range buckets are all `NaN`.
    pub fn bucket(&self, bucket: usize) -> Vec<f64> {
        if bucket == 0 || bucket > self.n_buckets() {
            return vec![f64::NAN; self.periods.len()];
        }
        self.returns.column(bucket - 1).to_vec()
    }

    /// Returns of the lowest-signal bucket.
    pub fn lowest(&self) -> Vec<f64> {
        self.bucket(1)
    }

    /// Returns of the highest-signal bucket.
    pub fn highest(&self) -> Vec<f64> {
        self.bucket(self.n_buckets())
    }

    /// Highest minus lowest, `NaN` where either side is undefined.
    pub fn spread(&self) -> Vec<f64> {
        difference(&self.highest(), &self.lowest())
    }

    /// Return of `bucket` (1-based) in `period`.
    pub fn get(&self, period: Period, bucket: usize) -> Option<f64> {
        let row = self.periods.binary_search(&period).ok()?;
        let value = *self.returns.get((row, bucket.checked_sub(1)?))?;
        value.is_finite().then_some(value)
    }

    /// The matrix as a DataFrame with a `period_end` column and one `b{n}` column
    /// per bucket; undefined cells are null.
    pub fn to_dataframe(&self, frequency: Frequency) -> Result<DataFrame> {
        let dates = self
            .periods
            .iter()
            .map(|&p| {
                frequency
                    .period_end(p)
                    .ok_or_else(|| RondaError::InvalidDate(format!("period {p} out of range")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut columns: Vec<Column> = Vec::with_capacity(self.n_buckets() + 1);
        columns.push(Series::new("period_end".into(), dates).into());
        for (i, col) in self.returns.columns().into_iter().enumerate() {
            let values: Vec<Option<f64>> = col.iter().map(|v| v.is_finite().then_some(*v)).collect();
            columns.push(Series::new(format!("b{}", i + 1).into(), values).into());
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// One evaluation period worth of bucket means.
struct Row {
    values: Vec<f64>,
    active: usize,
    gaps: usize,
}

/// Pools overlapping cohorts into per-period bucket returns.
#[derive(Debug, Clone, Copy)]
pub struct OverlapAggregator {
    holding_period: usize,
}

impl OverlapAggregator {
    /// Create an aggregator holding each cohort for `holding_period` periods.
    pub fn new(holding_period: usize) -> Self {
        Self {
            holding_period: holding_period.max(1),
        }
    }

    /// Holding length K.
    pub const fn holding_period(&self) -> usize {
        self.holding_period
    }

    /// Bucket returns for each evaluation period.
    ///
    /// Periods are independent of each other and computed in parallel.
    pub fn aggregate(
        &self,
        history: &BucketHistory,
        table: &ReturnTable,
        periods: &[Period],
        signal_window: usize,
    ) -> PortfolioReturns {
        let n_buckets = history.n_buckets();

        let rows: Vec<Row> = periods
            .par_iter()
            .map(|&t| self.row(history, table, t))
            .collect();

        let mut returns = Array2::from_elem((periods.len(), n_buckets), f64::NAN);
        let mut active_cohorts = Vec::with_capacity(rows.len());
        let mut diagnostics = Diagnostics::default();

        for (i, row) in rows.into_iter().enumerate() {
            if row.active == 0 {
                diagnostics.inactive_periods += 1;
            }
            diagnostics.data_gaps += row.gaps;
            for (b, value) in row.values.into_iter().enumerate() {
                returns[[i, b]] = value;
            }
            active_cohorts.push(row.active);
        }

        debug!(
            j = signal_window,
            k = self.holding_period,
            periods = periods.len(),
            inactive = diagnostics.inactive_periods,
            gaps = diagnostics.data_gaps,
            "aggregated overlapping cohorts"
        );

        PortfolioReturns {
            signal_window,
            holding_period: self.holding_period,
            periods: periods.to_vec(),
            returns,
            active_cohorts,
            diagnostics,
        }
    }

    fn row(&self, history: &BucketHistory, table: &ReturnTable, t: Period) -> Row {
        let n_buckets = history.n_buckets();
        let mut sums = vec![0.0; n_buckets];
        let mut counts = vec![0usize; n_buckets];
        let mut active = 0;
        let mut gaps = 0;

        for h in 0..self.holding_period {
            let Some(cohort) = history.get(t.offset(-(h as i64))) else {
                continue;
            };
            active += 1;

            for &(security, bucket) in &cohort.members {
                match table.return_at(security, t) {
                    Some(r) => {
                        sums[bucket - 1] += r;
                        counts[bucket - 1] += 1;
                    }
                    None => gaps += 1,
                }
            }
        }

        let values = sums
            .iter()
            .zip(&counts)
            .map(|(&sum, &n)| if n > 0 { sum / n as f64 } else { f64::NAN })
            .collect();

        Row {
            values,
            active,
            gaps,
        }
    }
}
