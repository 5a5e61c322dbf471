//! Momentum study runner.
//!
//! Runs every (signal window, holding length) strategy of a [`StudyConfig`] over
//! one return table. Signals and bucket assignments are built once per signal
//! window and shared by all of its holding lengths.

use crate::buckets::{BucketHistory, Bucketizer};
use crate::overlap::{OverlapAggregator, PortfolioReturns};
use crate::robust::estimator_for;
use crate::summary::StrategySummary;
use rayon::prelude::*;
use ronda_signals::{CumulativeReturn, CumulativeReturnConfig};
use ronda_traits::{
    Diagnostics, FormationSignal, Period, Result, ReturnTable, RondaError, StudyConfig,
    TStatEstimator,
};
use tracing::{info, warn};

/// Output of one (J, K) strategy.
#[derive(Debug, Clone)]
pub struct StrategyResult {
    /// Bucket returns per evaluation period
    pub returns: PortfolioReturns,
    /// Mean and t-statistic of each role
    pub summary: StrategySummary,
}

impl StrategyResult {
    /// Signal window J.
    pub const fn signal_window(&self) -> usize {
        self.summary.signal_window
    }

    /// Holding length K.
    pub const fn holding_period(&self) -> usize {
        self.summary.holding_period
    }

    /// Non-fatal conditions met while aggregating this strategy.
    ///
    /// Signal-level counters are shared by every holding length of a window
    /// and live in [`StudyResults::window_diagnostics`] instead.
    pub const fn diagnostics(&self) -> &Diagnostics {
        self.returns.diagnostics()
    }
}

/// Results of every configured strategy, ordered by J then K.
#[derive(Debug, Clone)]
pub struct StudyResults {
    config: StudyConfig,
    windows: Vec<(usize, Diagnostics)>,
    strategies: Vec<StrategyResult>,
}

impl StudyResults {
    pub(crate) const fn from_parts(
        config: StudyConfig,
        windows: Vec<(usize, Diagnostics)>,
        strategies: Vec<StrategyResult>,
    ) -> Self {
        Self {
            config,
            windows,
            strategies,
        }
    }

    /// Configuration the study ran with.
    pub const fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// All strategies.
    pub fn strategies(&self) -> &[StrategyResult] {
        &self.strategies
    }

    /// Strategy for signal window `j` and holding length `k`.
    pub fn get(&self, j: usize, k: usize) -> Option<&StrategyResult> {
        self.strategies
            .iter()
            .find(|s| s.signal_window() == j && s.holding_period() == k)
    }

    /// Signal and bucketing counters of each signal window, in configured order.
    pub fn windows(&self) -> &[(usize, Diagnostics)] {
        &self.windows
    }

    /// Signal and bucketing counters of signal window `j`.
    pub fn window_diagnostics(&self, j: usize) -> Option<&Diagnostics> {
        self.windows
            .iter()
            .find(|(window, _)| *window == j)
            .map(|(_, d)| d)
    }

    /// Diagnostics of the whole study: each window's signal counters once,
    /// plus the aggregation counters of every strategy.
    pub fn diagnostics(&self) -> Diagnostics {
        let windows = self.windows.iter().map(|(_, d)| d);
        let strategies = self.strategies.iter().map(StrategyResult::diagnostics);
        windows
            .chain(strategies)
            .fold(Diagnostics::default(), |mut acc, d| {
                acc.merge(d);
                acc
            })
    }
}

/// Momentum study over a grid of signal windows and holding lengths.
#[derive(Debug, Clone)]
pub struct Study {
    config: StudyConfig,
}

impl Study {
    /// Create a study, rejecting an invalid configuration.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use ronda_eval::Study;
    /// use ronda_traits::StudyConfig;
    ///
    /// let study = Study::new(StudyConfig::default())?;
    /// let results = study.run(&table)?;
    /// ```
    pub fn new(config: StudyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the study configuration.
    pub const fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// Run every strategy against `table`.
    ///
    /// # Errors
    ///
    /// Fails only when the table cannot serve the configuration: it is empty,
    /// or it was built at a different frequency.
    pub fn run(&self, table: &ReturnTable) -> Result<StudyResults> {
        if table.is_empty() {
            return Err(RondaError::Configuration(
                "return table has no securities".to_string(),
            ));
        }
        if table.frequency() != self.config.frequency {
            return Err(RondaError::Configuration(format!(
                "return table is {} but the study is configured for {}",
                table.frequency(),
                self.config.frequency
            )));
        }

        let periods = self.config.evaluation_periods();
        let estimator = estimator_for(self.config.estimator);

        info!(
            securities = table.len(),
            periods = periods.len(),
            windows = ?self.config.signal_windows,
            holdings = ?self.config.holding_periods,
            buckets = self.config.n_buckets,
            estimator = estimator.name(),
            "starting momentum study"
        );

        let runs: Vec<(Diagnostics, Vec<StrategyResult>)> = self
            .config
            .signal_windows
            .par_iter()
            .map(|&j| self.run_window(table, j, &periods, estimator.as_ref()))
            .collect();

        let mut windows = Vec::with_capacity(runs.len());
        let mut strategies = Vec::new();
        for (&j, (diagnostics, results)) in self.config.signal_windows.iter().zip(runs) {
            windows.push((j, diagnostics));
            strategies.extend(results);
        }

        let results = StudyResults::from_parts(self.config.clone(), windows, strategies);

        let diagnostics = results.diagnostics();
        info!(
            strategies = results.strategies.len(),
            data_gaps = diagnostics.data_gaps,
            insufficient_history = diagnostics.insufficient_history,
            signal_gaps = diagnostics.signal_gaps,
            degenerate = diagnostics.degenerate_cross_sections,
            "momentum study complete"
        );

        Ok(results)
    }

    /// Builds the signal and bucket history for `j`, then every holding length.
    fn run_window(
        &self,
        table: &ReturnTable,
        j: usize,
        periods: &[Period],
        estimator: &dyn TStatEstimator,
    ) -> (Diagnostics, Vec<StrategyResult>) {
        let signal = CumulativeReturn::new(CumulativeReturnConfig {
            window: j,
            min_periods: Some(self.config.min_periods_for(j)),
            skip_periods: self.config.skip_periods,
        });
        let panel = signal.compute(table);
        let history = Bucketizer::new(self.config.n_buckets).bucketize(&panel);

        if history.is_empty() {
            warn!(j, "no formation period could be ranked");
        }

        let diagnostics = Diagnostics {
            insufficient_history: panel.insufficient_history(),
            signal_gaps: panel.gapped_windows(),
            degenerate_cross_sections: history.degenerate_cross_sections(),
            ..Default::default()
        };

        let strategies = self
            .config
            .holding_periods
            .par_iter()
            .map(|&k| self.run_strategy(table, &history, j, k, periods, estimator))
            .collect();

        (diagnostics, strategies)
    }

    fn run_strategy(
        &self,
        table: &ReturnTable,
        history: &BucketHistory,
        j: usize,
        k: usize,
        periods: &[Period],
        estimator: &dyn TStatEstimator,
    ) -> StrategyResult {
        let returns = OverlapAggregator::new(k).aggregate(history, table, periods, j);

        let lag = self.config.lag_for(k);
        let summary = StrategySummary::from_returns(&returns, estimator, lag);

        info!(
            j,
            k,
            lag,
            spread_mean = summary.spread.mean,
            spread_t = summary.spread.t_stat,
            obs = summary.spread.n_obs,
            "strategy evaluated"
        );

        StrategyResult { returns, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ronda_traits::{EstimatorKind, Frequency, ReturnRecord};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Four securities over 15 months; HI1 and HI2 beat LO1 and LO2 by a fixed
    /// log-growth margin every month.
    fn scenario() -> (StudyConfig, ReturnTable) {
        let config = StudyConfig {
            start: date(2000, 1, 1),
            end: date(2001, 3, 31),
            signal_windows: vec![3],
            holding_periods: vec![3],
            n_buckets: 2,
            ..Default::default()
        };

        let first = config.start_period();
        let securities = [("HI1", 0.020), ("HI2", 0.021), ("LO1", 0.0), ("LO2", 0.001)];
        let records = (0..15).flat_map(move |i| {
            let base = 0.01 * ((i as f64) * 1.3).sin();
            securities.into_iter().map(move |(symbol, margin)| {
                ReturnRecord::new(symbol, first.offset(i), Some((base + margin).exp_m1()))
            })
        });
        let table = ReturnTable::from_records(Frequency::Monthly, records).unwrap();
        (config, table)
    }

    #[test]
    fn test_winners_always_in_highest_bucket() {
        let (config, table) = scenario();
        let results = Study::new(config.clone()).unwrap().run(&table).unwrap();
        assert_eq!(results.strategies().len(), 1);

        let strategy = results.get(3, 3).unwrap();
        let returns = &strategy.returns;
        assert_eq!(returns.periods().len(), 15);

        // First signal needs three prior months
        let active = returns.active_cohorts();
        assert_eq!(&active[..5], &[0, 0, 0, 1, 2]);
        assert!(active[5..].iter().all(|&a| a == 3));
        assert_eq!(strategy.diagnostics().inactive_periods, 3);

        let hi: Vec<usize> = ["HI1", "HI2"].iter().filter_map(|s| table.id_of(s)).collect();
        let lo: Vec<usize> = ["LO1", "LO2"].iter().filter_map(|s| table.id_of(s)).collect();
        let panel = CumulativeReturn::with_window(3).compute(&table);
        let history = Bucketizer::new(2).bucketize(&panel);
        for t in history.periods() {
            let cohort = history.get(t).unwrap();
            assert!(hi.iter().all(|&s| cohort.bucket_of(s) == Some(2)));
            assert!(lo.iter().all(|&s| cohort.bucket_of(s) == Some(1)));
        }

        assert!(strategy.summary.spread.mean > 0.0);
        assert!(strategy.summary.highest.mean > strategy.summary.lowest.mean);
        assert_eq!(strategy.summary.lag, 2);
        assert_eq!(strategy.summary.spread.n_obs, 12);
    }

    #[test]
    fn test_full_grid_is_ordered() {
        let (mut config, table) = scenario();
        config.signal_windows = vec![1, 2, 3];
        config.holding_periods = vec![1, 3];
        config.estimator = EstimatorKind::Simple;

        let results = Study::new(config).unwrap().run(&table).unwrap();
        let keys: Vec<(usize, usize)> = results
            .strategies()
            .iter()
            .map(|s| (s.signal_window(), s.holding_period()))
            .collect();
        assert_eq!(keys, vec![(1, 1), (1, 3), (2, 1), (2, 3), (3, 1), (3, 3)]);
        assert!(results.strategies().iter().all(|s| s.summary.spread.mean > 0.0));
    }

    #[test]
    fn test_window_longer_than_history_is_undefined() {
        let (mut config, table) = scenario();
        config.signal_windows = vec![24];

        let results = Study::new(config).unwrap().run(&table).unwrap();
        let strategy = results.get(24, 3).unwrap();
        assert!(!strategy.summary.spread.is_defined());
        assert_eq!(strategy.diagnostics().inactive_periods, 15);
        assert_eq!(strategy.diagnostics().insufficient_history, 0);
        assert_eq!(results.window_diagnostics(24).unwrap().insufficient_history, 4 * 15);
    }

    #[test]
    fn test_signal_diagnostics_counted_once_per_window() {
        let (mut config, table) = scenario();
        config.holding_periods = vec![1, 2, 3];

        let results = Study::new(config).unwrap().run(&table).unwrap();
        assert_eq!(results.strategies().len(), 3);
        assert_eq!(results.windows().len(), 1);

        // Three months of short history for each of four securities
        let window = results.window_diagnostics(3).unwrap();
        assert_eq!(window.insufficient_history, 4 * 3);
        assert_eq!(window.signal_gaps, 0);

        let total = results.diagnostics();
        assert_eq!(total.insufficient_history, 4 * 3);
        assert_eq!(total.degenerate_cross_sections, 0);

        // Inactive periods are per strategy: K = 1, 2, 3 leave 3 inactive each
        assert_eq!(total.inactive_periods, 3 * 3);
    }

    #[test]
    fn test_configuration_errors() {
        let (config, table) = scenario();

        let bad = StudyConfig {
            n_buckets: 1,
            ..config.clone()
        };
        assert!(matches!(Study::new(bad), Err(RondaError::Configuration(_))));

        let weekly = StudyConfig {
            frequency: Frequency::Weekly,
            ..config.clone()
        };
        let err = Study::new(weekly).unwrap().run(&table).unwrap_err();
        assert!(matches!(err, RondaError::Configuration(_)));

        let empty = ReturnTable::from_records(Frequency::Monthly, Vec::new()).unwrap();
        let err = Study::new(config).unwrap().run(&empty).unwrap_err();
        assert!(matches!(err, RondaError::Configuration(_)));
    }
}
