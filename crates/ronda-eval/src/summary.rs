//! Per-strategy statistics of the lowest bucket, highest bucket and spread.

use crate::overlap::PortfolioReturns;
use ronda_traits::{TStat, TStatEstimator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Portfolio leg reported for every (J, K) strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Bucket 1, the past losers.
    Lowest,
    /// Bucket B, the past winners.
    Highest,
    /// Highest minus lowest.
    Spread,
}

impl Role {
    /// All roles in report order.
    pub const ALL: [Self; 3] = [Self::Lowest, Self::Highest, Self::Spread];

    /// Row label used in reports.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Lowest => "Sell",
            Self::Highest => "Buy",
            Self::Spread => "Buy-sell",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mean and t-statistic of each role for one (J, K) strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    /// Signal window J
    pub signal_window: usize,
    /// Holding length K
    pub holding_period: usize,
    /// HAC lag used
    pub lag: usize,
    /// Bucket 1 statistics
    pub lowest: TStat,
    /// Bucket B statistics
    pub highest: TStat,
    /// Spread statistics
    pub spread: TStat,
}

impl StrategySummary {
    /// Summarises portfolio returns with `estimator` at `lag`.
    pub fn from_returns(returns: &PortfolioReturns, estimator: &dyn TStatEstimator, lag: usize) -> Self {
        Self {
            signal_window: returns.signal_window(),
            holding_period: returns.holding_period(),
            lag,
            lowest: estimator.estimate(&returns.lowest(), lag),
            highest: estimator.estimate(&returns.highest(), lag),
            spread: estimator.estimate(&returns.spread(), lag),
        }
    }

    /// Summary with every statistic undefined.
    pub const fn undefined(signal_window: usize, holding_period: usize, lag: usize) -> Self {
        Self {
            signal_window,
            holding_period,
            lag,
            lowest: TStat::undefined(),
            highest: TStat::undefined(),
            spread: TStat::undefined(),
        }
    }

    /// Statistics of one role.
    pub const fn get(&self, role: Role) -> &TStat {
        match role {
            Role::Lowest => &self.lowest,
            Role::Highest => &self.highest,
            Role::Spread => &self.spread,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buckets::Bucketizer;
    use crate::overlap::OverlapAggregator;
    use crate::robust::SimpleTStat;
    use approx::assert_relative_eq;
    use ronda_traits::{Frequency, Period, ReturnRecord, ReturnTable, SignalPanel};

    #[test]
    fn test_labels() {
        assert_eq!(Role::Lowest.label(), "Sell");
        assert_eq!(Role::Highest.to_string(), "Buy");
        assert_eq!(Role::Spread.label(), "Buy-sell");
        assert_eq!(Role::ALL[0], Role::Lowest);
    }

    #[test]
    fn test_from_returns() {
        // HI always beats LO by at least 2%
        let records = (0..8).flat_map(|t| {
            let base = 0.001 * t as f64;
            [
                ReturnRecord::new("LO", Period::new(t), Some(base)),
                ReturnRecord::new("HI", Period::new(t), Some(base + 0.02 + 0.001 * (t % 3) as f64)),
            ]
        });
        let table = ReturnTable::from_records(Frequency::Monthly, records).unwrap();
        let (hi, lo) = (table.id_of("HI").unwrap(), table.id_of("LO").unwrap());

        let mut panel = SignalPanel::new(1);
        for t in 0..8 {
            panel.insert(Period::new(t), lo, -1.0);
            panel.insert(Period::new(t), hi, 1.0);
        }
        let history = Bucketizer::new(2).bucketize(&panel);
        let periods: Vec<Period> = (0..8).map(Period::new).collect();
        let returns = OverlapAggregator::new(1).aggregate(&history, &table, &periods, 1);

        let summary = StrategySummary::from_returns(&returns, &SimpleTStat, 0);
        assert_eq!(summary.signal_window, 1);
        assert_eq!(summary.holding_period, 1);
        assert_eq!(summary.lowest.n_obs, 8);
        assert!(summary.get(Role::Spread).mean > 0.02);
        assert!(summary.spread.t_stat > 0.0);
        assert_relative_eq!(
            summary.spread.mean,
            summary.highest.mean - summary.lowest.mean,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_undefined() {
        let summary = StrategySummary::undefined(3, 6, 5);
        assert!(Role::ALL.iter().all(|&r| !summary.get(r).is_defined()));
        assert_eq!(summary.lag, 5);
    }
}
