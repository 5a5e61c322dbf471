//! Trailing cumulative-return signal over a window of J periods.

use ronda_traits::{FormationSignal, Period, ReturnSeries, ReturnTable, SignalPanel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the cumulative-return signal.
///
/// The signal attributed to period `t` compounds the returns of periods
/// `[t - skip - window, t - skip - 1]`, so it never sees the return of `t` itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumulativeReturnConfig {
    /// Number of periods compounded (J)
    pub window: usize,

    /// Valid periods required inside the window; `None` requires all of them
    pub min_periods: Option<usize>,

    /// Periods skipped between the window and the formation period (default: 0)
    pub skip_periods: usize,
}

impl Default for CumulativeReturnConfig {
    fn default() -> Self {
        Self {
            window: 6,
            min_periods: None,
            skip_periods: 0,
        }
    }
}

/// Trailing compounded return, lagged one period.
///
/// Each return `r` is turned into log growth `ln(1 + r)`; returns at or below
/// -100% count as missing. The log growth of the window is summed and mapped back
/// with `exp(x) - 1`.
///
/// # Example
///
/// ```ignore
/// use ronda_signals::momentum::CumulativeReturn;
///
/// let signal = CumulativeReturn::with_window(6);
/// let panel = signal.compute(&table);
/// ```
#[derive(Debug, Clone)]
pub struct CumulativeReturn {
    config: CumulativeReturnConfig,
}

impl CumulativeReturn {
    /// Create a new cumulative-return signal with the given configuration.
    #[must_use]
    pub const fn new(config: CumulativeReturnConfig) -> Self {
        Self { config }
    }

    /// Signal over `window` periods requiring every period to be present.
    #[must_use]
    pub const fn with_window(window: usize) -> Self {
        Self::new(CumulativeReturnConfig {
            window,
            min_periods: None,
            skip_periods: 0,
        })
    }

    /// Get the window length in periods.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.config.window
    }

    /// Get the number of valid periods required in the window.
    #[must_use]
    pub fn min_periods(&self) -> usize {
        let window = self.config.window.max(1);
        self.config.min_periods.unwrap_or(window).clamp(1, window)
    }

    /// Get the number of skipped periods.
    #[must_use]
    pub const fn skip_periods(&self) -> usize {
        self.config.skip_periods
    }

    /// Computes the signal for one security, pushing into `panel`.
    fn compute_series(&self, id: usize, series: &ReturnSeries, panel: &mut SignalPanel) {
        let growth: Vec<Option<f64>> = series
            .values()
            .iter()
            .map(|r| r.filter(|&r| r > -1.0).map(f64::ln_1p))
            .collect();

        let window = self.config.window as i64;
        let lag = self.config.skip_periods as i64 + 1;
        let required = self.min_periods();

        for (i, _) in growth.iter().enumerate() {
            let last = i as i64 - lag;
            let first = last - window + 1;

            let (sum, valid) = (first..=last)
                .filter_map(|k| usize::try_from(k).ok().and_then(|k| growth[k]))
                .fold((0.0, 0usize), |(sum, n), g| (sum + g, n + 1));

            if self.config.window > 0 && valid >= required {
                panel.insert(series.start().offset(i as i64), id, sum.exp_m1());
            } else if first < 0 || self.config.window == 0 {
                panel.note_insufficient_history();
            } else {
                panel.note_gapped_window();
            }
        }
    }
}

impl Default for CumulativeReturn {
    fn default() -> Self {
        Self::new(CumulativeReturnConfig::default())
    }
}

impl FormationSignal for CumulativeReturn {
    fn name(&self) -> &str {
        "cumulative_return"
    }

    fn lookback(&self) -> usize {
        self.config.window + self.config.skip_periods
    }

    fn compute(&self, table: &ReturnTable) -> SignalPanel {
        let mut panel = SignalPanel::new(self.config.window);

        for (id, series) in table.iter() {
            self.compute_series(id, series, &mut panel);
        }

        debug!(
            window = self.config.window,
            records = panel.len(),
            insufficient = panel.insufficient_history(),
            gapped = panel.gapped_windows(),
            first = ?panel.periods().next().map(Period::ordinal),
            "computed cumulative-return signal"
        );

        panel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::{Frequency, ReturnRecord};

    fn table(rows: &[(&str, &[Option<f64>])]) -> ReturnTable {
        let records = rows.iter().flat_map(|(symbol, rets)| {
            rets.iter()
                .enumerate()
                .map(move |(i, r)| ReturnRecord::new(*symbol, Period::new(i as i64), *r))
        });
        ReturnTable::from_records(Frequency::Monthly, records).unwrap()
    }

    fn p(n: i64) -> Period {
        Period::new(n)
    }

    #[test]
    fn test_default_config() {
        let config = CumulativeReturnConfig::default();
        assert_eq!(config.window, 6);
        assert_eq!(config.min_periods, None);
        assert_eq!(config.skip_periods, 0);
    }

    #[test]
    fn test_custom_config() {
        let signal = CumulativeReturn::new(CumulativeReturnConfig {
            window: 12,
            min_periods: Some(20),
            skip_periods: 1,
        });
        assert_eq!(signal.window(), 12);
        assert_eq!(signal.min_periods(), 12);
        assert_eq!(signal.skip_periods(), 1);
        assert_eq!(signal.lookback(), 13);
    }

    #[test]
    fn test_compounds_previous_window() {
        let rets = [Some(0.10), Some(-0.05), Some(0.20), Some(0.03), Some(0.50)];
        let t = table(&[("A", &rets)]);
        let panel = CumulativeReturn::with_window(3).compute(&t);

        // First complete window ends at period 2, so the first signal is at period 3
        assert_eq!(panel.value(p(2), 0), None);
        let expected = 1.10 * 0.95 * 1.20 - 1.0;
        assert_relative_eq!(panel.value(p(3), 0).unwrap(), expected, epsilon = 1e-12);
        let expected = 0.95 * 1.20 * 1.03 - 1.0;
        assert_relative_eq!(panel.value(p(4), 0).unwrap(), expected, epsilon = 1e-12);
        // No signal past the last listed period
        assert_eq!(panel.value(p(5), 0), None);
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.insufficient_history(), 3);
    }

    #[test]
    fn test_total_loss_voids_following_signals_only() {
        let rets = [
            Some(0.01),
            Some(0.02),
            Some(0.03),
            Some(-1.0),
            Some(0.01),
            Some(0.02),
            Some(0.03),
            Some(0.04),
        ];
        let t = table(&[("A", &rets)]);
        let panel = CumulativeReturn::with_window(3).compute(&t);

        // Window [0, 2] is clean: signal at 3 is defined
        assert!(panel.value(p(3), 0).is_some());
        // Windows containing period 3 feed periods 4, 5 and 6
        assert_eq!(panel.value(p(4), 0), None);
        assert_eq!(panel.value(p(5), 0), None);
        assert_eq!(panel.value(p(6), 0), None);
        assert!(panel.value(p(7), 0).is_some());
    }

    #[test]
    fn test_signal_never_uses_own_period() {
        let rets: Vec<Option<f64>> = (0..12).map(|i| Some(0.01 * i as f64 - 0.03)).collect();
        let t = table(&[("A", &rets)]);
        let signal = CumulativeReturn::with_window(4);
        let before = signal.compute(&t);

        let shocked = t.with_return(0, p(6), Some(0.75)).unwrap();
        let after = signal.compute(&shocked);

        assert_eq!(before.value(p(6), 0), after.value(p(6), 0));
        for k in 7..=10 {
            assert_ne!(before.value(p(k), 0), after.value(p(k), 0), "period {k}");
        }
        assert_eq!(before.value(p(11), 0), after.value(p(11), 0));
    }

    #[test]
    fn test_gap_voids_exactly_the_covering_windows() {
        let mut rets: Vec<Option<f64>> = vec![Some(0.01); 20];
        rets[8] = None;
        let t = table(&[("A", &rets)]);
        let panel = CumulativeReturn::with_window(6).compute(&t);

        for k in 6..20 {
            let covers_gap = (k - 6..k).contains(&8);
            assert_eq!(panel.value(p(k), 0).is_none(), covers_gap, "period {k}");
        }
        assert!(panel.value(p(8), 0).is_some());
        assert!(panel.value(p(15), 0).is_some());

        // Six short windows at the start, six more voided by the gap
        assert_eq!(panel.insufficient_history(), 6);
        assert_eq!(panel.gapped_windows(), 6);
    }

    #[test]
    fn test_min_periods_relaxes_window() {
        let rets = [Some(0.10), None, Some(0.10), Some(0.0)];
        let t = table(&[("A", &rets)]);
        let signal = CumulativeReturn::new(CumulativeReturnConfig {
            window: 3,
            min_periods: Some(2),
            skip_periods: 0,
        });
        let panel = signal.compute(&t);
        assert_relative_eq!(panel.value(p(3), 0).unwrap(), 1.1 * 1.1 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_skip_periods_shift_window() {
        let rets = [Some(0.10), Some(0.20), Some(0.30), Some(0.40)];
        let t = table(&[("A", &rets)]);
        let signal = CumulativeReturn::new(CumulativeReturnConfig {
            window: 2,
            min_periods: None,
            skip_periods: 1,
        });
        let panel = signal.compute(&t);
        assert_eq!(panel.value(p(2), 0), None);
        assert_relative_eq!(panel.value(p(3), 0).unwrap(), 1.1 * 1.2 - 1.0, epsilon = 1e-12);
    }
}
