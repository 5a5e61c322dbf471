//! Formation signals and the panel they produce.
//!
//! A formation signal turns the [`ReturnTable`] into one value per security and
//! period, using only information available at the start of that period. The
//! result is a [`SignalPanel`]: for every formation period, the cross section of
//! securities that have a defined signal.

use crate::{Period, ReturnTable, SecurityId};
use std::collections::BTreeMap;

/// A ranking signal computed for every security and period.
///
/// Implementations should be thread-safe (`Send + Sync`) so that studies over
/// several windows can run in parallel.
///
/// # Example
///
/// ```no_run
/// use ronda_traits::{FormationSignal, ReturnTable, SignalPanel};
///
/// struct LastReturn;
///
/// impl FormationSignal for LastReturn {
///     fn name(&self) -> &str {
///         "last_return"
///     }
///
///     fn lookback(&self) -> usize {
///         1
///     }
///
///     fn compute(&self, table: &ReturnTable) -> SignalPanel {
///         let mut panel = SignalPanel::new(self.lookback());
///         for (id, series) in table.iter() {
///             for (period, _) in series.iter() {
///                 if let Some(prev) = series.get(period.offset(-1)) {
///                     panel.insert(period, id, prev);
///                 }
///             }
///         }
///         panel
///     }
/// }
/// ```
pub trait FormationSignal: Send + Sync {
    /// Returns the name of this signal, used in logs and reports.
    fn name(&self) -> &str;

    /// Number of trailing periods the signal consumes.
    fn lookback(&self) -> usize;

    /// Computes the signal for every security and period of `table`.
    ///
    /// Securities or periods for which the signal is undefined are simply
    /// absent from the returned panel.
    fn compute(&self, table: &ReturnTable) -> SignalPanel;
}

/// One derived (security, period, formation return) value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRecord {
    /// Security the signal belongs to.
    pub security: SecurityId,
    /// Formation period the signal ranks for.
    pub period: Period,
    /// Trailing compounded return.
    pub formation_return: f64,
}

/// Securities with a defined signal in a single formation period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossSection {
    /// Securities in insertion order.
    pub securities: Vec<SecurityId>,
    /// Signal values, parallel to `securities`.
    pub values: Vec<f64>,
}

impl CrossSection {
    /// Number of securities in the cross section.
    pub fn len(&self) -> usize {
        self.securities.len()
    }

    /// Whether the cross section is empty.
    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }
}

/// Formation signals keyed by period.
///
/// Built once per signal window and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SignalPanel {
    window: usize,
    sections: BTreeMap<Period, CrossSection>,
    insufficient_history: usize,
    gapped_windows: usize,
}

impl SignalPanel {
    /// Creates an empty panel for a signal of the given window length.
    pub const fn new(window: usize) -> Self {
        Self {
            window,
            sections: BTreeMap::new(),
            insufficient_history: 0,
            gapped_windows: 0,
        }
    }

    /// Adds a defined signal value.
    pub fn insert(&mut self, period: Period, security: SecurityId, value: f64) {
        let section = self.sections.entry(period).or_default();
        section.securities.push(security);
        section.values.push(value);
    }

    /// Records that a (security, period) had no complete trailing window.
    pub const fn note_insufficient_history(&mut self) {
        self.insufficient_history += 1;
    }

    /// Records that a (security, period) window lay inside the security's
    /// history but had too many missing returns.
    pub const fn note_gapped_window(&mut self) {
        self.gapped_windows += 1;
    }

    /// Window length the panel was computed with.
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Number of (security, period) pairs dropped for lack of history.
    pub const fn insufficient_history(&self) -> usize {
        self.insufficient_history
    }

    /// Number of (security, period) pairs dropped for missing returns.
    pub const fn gapped_windows(&self) -> usize {
        self.gapped_windows
    }

    /// Cross section of one formation period.
    pub fn get(&self, period: Period) -> Option<&CrossSection> {
        self.sections.get(&period)
    }

    /// Signal of one security in one period.
    pub fn value(&self, period: Period, security: SecurityId) -> Option<f64> {
        let section = self.sections.get(&period)?;
        section
            .securities
            .iter()
            .position(|&s| s == security)
            .map(|i| section.values[i])
    }

    /// Formation periods in chronological order.
    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.sections.keys().copied()
    }

    /// `(period, cross section)` pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (Period, &CrossSection)> + '_ {
        self.sections.iter().map(|(p, s)| (*p, s))
    }

    /// Every signal value as a flat record.
    pub fn records(&self) -> impl Iterator<Item = SignalRecord> + '_ {
        self.sections.iter().flat_map(|(&period, section)| {
            section
                .securities
                .iter()
                .zip(&section.values)
                .map(move |(&security, &formation_return)| SignalRecord {
                    security,
                    period,
                    formation_return,
                })
        })
    }

    /// Total number of signal values.
    pub fn len(&self) -> usize {
        self.sections.values().map(CrossSection::len).sum()
    }

    /// Whether no signal value was produced.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Frequency, ReturnRecord};

    struct LastReturn;

    impl FormationSignal for LastReturn {
        fn name(&self) -> &str {
            "last_return"
        }

        fn lookback(&self) -> usize {
            1
        }

        fn compute(&self, table: &ReturnTable) -> SignalPanel {
            let mut panel = SignalPanel::new(1);
            for (id, series) in table.iter() {
                for (period, _) in series.iter() {
                    match series.get(period.offset(-1)) {
                        Some(prev) => panel.insert(period, id, prev),
                        None => panel.note_insufficient_history(),
                    }
                }
            }
            panel
        }
    }

    #[test]
    fn test_panel_from_signal() {
        let records = vec![
            ReturnRecord::new("A", Period::new(1), Some(0.01)),
            ReturnRecord::new("A", Period::new(2), Some(0.02)),
            ReturnRecord::new("B", Period::new(2), Some(0.05)),
        ];
        let table = ReturnTable::from_records(Frequency::Monthly, records).unwrap();
        let panel = LastReturn.compute(&table);

        assert_eq!(panel.window(), 1);
        assert_eq!(panel.len(), 1);
        assert_eq!(panel.insufficient_history(), 2);
        assert_eq!(panel.value(Period::new(2), 0), Some(0.01));
        assert_eq!(panel.periods().collect::<Vec<_>>(), vec![Period::new(2)]);

        let records: Vec<SignalRecord> = panel.records().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].security, 0);
    }

    #[test]
    fn test_signal_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn FormationSignal>();
    }
}
