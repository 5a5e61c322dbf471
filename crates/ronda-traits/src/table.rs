//! The canonical per-security, per-period return table.

use crate::{Frequency, Period, Result, RondaError, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dense index of a security inside a [`ReturnTable`].
pub type SecurityId = usize;

/// One observed (security, period, return) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    /// Security identifier.
    pub symbol: Symbol,
    /// Period the return was earned over.
    pub period: Period,
    /// Adjusted simple return; `None` when the source had no usable value.
    pub ret: Option<f64>,
}

impl ReturnRecord {
    /// Convenience constructor.
    pub fn new(symbol: impl Into<Symbol>, period: Period, ret: Option<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            period,
            ret,
        }
    }
}

/// Time-ordered returns of one security.
///
/// The series is dense from the first to the last observed period; periods in
/// between without a record hold `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    start: Period,
    returns: Vec<Option<f64>>,
}

impl ReturnSeries {
    /// First period with a record.
    pub const fn start(&self) -> Period {
        self.start
    }

    /// Last period with a record.
    pub fn end(&self) -> Period {
        self.start.offset(self.returns.len() as i64 - 1)
    }

    /// Number of periods spanned, gaps included.
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Always false for a series built by [`ReturnTable`].
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Whether `period` lies within the listed span of the security.
    pub fn spans(&self, period: Period) -> bool {
        period >= self.start && period <= self.end()
    }

    /// Return for `period`, or `None` if missing or outside the span.
    pub fn get(&self, period: Period) -> Option<f64> {
        let offset = usize::try_from(period.since(self.start)).ok()?;
        self.returns.get(offset).copied().flatten()
    }

    /// Returns in period order, gaps as `None`.
    pub fn values(&self) -> &[Option<f64>] {
        &self.returns
    }

    /// `(period, return)` pairs in period order.
    pub fn iter(&self) -> impl Iterator<Item = (Period, Option<f64>)> + '_ {
        self.returns
            .iter()
            .enumerate()
            .map(|(i, r)| (self.start.offset(i as i64), *r))
    }
}

/// Per-security, per-period adjusted returns.
///
/// Securities are stored sorted by symbol and addressed by a dense
/// [`SecurityId`]. At most one return exists per (security, period).
#[derive(Debug, Clone)]
pub struct ReturnTable {
    frequency: Frequency,
    symbols: Vec<Symbol>,
    series: Vec<ReturnSeries>,
}

impl ReturnTable {
    /// Builds a table from individual records.
    ///
    /// Non-finite returns are stored as missing. Two records for the same
    /// (security, period) are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidData`] on a duplicate (security, period).
    pub fn from_records<I>(frequency: Frequency, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = ReturnRecord>,
    {
        let mut grouped: BTreeMap<Symbol, BTreeMap<Period, Option<f64>>> = BTreeMap::new();

        for record in records {
            let ret = record.ret.filter(|r| r.is_finite());
            let periods = grouped.entry(record.symbol.clone()).or_default();
            if periods.insert(record.period, ret).is_some() {
                return Err(RondaError::InvalidData(format!(
                    "duplicate return for {} in period {}",
                    record.symbol, record.period
                )));
            }
        }

        let mut symbols = Vec::with_capacity(grouped.len());
        let mut series = Vec::with_capacity(grouped.len());

        for (symbol, periods) in grouped {
            let (Some((&start, _)), Some((&end, _))) =
                (periods.first_key_value(), periods.last_key_value())
            else {
                continue;
            };

            let len = usize::try_from(end.since(start)).unwrap_or(0) + 1;
            let mut returns = vec![None; len];
            for (period, ret) in periods {
                returns[period.since(start) as usize] = ret;
            }

            symbols.push(symbol);
            series.push(ReturnSeries { start, returns });
        }

        Ok(Self {
            frequency,
            symbols,
            series,
        })
    }

    /// Period granularity of the table.
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Number of securities.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table has no securities.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols, indexed by [`SecurityId`].
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Symbol of a security.
    pub fn symbol(&self, id: SecurityId) -> Option<&str> {
        self.symbols.get(id).map(String::as_str)
    }

    /// Looks up the id of a symbol.
    pub fn id_of(&self, symbol: &str) -> Option<SecurityId> {
        self.symbols
            .binary_search_by(|s| s.as_str().cmp(symbol))
            .ok()
    }

    /// Series of one security.
    pub fn series(&self, id: SecurityId) -> Option<&ReturnSeries> {
        self.series.get(id)
    }

    /// `(id, series)` pairs for every security.
    pub fn iter(&self) -> impl Iterator<Item = (SecurityId, &ReturnSeries)> + '_ {
        self.series.iter().enumerate()
    }

    /// Return of a security in a period, `None` if missing.
    pub fn return_at(&self, id: SecurityId, period: Period) -> Option<f64> {
        self.series.get(id).and_then(|s| s.get(period))
    }

    /// Earliest and latest periods over all securities.
    pub fn period_bounds(&self) -> Option<(Period, Period)> {
        let start = self.series.iter().map(ReturnSeries::start).min()?;
        let end = self.series.iter().map(ReturnSeries::end).max()?;
        Some((start, end))
    }

    /// A copy of the table with the return of one (security, period) replaced.
    ///
    /// The period must lie inside the security's span.
    pub fn with_return(&self, id: SecurityId, period: Period, ret: Option<f64>) -> Result<Self> {
        let mut table = self.clone();
        let series = table
            .series
            .get_mut(id)
            .ok_or_else(|| RondaError::InvalidData(format!("no security with id {id}")))?;
        let offset = usize::try_from(period.since(series.start))
            .ok()
            .filter(|&o| o < series.returns.len())
            .ok_or_else(|| {
                RondaError::InvalidData(format!("period {period} outside the listed span"))
            })?;
        series.returns[offset] = ret.filter(|r| r.is_finite());
        Ok(table)
    }
}
