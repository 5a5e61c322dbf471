//! Common types used throughout the Ronda framework.
//!
//! This module defines the calendar types (`Period`, `Frequency`) all window
//! arithmetic runs on, and the `MarketData` container raw inputs arrive in.

use crate::{Result, RondaError};
use chrono::{Datelike, NaiveDate};
use derive_more::{Display, From, Into};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A security identifier, e.g. a ticker or a permanent number rendered as text.
pub type Symbol = String;

/// Days between 0001-01-01 (CE day 1) and the Unix epoch, as used by Polars `Date` columns.
pub const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

/// Ordinal of a period at a given [`Frequency`].
///
/// Consecutive periods differ by exactly one, so "h periods before t" is
/// `t.offset(-h)` regardless of the calendar granularity behind it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
pub struct Period(i64);

impl Period {
    /// Creates a period from its raw ordinal.
    #[must_use]
    pub const fn new(ordinal: i64) -> Self {
        Self(ordinal)
    }

    /// Raw ordinal.
    #[must_use]
    pub const fn ordinal(self) -> i64 {
        self.0
    }

    /// The period `n` steps later (earlier when `n` is negative).
    #[must_use]
    pub const fn offset(self, n: i64) -> Self {
        Self(self.0 + n)
    }

    /// Number of periods from `earlier` to `self`.
    #[must_use]
    pub const fn since(self, earlier: Self) -> i64 {
        self.0 - earlier.0
    }

    /// Every period from `start` to `end`, inclusive.
    pub fn range_inclusive(start: Self, end: Self) -> impl Iterator<Item = Self> {
        (start.0..=end.0).map(Self)
    }
}

/// Calendar granularity of the working period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Monday-to-Sunday weeks.
    Weekly,
    /// Calendar months.
    #[default]
    Monthly,
    /// Calendar quarters.
    Quarterly,
    /// Calendar years.
    Annual,
}

impl Frequency {
    /// The period a calendar date falls into.
    #[must_use]
    pub fn period_of(self, date: Date) -> Period {
        let year = i64::from(date.year());
        let month0 = i64::from(date.month0());
        match self {
            // CE day 1 (0001-01-01) is a Monday
            Self::Weekly => Period((i64::from(date.num_days_from_ce()) - 1).div_euclid(7)),
            Self::Monthly => Period(year * 12 + month0),
            Self::Quarterly => Period(year * 4 + month0 / 3),
            Self::Annual => Period(year),
        }
    }

    /// Last calendar day of a period.
    ///
    /// Returns `None` if the period lies outside chrono's representable range.
    #[must_use]
    pub fn period_end(self, period: Period) -> Option<Date> {
        let p = period.ordinal();
        match self {
            Self::Weekly => {
                let day = i32::try_from(p * 7 + 7).ok()?;
                NaiveDate::from_num_days_from_ce_opt(day)
            }
            Self::Monthly => month_end(p.div_euclid(12), p.rem_euclid(12) as u32 + 1),
            Self::Quarterly => month_end(p.div_euclid(4), p.rem_euclid(4) as u32 * 3 + 3),
            Self::Annual => NaiveDate::from_ymd_opt(i32::try_from(p).ok()?, 12, 31),
        }
    }

    /// Lowercase name, as used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = RondaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "weekly" | "w" => Ok(Self::Weekly),
            "monthly" | "m" => Ok(Self::Monthly),
            "quarterly" | "q" => Ok(Self::Quarterly),
            "annual" | "yearly" | "a" | "y" => Ok(Self::Annual),
            other => Err(RondaError::Configuration(format!(
                "unknown frequency '{other}'"
            ))),
        }
    }
}

fn month_end(year: i64, month: u32) -> Option<Date> {
    let year = i32::try_from(year).ok()?;
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.pred_opt()
}

/// Container for raw market data.
///
/// `MarketData` wraps a Polars DataFrame as handed over by a data source,
/// before it is reshaped into a [`ReturnTable`](crate::ReturnTable).
///
/// # Expected Schema
///
/// - `symbol`: Security identifier
/// - `date`: Observation date
/// - `ret`: Simple return over the observation interval
///
/// Additional columns (e.g. `dlret` for delisting returns) are allowed.
#[derive(Debug, Clone)]
pub struct MarketData {
    /// The underlying DataFrame containing market data.
    data: DataFrame,
}

impl MarketData {
    /// Creates a new `MarketData` instance from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows in the market data.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the market data is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the column names in the market data.
    pub fn columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Checks if a column exists in the market data.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Gets a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.data.column(name).ok()
    }

    /// Fails with [`RondaError::MissingColumn`] on the first absent column.
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|name| !self.has_column(name)) {
            Some(missing) => Err(RondaError::MissingColumn((*missing).to_string())),
            None => Ok(()),
        }
    }

    /// Reads a column as text, casting numeric identifiers to strings.
    pub fn text_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self
            .column(name)
            .ok_or_else(|| RondaError::MissingColumn(name.to_string()))?;
        let series = column.as_materialized_series().cast(&DataType::String)?;
        Ok(series
            .str()?
            .into_iter()
            .map(|s: Option<&str>| s.map(str::to_string))
            .collect())
    }

    /// Reads a column as `f64`; values that cannot be interpreted become `None`.
    pub fn float_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self
            .column(name)
            .ok_or_else(|| RondaError::MissingColumn(name.to_string()))?;
        let series = column.as_materialized_series().cast(&DataType::Float64)?;
        Ok(series.f64()?.into_iter().collect())
    }

    /// Reads a column of dates, accepting either a `Date` column or `YYYY-MM-DD` text.
    pub fn date_column(&self, name: &str) -> Result<Vec<Option<Date>>> {
        let column = self
            .column(name)
            .ok_or_else(|| RondaError::MissingColumn(name.to_string()))?;
        let series = column.as_materialized_series();

        if let Ok(dates) = series.date() {
            return Ok(dates
                .into_iter()
                .map(|d: Option<i32>| {
                    d.and_then(|days| NaiveDate::from_num_days_from_ce_opt(days + CE_TO_UNIX_EPOCH_DAYS))
                })
                .collect());
        }

        let text = series.cast(&DataType::String)?;
        text.str()?
            .into_iter()
            .map(|s: Option<&str>| {
                s.map(|s| {
                    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                        .map_err(|e| RondaError::InvalidDate(format!("'{s}': {e}")))
                })
                .transpose()
            })
            .collect()
    }
}

impl From<DataFrame> for MarketData {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for MarketData {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_periods_are_consecutive() {
        let f = Frequency::Monthly;
        let dec = f.period_of(date(1964, 12, 31));
        let jan = f.period_of(date(1965, 1, 15));
        assert_eq!(jan.since(dec), 1);
        assert_eq!(f.period_end(jan), Some(date(1965, 1, 31)));
        assert_eq!(f.period_end(dec), Some(date(1964, 12, 31)));
    }

    #[test]
    fn test_month_end_handles_leap_years() {
        let f = Frequency::Monthly;
        let feb = f.period_of(date(2024, 2, 3));
        assert_eq!(f.period_end(feb), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_weekly_periods() {
        let f = Frequency::Weekly;
        // 2024-01-01 was a Monday, 2024-01-07 a Sunday
        let mon = f.period_of(date(2024, 1, 1));
        let sun = f.period_of(date(2024, 1, 7));
        let next_mon = f.period_of(date(2024, 1, 8));
        assert_eq!(mon, sun);
        assert_eq!(next_mon.since(mon), 1);
        assert_eq!(f.period_end(mon), Some(date(2024, 1, 7)));
    }

    #[test]
    fn test_quarterly_and_annual_periods() {
        let q = Frequency::Quarterly;
        let q1 = q.period_of(date(2020, 2, 10));
        assert_eq!(q.period_end(q1), Some(date(2020, 3, 31)));
        assert_eq!(q.period_of(date(2020, 4, 1)).since(q1), 1);
        assert_eq!(q.period_end(q.period_of(date(2020, 11, 1))), Some(date(2020, 12, 31)));

        let a = Frequency::Annual;
        assert_eq!(a.period_end(a.period_of(date(1999, 6, 1))), Some(date(1999, 12, 31)));
    }

    #[test]
    fn test_frequency_from_str() {
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("w".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!("hourly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_period_range() {
        let periods: Vec<Period> =
            Period::range_inclusive(Period::new(3), Period::new(6)).collect();
        assert_eq!(periods.len(), 4);
        assert_eq!(periods[0].offset(3), periods[3]);
    }

    #[test]
    fn test_market_data_require_columns() {
        let df = df! {
            "symbol" => &["AAPL"],
            "ret" => &[0.01],
        }
        .unwrap();
        let market_data = MarketData::new(df);
        assert!(market_data.require_columns(&["symbol", "ret"]).is_ok());
        let err = market_data.require_columns(&["symbol", "date"]).unwrap_err();
        assert!(matches!(err, RondaError::MissingColumn(c) if c == "date"));
    }

    #[test]
    fn test_market_data_typed_columns() {
        let df = df! {
            "symbol" => &[10001i64, 10002],
            "date" => &["1965-01-29", "1965-02-26"],
            "ret" => &["0.05", "C"],
        }
        .unwrap();
        let market_data = MarketData::new(df);

        let symbols = market_data.text_column("symbol").unwrap();
        assert_eq!(symbols[0].as_deref(), Some("10001"));

        let dates = market_data.date_column("date").unwrap();
        assert_eq!(dates[1], Some(date(1965, 2, 26)));

        let rets = market_data.float_column("ret").unwrap();
        assert_eq!(rets[0], Some(0.05));
        assert_eq!(rets[1], None);
    }
}
