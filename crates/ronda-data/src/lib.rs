//! Return data preparation for ronda.
//!
//! This crate turns raw return files into the [`ReturnTable`] the study runs on:
//! - Loading CSV files into [`MarketData`]
//! - Mapping observations onto working periods, compounding higher-frequency
//!   returns where needed
//! - Folding delisting returns into the return of the delisting period
//!
//! # Usage
//!
//! ```rust,ignore
//! use ronda_data::{apply_delisting, compound_returns, load_csv, to_return_table};
//! use ronda_traits::Frequency;
//!
//! let daily = load_csv("daily.csv")?;
//! let delistings = load_csv("delistings.csv")?;
//!
//! let monthly = compound_returns(&daily, Frequency::Monthly)?;
//! let adjusted = apply_delisting(monthly, &delistings, Frequency::Monthly)?;
//! let table = to_return_table(Frequency::Monthly, adjusted)?;
//! ```
//!
//! # File layout
//!
//! Return files carry `symbol`, `date` (`YYYY-MM-DD`) and `ret` columns;
//! delisting files carry `symbol`, `date` and `dlret`. Numeric symbols are read
//! as text and returns that do not parse as numbers are treated as missing.

mod compound;
mod csv;
mod delist;

pub use compound::{compound_returns, period_returns};
pub use csv::{load_csv, write_csv};
pub use delist::apply_delisting;

use ronda_traits::{Frequency, MarketData, Result, ReturnRecord, ReturnTable};
use tracing::info;

/// Security identifier column.
pub const SYMBOL: &str = "symbol";
/// Observation date column.
pub const DATE: &str = "date";
/// Simple return column.
pub const RET: &str = "ret";
/// Delisting return column.
pub const DLRET: &str = "dlret";

/// Builds the return table from prepared periodic records.
///
/// # Errors
///
/// Fails when two records share a (security, period).
pub fn to_return_table(
    frequency: Frequency,
    records: impl IntoIterator<Item = ReturnRecord>,
) -> Result<ReturnTable> {
    let table = ReturnTable::from_records(frequency, records)?;
    info!(
        securities = table.len(),
        frequency = %frequency,
        span = ?table.period_bounds().map(|(a, b)| (a.ordinal(), b.ordinal())),
        "built return table"
    );
    Ok(table)
}

/// Loads, maps and adjusts a return file into a return table in one pass.
///
/// With `compound` set, every observation inside a period is compounded into one
/// periodic return; otherwise each observation must already be periodic.
pub fn prepare(
    returns: &MarketData,
    delistings: Option<&MarketData>,
    frequency: Frequency,
    compound: bool,
) -> Result<ReturnTable> {
    let records = if compound {
        compound_returns(returns, frequency)?
    } else {
        period_returns(returns, frequency)?
    };

    let records = match delistings {
        Some(delistings) => apply_delisting(records, delistings, frequency)?,
        None => records,
    };

    to_return_table(frequency, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_prepare_monthly_universe() {
        let daily = csv(&[
            "symbol,date,ret",
            "10001,1990-01-02,0.01",
            "10001,1990-01-03,0.01",
            "10001,1990-02-01,0.02",
            "10001,1990-04-02,0.03",
            "10002,1990-01-02,-0.01",
        ]);
        let delist = csv(&["symbol,date,dlret", "10002,1990-01-31,-0.5"]);

        let returns = load_csv(daily.path()).unwrap();
        let delistings = load_csv(delist.path()).unwrap();
        let table = prepare(&returns, Some(&delistings), Frequency::Monthly, true).unwrap();

        assert_eq!(table.symbols(), &["10001".to_string(), "10002".to_string()]);
        let a = table.id_of("10001").unwrap();
        let series = table.series(a).unwrap();
        // January to April with March missing
        assert_eq!(series.len(), 4);
        assert_eq!(series.values()[2], None);

        let b = table.id_of("10002").unwrap();
        let jan = table.series(b).unwrap().start();
        let adjusted = table.return_at(b, jan).unwrap();
        assert!((adjusted - (0.99 * 0.5 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_prepare_rejects_duplicates_without_compounding() {
        let daily = csv(&["symbol,date,ret", "A,1990-01-02,0.01", "A,1990-01-03,0.01"]);
        let returns = load_csv(daily.path()).unwrap();
        let err = prepare(&returns, None, Frequency::Monthly, false).unwrap_err();
        assert!(matches!(err, ronda_traits::RondaError::InvalidData(_)));
    }
}
