//! Data loading utilities for the ronda CLI.

use chrono::NaiveDate;
use ronda_traits::{Frequency, ReturnTable, RondaError};
use std::path::Path;

/// Load and prepare a return table.
///
/// Reads the return file and, if given, the delisting file, maps observations
/// onto `frequency` periods (compounding them when `compound` is set) and
/// builds the table.
pub(crate) fn load_table(
    returns: &Path,
    delistings: Option<&Path>,
    frequency: Frequency,
    compound: bool,
) -> Result<ReturnTable, RondaError> {
    let returns = ronda_data::load_csv(returns)?;
    let delistings = delistings.map(|path| ronda_data::load_csv(path)).transpose()?;
    ronda_data::prepare(&returns, delistings.as_ref(), frequency, compound)
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate, RondaError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| RondaError::InvalidDate(format!("'{date_str}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_date() {
        let date = parse_date("1965-01-15").unwrap();
        assert_eq!(date.year(), 1965);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_date_invalid() {
        let result = parse_date("invalid");
        assert!(matches!(result, Err(RondaError::InvalidDate(_))));
    }
}
