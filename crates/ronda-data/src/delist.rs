//! Delisting-return adjustment.

use crate::{DATE, DLRET, SYMBOL};
use ronda_traits::{Frequency, MarketData, Period, Result, ReturnRecord, RondaError, Symbol};
use std::collections::HashMap;
use tracing::{debug, info};

/// Reads delisting returns keyed by (symbol, period).
fn delisting_returns(
    delistings: &MarketData,
    frequency: Frequency,
) -> Result<HashMap<(Symbol, Period), Option<f64>>> {
    delistings.require_columns(&[SYMBOL, DATE, DLRET])?;

    let symbols = delistings.text_column(SYMBOL)?;
    let dates = delistings.date_column(DATE)?;
    let dlrets = delistings.float_column(DLRET)?;

    let mut by_period = HashMap::with_capacity(symbols.len());
    for ((symbol, date), dlret) in symbols.into_iter().zip(dates).zip(dlrets) {
        let (Some(symbol), Some(date)) = (symbol, date) else {
            continue;
        };
        let period = frequency.period_of(date);
        let dlret = dlret.filter(|r| r.is_finite());

        if by_period.insert((symbol.clone(), period), dlret).is_some() {
            return Err(RondaError::InvalidData(format!(
                "more than one delisting return for {symbol} in period {period}"
            )));
        }
    }

    Ok(by_period)
}

/// Folds delisting returns into the periodic return of the delisting period.
///
/// Each delisting date is mapped to its period and matched to the periodic
/// record of the same security. The adjusted return is
/// `(1 + ret) * (1 + dlret) - 1`, treating a missing side as zero. Delistings
/// without a matching periodic record are ignored.
///
/// # Errors
///
/// Fails with [`RondaError::InvalidData`] when one security has two delisting
/// returns in the same period.
pub fn apply_delisting(
    records: Vec<ReturnRecord>,
    delistings: &MarketData,
    frequency: Frequency,
) -> Result<Vec<ReturnRecord>> {
    let by_period = delisting_returns(delistings, frequency)?;
    let mut adjusted = 0usize;

    let records: Vec<ReturnRecord> = records
        .into_iter()
        .map(|mut record| {
            if let Some(dlret) = by_period.get(&(record.symbol.clone(), record.period)) {
                let ret = (1.0 + record.ret.unwrap_or(0.0)) * (1.0 + dlret.unwrap_or(0.0)) - 1.0;
                record.ret = Some(ret);
                adjusted += 1;
            }
            record
        })
        .collect();

    if adjusted < by_period.len() {
        debug!(
            unmatched = by_period.len() - adjusted,
            "delistings without a periodic return"
        );
    }
    info!(delistings = by_period.len(), adjusted, "applied delisting returns");

    Ok(records)
}
