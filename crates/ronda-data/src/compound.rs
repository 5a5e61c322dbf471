//! Mapping observations onto working periods.

use crate::{DATE, RET, SYMBOL};
use polars::prelude::*;
use ronda_traits::{Frequency, MarketData, Period, Result, ReturnRecord};
use tracing::{info, warn};

/// One row per observation with its period ordinal.
fn observation_frame(data: &MarketData, frequency: Frequency) -> Result<DataFrame> {
    data.require_columns(&[SYMBOL, DATE, RET])?;

    let symbols = data.text_column(SYMBOL)?;
    let dates = data.date_column(DATE)?;
    let rets = data.float_column(RET)?;

    let mut symbol_col = Vec::with_capacity(symbols.len());
    let mut period_col = Vec::with_capacity(symbols.len());
    let mut ret_col = Vec::with_capacity(symbols.len());
    let mut unidentified = 0usize;

    for ((symbol, date), ret) in symbols.into_iter().zip(dates).zip(rets) {
        let (Some(symbol), Some(date)) = (symbol, date) else {
            unidentified += 1;
            continue;
        };
        symbol_col.push(symbol);
        period_col.push(frequency.period_of(date).ordinal());
        ret_col.push(ret.filter(|r| r.is_finite()));
    }

    if unidentified > 0 {
        warn!(rows = unidentified, "dropped rows without symbol or date");
    }

    Ok(df!(
        SYMBOL => symbol_col,
        "period" => period_col,
        RET => ret_col
    )?)
}

/// Reads a `symbol`/`period`/`ret` frame back into records.
fn records(frame: &DataFrame) -> Result<Vec<ReturnRecord>> {
    let symbols = frame.column(SYMBOL)?.as_materialized_series().str()?;
    let periods = frame.column("period")?.as_materialized_series().i64()?;
    let rets = frame.column(RET)?.as_materialized_series().f64()?;

    Ok(symbols
        .into_iter()
        .zip(periods.into_iter())
        .zip(rets.into_iter())
        .filter_map(|((symbol, period), ret)| {
            Some(ReturnRecord::new(symbol?, Period::new(period?), ret))
        })
        .collect())
}

/// Maps each observation to its period without aggregation.
///
/// Intended for data that is already at the working frequency; two observations
/// in the same period for one security are later rejected as duplicates.
pub fn period_returns(data: &MarketData, frequency: Frequency) -> Result<Vec<ReturnRecord>> {
    let frame = observation_frame(data, frequency)?;
    records(&frame)
}

/// Compounds observations into one return per (security, period).
///
/// Missing returns are dropped first; the periodic return is
/// `prod(1 + r) - 1` over what remains, so a period with no valid observation
/// produces no record.
pub fn compound_returns(data: &MarketData, frequency: Frequency) -> Result<Vec<ReturnRecord>> {
    let frame = observation_frame(data, frequency)?;
    let observations = frame.height();

    let compounded = frame
        .lazy()
        .filter(col(RET).is_not_null())
        .group_by([col(SYMBOL), col("period")])
        .agg([(col(RET) + lit(1.0)).product().alias("growth")])
        .select([
            col(SYMBOL),
            col("period"),
            (col("growth") - lit(1.0)).alias(RET),
        ])
        .sort([SYMBOL, "period"], Default::default())
        .collect()?;

    info!(
        observations,
        periods = compounded.height(),
        frequency = %frequency,
        "compounded returns"
    );

    records(&compounded)
}
