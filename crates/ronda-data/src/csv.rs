//! CSV input and output.

use polars::prelude::*;
use ronda_traits::{MarketData, Result, RondaError};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Reads a CSV file with a header row into [`MarketData`].
///
/// # Errors
///
/// Fails when the file cannot be opened or parsed.
pub fn load_csv(path: impl AsRef<Path>) -> Result<MarketData> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RondaError::Configuration(format!(
            "input file {} does not exist",
            path.display()
        )));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    info!(path = %path.display(), rows = df.height(), columns = df.width(), "loaded csv");
    Ok(MarketData::new(df))
}

/// Writes a DataFrame to a CSV file with a header row.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    debug!(path = %path.display(), rows = df.height(), "wrote csv");
    Ok(())
}
