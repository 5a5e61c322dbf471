//! Error types for the Ronda framework.
//!
//! Only configuration problems and malformed input surface as errors. Data gaps,
//! short histories, degenerate cross sections and periods without an active
//! cohort are absorbed where they occur and counted in [`Diagnostics`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for Ronda operations.
#[derive(Debug, Error)]
pub enum RondaError {
    /// The study configuration is absent or unusable. Fatal for the whole run.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from the data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Error reading or writing files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error (de)serializing JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error when a date is out of range or invalid.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error when data is insufficient for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for RondaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for RondaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for Ronda operations.
pub type Result<T> = std::result::Result<T, RondaError>;

/// Counters for the non-fatal conditions met while running a study.
///
/// Each counter names the narrowest unit that was dropped:
///
/// - `data_gaps`: cohort members without a return in the evaluation period
/// - `insufficient_history`: (security, period) pairs whose trailing window began
///   before the security's first return
/// - `signal_gaps`: (security, period) pairs whose window had too many missing returns
/// - `degenerate_cross_sections`: formation periods that produced fewer than B buckets
/// - `inactive_periods`: evaluation periods with no active cohort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Cohort members excluded from a bucket mean for lack of a return.
    pub data_gaps: usize,
    /// Signal records not produced because the window predates the history.
    pub insufficient_history: usize,
    /// Signal records not produced because of missing returns in the window.
    pub signal_gaps: usize,
    /// Formation periods whose cut points collapsed.
    pub degenerate_cross_sections: usize,
    /// Evaluation periods without any active cohort.
    pub inactive_periods: usize,
}

impl Diagnostics {
    /// Adds another set of counters into this one.
    pub const fn merge(&mut self, other: &Self) {
        self.data_gaps += other.data_gaps;
        self.insufficient_history += other.insufficient_history;
        self.signal_gaps += other.signal_gaps;
        self.degenerate_cross_sections += other.degenerate_cross_sections;
        self.inactive_periods += other.inactive_periods;
    }
}
