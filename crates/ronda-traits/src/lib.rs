#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and trait definitions for the Ronda momentum backtest.
//!
//! This crate provides the data model every other Ronda crate works on: the
//! per-security return table, the period calendar, formation signals, the
//! study configuration, and the estimator seam used for significance tests.

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod config;
pub mod error;
pub mod evaluator;
pub mod signal;
pub mod stats;
pub mod table;
pub mod types;

// Re-exports
pub use config::{EstimatorKind, StudyConfig};
pub use error::{Diagnostics, Result, RondaError};
pub use evaluator::{TStat, TStatEstimator};
pub use signal::{CrossSection, FormationSignal, SignalPanel, SignalRecord};
pub use table::{ReturnRecord, ReturnSeries, ReturnTable, SecurityId};
pub use types::{CE_TO_UNIX_EPOCH_DAYS, Date, Frequency, MarketData, Period, Symbol};
