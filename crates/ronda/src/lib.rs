#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # ronda
//!
//! ronda is an umbrella crate that re-exports all ronda sub-crates for
//! convenience.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ronda::prelude::*;
//! use ronda::data::{load_csv, prepare};
//!
//! # fn main() -> Result<()> {
//! let returns = load_csv("data/monthly.csv")?;
//! let config = StudyConfig::default();
//! let table = prepare(&returns, None, config.frequency, false)?;
//!
//! let results = Study::new(config)?.run(&table)?;
//! println!("{}", Report::assemble(&results));
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Core types ([`ReturnTable`], [`Period`], [`StudyConfig`]) and traits
//! - [`signals`] - Formation signals
//! - [`eval`] - Bucketing, overlapping portfolios, t-statistics and reports
//! - [`data`] - CSV loading, compounding and delisting adjustment

/// Version information for the ronda crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core types and trait definitions.
///
/// - [`FormationSignal`] - Computes a per-period cross section of signals
/// - [`TStatEstimator`] - Mean and t-statistic of a return series
pub mod traits {
    pub use ronda_traits::*;
}

// Re-export core traits and types at top level for convenience
pub use ronda_traits::{
    Date, Diagnostics, EstimatorKind, FormationSignal, Frequency, MarketData, Period, Result,
    ReturnRecord, ReturnTable, RondaError, StudyConfig, Symbol, TStat, TStatEstimator,
};

/// Formation signals.
///
/// The cumulative-return signal compounds the J periods before each formation
/// period, optionally skipping the most recent ones.
///
/// ```ignore
/// use ronda::signals::CumulativeReturn;
/// use ronda::FormationSignal;
///
/// let panel = CumulativeReturn::with_window(6).compute(&table);
/// ```
pub mod signals {
    pub use ronda_signals::*;
}

/// Portfolio construction and evaluation.
///
/// ## Key Components
///
/// - **Bucketizer**: per-period quantile buckets of a signal cross section
/// - **OverlapAggregator**: pools the K most recent cohorts into bucket returns
/// - **NeweyWest**: HAC t-statistic with Bartlett weights
/// - **Study**: runs the (J, K) grid in parallel
/// - **Report**: arranges summaries into a J × K grid
///
/// ## Overlapping portfolios
///
/// ```text
/// r_b(t) = mean { r_i(t) : i in bucket b of cohort t - h, h = 0..K-1 }
/// ```
///
/// A security held by several active cohorts is counted once per cohort.
pub mod eval {
    pub use ronda_eval::*;
}

/// Return data preparation.
pub mod data {
    pub use ronda_data::*;
}

/// Prelude module for convenient imports.
///
/// ```ignore
/// use ronda::prelude::*;
/// ```
pub mod prelude {
    pub use crate::eval::{Report, Study, StudyResults};
    pub use crate::signals::CumulativeReturn;
    pub use crate::{
        FormationSignal, Frequency, Period, Result, ReturnTable, RondaError, StudyConfig,
        TStatEstimator,
    };
}
