//! Portfolio construction and evaluation for ronda.
//!
//! This crate turns formation signals into momentum portfolios and tests them:
//! - Cross-sectional bucketing of signals into equal-population buckets
//! - Overlapping-cohort aggregation of bucket returns for a holding length K
//! - Simple and Newey–West t-statistics of the resulting series
//! - A study runner over a grid of (J, K) strategies and a report over its results
//!
//! # Example
//!
//! ```rust,ignore
//! use ronda_eval::{Report, Study};
//! use ronda_traits::StudyConfig;
//!
//! let results = Study::new(StudyConfig::default())?.run(&table)?;
//! let report = Report::assemble(&results);
//! println!("{report}");
//! ```

pub mod buckets;
pub mod overlap;
pub mod report;
pub mod robust;
pub mod study;
pub mod summary;

// Re-export main types
pub use buckets::{BucketHistory, Bucketizer, Cohort};
pub use overlap::{OverlapAggregator, PortfolioReturns};
pub use report::{Report, ReportRow};
pub use robust::{NeweyWest, NeweyWestConfig, SimpleTStat, estimator_for};
pub use study::{StrategyResult, Study, StudyResults};
pub use summary::{Role, StrategySummary};
