//! Momentum signals based on trailing compounded returns.
//!
//! The signal for a formation period compounds the returns of the J periods
//! before it, so securities can be ranked on information available at the
//! start of the period.

mod cumulative;

pub use cumulative::{CumulativeReturn, CumulativeReturnConfig};
