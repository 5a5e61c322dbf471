//! Signal implementations for the Ronda momentum backtest.
//!
//! This crate provides the formation signals securities are ranked on:
//! - Momentum: trailing compounded return over J periods, lagged one period
//!
//! # Example
//!
//! ```ignore
//! use ronda_signals::momentum::CumulativeReturn;
//! use ronda_traits::FormationSignal;
//!
//! let signal = CumulativeReturn::with_window(6);
//! let panel = signal.compute(&table);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod momentum;

// Re-export key types
pub use momentum::{CumulativeReturn, CumulativeReturnConfig};
