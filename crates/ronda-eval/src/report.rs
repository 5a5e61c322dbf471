//! Report assembly over strategy summaries.
//!
//! A [`Report`] arranges summaries into a grid with one row per signal window J
//! and one cell per holding length K. Strategies missing from the results fill
//! their cell with undefined statistics instead of failing the report.

use crate::study::StudyResults;
use crate::summary::{Role, StrategySummary};
use ronda_traits::{Date, Diagnostics, EstimatorKind, Frequency, Result, TStat};
use serde::Serialize;
use std::fmt;

const PLACEHOLDER: &str = "--";
const CELL_WIDTH: usize = 11;
const LABEL_WIDTH: usize = 13;

/// One signal window across every holding length.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    /// Signal window J
    pub signal_window: usize,
    /// One summary per configured holding length, in configured order
    pub cells: Vec<StrategySummary>,
}

/// Grid of summary statistics keyed by (J, K, role).
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// First evaluation date
    pub start: Date,
    /// Last evaluation date
    pub end: Date,
    /// Period granularity
    pub frequency: Frequency,
    /// Number of buckets B
    pub n_buckets: usize,
    /// Significance estimator
    pub estimator: EstimatorKind,
    /// Column headers
    pub holding_periods: Vec<usize>,
    /// Rows in configured J order
    pub rows: Vec<ReportRow>,
    /// Non-fatal conditions summed over all strategies
    pub diagnostics: Diagnostics,
}

impl Report {
    /// Builds the report grid from study results.
    pub fn assemble(results: &StudyResults) -> Self {
        let config = results.config();

        let rows = config
            .signal_windows
            .iter()
            .map(|&j| ReportRow {
                signal_window: j,
                cells: config
                    .holding_periods
                    .iter()
                    .map(|&k| {
                        results.get(j, k).map_or_else(
                            || StrategySummary::undefined(j, k, config.lag_for(k)),
                            |s| s.summary,
                        )
                    })
                    .collect(),
            })
            .collect();

        Self {
            start: config.start,
            end: config.end,
            frequency: config.frequency,
            n_buckets: config.n_buckets,
            estimator: config.estimator,
            holding_periods: config.holding_periods.clone(),
            rows,
            diagnostics: results.diagnostics(),
        }
    }

    /// Cell for (`j`, `k`), if both are part of the grid.
    pub fn cell(&self, j: usize, k: usize) -> Option<&StrategySummary> {
        let col = self.holding_periods.iter().position(|&h| h == k)?;
        self.rows
            .iter()
            .find(|r| r.signal_window == j)
            .and_then(|r| r.cells.get(col))
    }

    /// Pretty-printed JSON. Undefined statistics serialise as `null`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn write_values(
        f: &mut fmt::Formatter<'_>,
        cells: &[StrategySummary],
        role: Role,
        value: impl Fn(&TStat) -> Option<String>,
    ) -> fmt::Result {
        for cell in cells {
            let text = value(cell.get(role)).unwrap_or_else(|| PLACEHOLDER.to_string());
            write!(f, "{text:>CELL_WIDTH$}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = LABEL_WIDTH + CELL_WIDTH * self.holding_periods.len();
        let rule = "-".repeat(width);

        writeln!(f, "{}", "=".repeat(width))?;
        writeln!(f, "Momentum portfolios: mean {} returns (t-statistics)", self.frequency.as_str())?;
        writeln!(
            f,
            "{} to {}, {} buckets, {} standard errors",
            self.start,
            self.end,
            self.n_buckets,
            match self.estimator {
                EstimatorKind::NeweyWest => "Newey-West",
                EstimatorKind::Simple => "iid",
            }
        )?;
        writeln!(f, "{}", "=".repeat(width))?;

        write!(f, "{:<LABEL_WIDTH$}", "J     K =")?;
        for k in &self.holding_periods {
            write!(f, "{k:>CELL_WIDTH$}")?;
        }
        writeln!(f)?;
        writeln!(f, "{rule}")?;

        for row in &self.rows {
            for (i, role) in Role::ALL.into_iter().enumerate() {
                let j = if i == 0 { row.signal_window.to_string() } else { String::new() };
                write!(f, "{j:<5} {:<7}", role.label())?;
                Self::write_values(f, &row.cells, role, |s| {
                    s.mean.is_finite().then(|| format!("{:.4}", s.mean))
                })?;
                write!(f, "{:LABEL_WIDTH$}", "")?;
                Self::write_values(f, &row.cells, role, |s| {
                    s.t_stat.is_finite().then(|| format!("({:.2})", s.t_stat))
                })?;
            }
            writeln!(f, "{rule}")?;
        }

        let d = &self.diagnostics;
        write!(
            f,
            "gaps: {}, short history: {}, gapped windows: {}, degenerate periods: {}, inactive periods: {}",
            d.data_gaps,
            d.insufficient_history,
            d.signal_gaps,
            d.degenerate_cross_sections,
            d.inactive_periods
        )
    }
}
