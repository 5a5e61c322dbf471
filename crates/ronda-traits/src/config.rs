//! Study configuration.
//!
//! One explicit [`StudyConfig`] is threaded through every component call; no
//! component reads process-wide settings.

use crate::{Date, Frequency, Period, Result, RondaError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Which significance estimator summaries use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EstimatorKind {
    /// Newey–West HAC standard errors, falling back to the simple t-statistic
    /// on short series.
    #[default]
    NeweyWest,
    /// Plain mean / (s / sqrt(n)).
    Simple,
}

impl FromStr for EstimatorKind {
    type Err = RondaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "newey-west" | "neweywest" | "nw" | "hac" => Ok(Self::NeweyWest),
            "simple" | "iid" => Ok(Self::Simple),
            other => Err(RondaError::Configuration(format!(
                "unknown estimator '{other}'"
            ))),
        }
    }
}

/// Configuration of a momentum study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// First evaluation date (its period is the first evaluation period)
    pub start: Date,
    /// Last evaluation date (inclusive)
    pub end: Date,
    /// Working period granularity
    pub frequency: Frequency,
    /// Signal window lengths J, in periods
    pub signal_windows: Vec<usize>,
    /// Holding lengths K, in periods
    pub holding_periods: Vec<usize>,
    /// Number of buckets B
    pub n_buckets: usize,
    /// Valid observations required in a signal window; `None` means all J
    pub min_periods: Option<usize>,
    /// Periods skipped between the signal window and formation
    pub skip_periods: usize,
    /// Significance estimator
    pub estimator: EstimatorKind,
    /// Fixed HAC lag; `None` uses K - 1
    pub lag_override: Option<usize>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(1965, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(1989, 12, 31).unwrap_or_default(),
            frequency: Frequency::Monthly,
            signal_windows: vec![3, 6, 9, 12],
            holding_periods: vec![3, 6, 9, 12],
            n_buckets: 10,
            min_periods: None,
            skip_periods: 0,
            estimator: EstimatorKind::NeweyWest,
            lag_override: None,
        }
    }
}

impl StudyConfig {
    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RondaError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text)?;
        info!(path = %path.display(), "loaded study configuration");
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration. Every failure here is fatal for the run.
    pub fn validate(&self) -> Result<()> {
        if self.signal_windows.is_empty() {
            return Err(RondaError::Configuration(
                "at least one signal window is required".to_string(),
            ));
        }
        if self.holding_periods.is_empty() {
            return Err(RondaError::Configuration(
                "at least one holding period is required".to_string(),
            ));
        }
        if self.signal_windows.contains(&0) {
            return Err(RondaError::Configuration(
                "signal windows must be positive".to_string(),
            ));
        }
        if self.holding_periods.contains(&0) {
            return Err(RondaError::Configuration(
                "holding periods must be positive".to_string(),
            ));
        }
        if self.n_buckets < 2 {
            return Err(RondaError::Configuration(format!(
                "at least two buckets are required, got {}",
                self.n_buckets
            )));
        }
        if self.min_periods == Some(0) {
            return Err(RondaError::Configuration(
                "min_periods must be positive".to_string(),
            ));
        }
        if self.start > self.end {
            return Err(RondaError::Configuration(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// First evaluation period.
    pub fn start_period(&self) -> Period {
        self.frequency.period_of(self.start)
    }

    /// Last evaluation period.
    pub fn end_period(&self) -> Period {
        self.frequency.period_of(self.end)
    }

    /// Every evaluation period, in order.
    pub fn evaluation_periods(&self) -> Vec<Period> {
        Period::range_inclusive(self.start_period(), self.end_period()).collect()
    }

    /// Required valid observations for a signal window `j`, clamped to `[1, j]`.
    pub fn min_periods_for(&self, j: usize) -> usize {
        self.min_periods.unwrap_or(j).clamp(1, j.max(1))
    }

    /// HAC lag for holding length `k`.
    pub fn lag_for(&self, k: usize) -> usize {
        self.lag_override.unwrap_or_else(|| k.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = StudyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.n_buckets, 10);
        assert_eq!(config.signal_windows, vec![3, 6, 9, 12]);
        // 25 years of months
        assert_eq!(config.evaluation_periods().len(), 300);
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        let bad = [
            StudyConfig {
                signal_windows: vec![],
                ..Default::default()
            },
            StudyConfig {
                holding_periods: vec![3, 0],
                ..Default::default()
            },
            StudyConfig {
                n_buckets: 1,
                ..Default::default()
            },
            StudyConfig {
                min_periods: Some(0),
                ..Default::default()
            },
            StudyConfig {
                start: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(RondaError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_lag_and_min_periods() {
        let config = StudyConfig::default();
        assert_eq!(config.lag_for(3), 2);
        assert_eq!(config.lag_for(1), 0);
        assert_eq!(config.min_periods_for(6), 6);

        let config = StudyConfig {
            min_periods: Some(10),
            lag_override: Some(4),
            ..Default::default()
        };
        assert_eq!(config.min_periods_for(6), 6);
        assert_eq!(config.lag_for(12), 4);
    }

    #[test]
    fn test_estimator_from_str() {
        assert_eq!("nw".parse::<EstimatorKind>().unwrap(), EstimatorKind::NeweyWest);
        assert_eq!("Simple".parse::<EstimatorKind>().unwrap(), EstimatorKind::Simple);
        assert!("bootstrap".parse::<EstimatorKind>().is_err());
    }

    #[test]
    fn test_from_json_file_with_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"signal_windows": [6], "holding_periods": [1, 6], "n_buckets": 5, "estimator": "simple"}}"#
        )
        .unwrap();

        let config = StudyConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.signal_windows, vec![6]);
        assert_eq!(config.holding_periods, vec![1, 6]);
        assert_eq!(config.n_buckets, 5);
        assert_eq!(config.estimator, EstimatorKind::Simple);
        assert_eq!(config.frequency, Frequency::Monthly);
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = StudyConfig::from_json_file("/nonexistent/study.json").unwrap_err();
        assert!(matches!(err, RondaError::Configuration(_)));
    }
}
