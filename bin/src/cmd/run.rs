//! Run command implementation.

use crate::data;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use ronda_eval::{Report, Study, StudyResults};
use ronda_traits::{EstimatorKind, Frequency, StudyConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Output format of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Text panel
    Text,
    /// JSON document
    Json,
}

/// Arguments of `ronda run`.
#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    /// CSV of returns with symbol, date and ret columns
    #[arg(short, long)]
    pub(crate) returns: PathBuf,

    /// CSV of delisting returns with symbol, date and dlret columns
    #[arg(short, long)]
    pub(crate) delistings: Option<PathBuf>,

    /// Compound higher-frequency returns into the working period
    #[arg(long)]
    pub(crate) compound: bool,

    /// Study configuration (JSON); flags below override its fields
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// First evaluation date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) start: Option<String>,

    /// Last evaluation date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) end: Option<String>,

    /// Period granularity (weekly, monthly, quarterly, annual)
    #[arg(long)]
    pub(crate) frequency: Option<Frequency>,

    /// Signal windows J
    #[arg(short = 'J', long, value_delimiter = ',')]
    pub(crate) windows: Option<Vec<usize>>,

    /// Holding lengths K
    #[arg(short = 'K', long, value_delimiter = ',')]
    pub(crate) holdings: Option<Vec<usize>>,

    /// Number of buckets
    #[arg(short = 'B', long)]
    pub(crate) buckets: Option<usize>,

    /// Valid returns required in a signal window (default: all)
    #[arg(long)]
    pub(crate) min_periods: Option<usize>,

    /// Periods skipped between signal window and formation
    #[arg(long)]
    pub(crate) skip: Option<usize>,

    /// Significance estimator (newey-west or simple)
    #[arg(long)]
    pub(crate) estimator: Option<EstimatorKind>,

    /// Fixed HAC lag instead of K - 1
    #[arg(long)]
    pub(crate) lag: Option<usize>,

    /// Output format (text or json)
    #[arg(long, value_enum, default_value = "text")]
    pub(crate) format: OutputFormat,

    /// Write per-strategy bucket returns and the report here
    #[arg(long)]
    pub(crate) export_dir: Option<PathBuf>,
}

/// Builds the study configuration from the config file and flag overrides.
pub(crate) fn build_config(args: &RunArgs) -> Result<StudyConfig> {
    let mut config = match &args.config {
        Some(path) => StudyConfig::from_json_file(path)?,
        None => StudyConfig::default(),
    };

    if let Some(start) = &args.start {
        config.start = data::parse_date(start)?;
    }
    if let Some(end) = &args.end {
        config.end = data::parse_date(end)?;
    }
    if let Some(frequency) = args.frequency {
        config.frequency = frequency;
    }
    if let Some(windows) = &args.windows {
        config.signal_windows = windows.clone();
    }
    if let Some(holdings) = &args.holdings {
        config.holding_periods = holdings.clone();
    }
    if let Some(buckets) = args.buckets {
        config.n_buckets = buckets;
    }
    if args.min_periods.is_some() {
        config.min_periods = args.min_periods;
    }
    if let Some(skip) = args.skip {
        config.skip_periods = skip;
    }
    if let Some(estimator) = args.estimator {
        config.estimator = estimator;
    }
    if args.lag.is_some() {
        config.lag_override = args.lag;
    }

    config.validate()?;
    Ok(config)
}

/// Run a momentum study and print its report.
pub(crate) fn run_study(args: &RunArgs) -> Result<()> {
    let config = build_config(args)?;
    let study = Study::new(config)?;

    let table = data::load_table(
        &args.returns,
        args.delistings.as_deref(),
        study.config().frequency,
        args.compound,
    )
    .with_context(|| format!("preparing returns from {}", args.returns.display()))?;

    let results = study.run(&table)?;
    let report = Report::assemble(&results);

    match args.format {
        OutputFormat::Text => println!("{report}"),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if let Some(dir) = &args.export_dir {
        export(&results, &report, dir)?;
    }

    Ok(())
}

/// Writes `j{J}_k{K}.csv` bucket returns for every strategy plus `report.json`.
fn export(results: &StudyResults, report: &Report, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let frequency = results.config().frequency;

    for strategy in results.strategies() {
        let path = dir.join(format!(
            "j{}_k{}.csv",
            strategy.signal_window(),
            strategy.holding_period()
        ));
        let mut df = strategy.returns.to_dataframe(frequency)?;
        ronda_data::write_csv(&mut df, &path)?;
    }

    std::fs::write(dir.join("report.json"), report.to_json()?)?;
    info!(
        dir = %dir.display(),
        strategies = results.strategies().len(),
        "exported results"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(returns: PathBuf) -> RunArgs {
        RunArgs {
            returns,
            delistings: None,
            compound: false,
            config: None,
            start: None,
            end: None,
            frequency: None,
            windows: None,
            holdings: None,
            buckets: None,
            min_periods: None,
            skip: None,
            estimator: None,
            lag: None,
            format: OutputFormat::Text,
            export_dir: None,
        }
    }

    #[test]
    fn test_flags_override_defaults() {
        let mut a = args(PathBuf::from("unused.csv"));
        a.start = Some("2000-01-01".to_string());
        a.end = Some("2004-12-31".to_string());
        a.windows = Some(vec![6]);
        a.buckets = Some(5);
        a.estimator = Some(EstimatorKind::Simple);
        a.lag = Some(3);

        let config = build_config(&a).unwrap();
        assert_eq!(config.signal_windows, vec![6]);
        assert_eq!(config.holding_periods, vec![3, 6, 9, 12]);
        assert_eq!(config.n_buckets, 5);
        assert_eq!(config.estimator, EstimatorKind::Simple);
        assert_eq!(config.lag_for(12), 3);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let mut a = args(PathBuf::from("unused.csv"));
        a.buckets = Some(1);
        assert!(build_config(&a).is_err());

        let mut a = args(PathBuf::from("unused.csv"));
        a.start = Some("1990-13-01".to_string());
        assert!(build_config(&a).is_err());
    }

    #[test]
    fn test_run_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let returns = dir.path().join("monthly.csv");
        let mut file = std::fs::File::create(&returns).unwrap();
        writeln!(file, "symbol,date,ret").unwrap();
        for month in 1..=12 {
            for (symbol, ret) in [("A", 0.00), ("B", 0.01), ("C", 0.02), ("D", 0.03)] {
                let noise = 0.002 * (month % 3) as f64;
                writeln!(file, "{symbol},2001-{month:02}-28,{}", ret + noise).unwrap();
            }
        }

        let export_dir = dir.path().join("out");
        let mut a = args(returns);
        a.start = Some("2001-01-01".to_string());
        a.end = Some("2001-12-31".to_string());
        a.windows = Some(vec![2]);
        a.holdings = Some(vec![1, 2]);
        a.buckets = Some(2);
        a.format = OutputFormat::Json;
        a.export_dir = Some(export_dir.clone());

        run_study(&a).unwrap();
        assert!(export_dir.join("j2_k1.csv").exists());
        assert!(export_dir.join("j2_k2.csv").exists());

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(export_dir.join("report.json")).unwrap())
                .unwrap();
        assert_eq!(report["rows"][0]["signal_window"], 2);
    }
}
