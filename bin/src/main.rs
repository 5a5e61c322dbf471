//! Ronda CLI binary.
//!
//! Provides command-line interface for ronda momentum backtests.

mod cmd;
mod data;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cmd::{RunArgs, print_config, run_study};

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "Overlapping-portfolio momentum backtests", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a momentum study over a return file
    Run(RunArgs),

    /// Print the default study configuration as JSON
    Config {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Initialize logging based on verbosity level.
    fn init_logging(&self) -> Result<()> {
        let level = match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;
        Ok(())
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging()?;

    match cli.command {
        Commands::Run(args) => run_study(&args)?,
        Commands::Config { output } => print_config(output.as_deref())?,
    }

    Ok(())
}
