//! Config command implementation.

use anyhow::{Context, Result};
use ronda_traits::StudyConfig;
use std::path::Path;

/// Print the default study configuration, or write it to `output`.
pub(crate) fn print_config(output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&StudyConfig::default())?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote default configuration to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
