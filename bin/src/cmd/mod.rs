//! CLI subcommand modules.
//!
//! This module contains the implementations for all ronda CLI subcommands.

pub(crate) mod config;
pub(crate) mod run;

pub(crate) use config::print_config;
pub(crate) use run::{RunArgs, run_study};
