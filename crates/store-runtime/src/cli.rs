//! Command-line arguments.

use crate::logging::LogFormat;
use clap::Parser;
use std::path::PathBuf;

/// Aurelia store backend.
#[derive(Debug, Parser)]
#[command(name = "aurelia-store", version, about)]
pub struct Cli {
    /// TOML configuration file. Environment variables override it.
    #[arg(short, long, env = "AURELIA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Load and validate the configuration, then exit.
    #[arg(long)]
    pub check_config: bool,
}
