pub mod assumptions;
pub mod input;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "propshare")]
#[command(about = "Per-share investment economics for fractional property listings")]
pub struct CliConfig {
    /// Property records (.json, or .toml with [[properties]])
    #[arg(short, long)]
    pub property: String,

    /// TOML file overriding the default model assumptions
    #[arg(short, long)]
    pub assumptions: Option<String>,

    /// Holding periods in years for the projection table
    #[arg(long, value_delimiter = ',')]
    pub years: Vec<f64>,

    /// Share count for an investor position
    #[arg(long)]
    pub shares: Option<u64>,

    /// Write the projection table to this CSV file
    #[arg(long)]
    pub csv: Option<String>,

    /// Print the full report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
