use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "agrispray",
    version,
    about = "Sprayability windows for agricultural treatments from hourly forecasts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assess the next hours for a field (default)
    Report(ReportArgs),
    /// List crop, product and wind-sensitivity presets
    Presets,
    /// Validate config and test connections
    Check,
    /// Re-run interactive setup
    Init,
    /// Serve the mock agronomist advisory API
    MockAdvisor {
        /// Port to listen on (defaults to the config value)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Field latitude
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Field longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Place name to geocode instead of coordinates
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub place: Option<String>,

    /// Crop preset key
    #[arg(long)]
    pub crop: Option<String>,

    /// Product preset key
    #[arg(long)]
    pub product: Option<String>,

    /// Wind-sensitivity preset key
    #[arg(long)]
    pub wind: Option<String>,

    /// Minimum continuous window in hours (1-12)
    #[arg(long)]
    pub min_window: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Persist the selection as the new defaults
    #[arg(long)]
    pub save: bool,

    /// Skip the remote advisory service
    #[arg(long)]
    pub no_ai: bool,
}

impl ReportArgs {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }
}
