//! CLI argument parsing for Wakeline

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "wakeline")]
#[command(version)]
#[command(about = "Battery history interval engine for Android bug reports", long_about = None)]
pub struct Cli {
    /// Parsed event stream to analyze (JSON array of series records)
    pub input: PathBuf,

    /// Minimum visible duration at the target zoom level, in milliseconds
    #[arg(long = "min-duration", value_name = "MS", default_value = "6000")]
    pub min_visible_duration: i64,

    /// Device battery capacity in mAh; enables discharge-rate output
    #[arg(long = "capacity", value_name = "MAH")]
    pub capacity_mah: Option<f64>,

    /// Idle current threshold in mA for power attribution
    #[arg(long = "idle-threshold", value_name = "MA", default_value = "10.0")]
    pub idle_threshold_ma: f64,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing to stderr
    #[arg(short, long)]
    pub debug: bool,
}
