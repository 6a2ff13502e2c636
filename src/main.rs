use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wakeline::cli::{Cli, OutputFormat};
use wakeline::power::PowerConfig;
use wakeline::report::{analyze, AnalysisOptions};
use wakeline::series::SeriesRecord;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let raw = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let records: Vec<SeriesRecord> =
        serde_json::from_str(&raw).context("failed to parse event stream")?;

    let options = AnalysisOptions {
        min_visible_duration: cli.min_visible_duration,
        capacity_mah: cli.capacity_mah,
        power: PowerConfig {
            idle_threshold_ma: cli.idle_threshold_ma,
            ..PowerConfig::default()
        },
        ..AnalysisOptions::default()
    };
    options
        .power
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid power configuration: {e}"))?;

    let analysis = analyze(&records, &options)?;
    match cli.format {
        OutputFormat::Text => print!("{}", analysis.to_report_string()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
    }
    Ok(())
}
