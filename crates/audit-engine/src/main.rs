//! CLI entry point for the dataset audit engine.

use anyhow::{Result, anyhow};
use audit_engine::{AnalysisRecord, AnomalyDetector, QualityAssessor, parse_records};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Quality scoring and anomaly detection for tabular datasets",
    long_about = "Audits a dataset given as a JSON array of row objects.\n\n\
                  EXAMPLES:\n  \
                  # Human-readable audit\n  \
                  audit-engine -i records.json\n\n  \
                  # Raw JSON analysis record for piping\n  \
                  audit-engine -i records.json --json | jq .outlier_indices"
)]
struct Args {
    /// Path to a JSON file containing an array of row objects
    #[arg(short, long)]
    input: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the raw JSON analysis record instead of a human-readable
    /// summary
    ///
    /// Disables all logging so stdout only contains the JSON.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    // keep stdout clean when emitting JSON
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    if !std::path::Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let raw = std::fs::read_to_string(&args.input)?;
    let records = parse_records(&raw)?;
    info!("loaded {} records from {}", records.len(), args.input);

    let quality = QualityAssessor::assess(&records);
    let outliers = AnomalyDetector::new().detect(&records);
    let record = AnalysisRecord::new(quality, outliers);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", record.quality.summary);
        println!("{}", record.anomaly_summary);
        if !record.outlier_indices.is_empty() {
            println!("Outlier row indices: {:?}", record.outlier_indices);
        }
    }

    Ok(())
}
