//! Timetable import preview.
//!
//! Reads a JSON document of existing courses and recognized candidates,
//! prints the partitioned report (clean, conflicting, rejected, selected).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studyplan_import::{build_report, ImportDocument};

/// Command-line arguments for studyplan-import
#[derive(Parser, Debug)]
#[command(name = "studyplan-import")]
#[command(about = "Check recognized timetable courses for schedule conflicts")]
#[command(version)]
struct Args {
    /// JSON file with `existing` courses and OCR `candidates`
    #[arg(env = "STUDYPLAN_IMPORT_INPUT")]
    input: PathBuf,

    /// Candidate index to select even though it conflicts (repeatable)
    #[arg(long = "force-include", value_name = "INDEX")]
    force_include: Vec<usize>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studyplan_import=info,studyplan_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let document: ImportDocument = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    tracing::info!(
        existing = document.existing.len(),
        candidates = document.candidates.len(),
        "Loaded import document"
    );

    let report = build_report(document, &args.force_include).context("Import check failed")?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{output}");

    Ok(())
}
