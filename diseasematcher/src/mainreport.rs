//! # Mainreport - Target Disease Reports
//!
//! Reads the matched disease table and a drug-detail catalog, resolves each
//! target disease to a matched row, and writes one CSV report per disease
//! (text sections plus a line per medication with its drug details) and a
//! summary CSV of which targets were found.
//!
//! ## Command-line Usage
//!
//! ```bash
//! cargo run --release --bin mainreport -- \
//!     --matched final_diseases_complete.csv \
//!     --drugs drug_details.json \
//!     --output-dir reports
//! ```

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use diseasematcher::catalog::{self, MATCHED_OUTPUT};
use diseasematcher::config::AppConfig;
use diseasematcher::{init_logging, DrugLookupIndex, TargetReport, TruncationLimits};

#[derive(Parser)]
#[command(name = "mainreport", version, about, long_about = None)]
struct Cli {
    /// Matched disease table written by diseasematcher
    #[arg(short, long, default_value = MATCHED_OUTPUT)]
    matched: PathBuf,

    /// Drug detail catalog (.json keyed by drug name, or CSV)
    #[arg(short, long)]
    drugs: PathBuf,

    /// Directory for the per-disease and summary CSVs
    #[arg(short, long, default_value = "main_diseases_analysis")]
    output_dir: PathBuf,

    /// JSON configuration file overriding the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target disease, repeatable; replaces the configured list
    #[arg(short, long = "target")]
    targets: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if !cli.targets.is_empty() {
        config.report.target_diseases = cli.targets.clone();
    }
    let report_config = config.report;

    let records = catalog::load_matched(&cli.matched)?;
    let details = catalog::load_drug_details(&cli.drugs)?;
    let index = DrugLookupIndex::with_limits(
        details,
        TruncationLimits {
            what_is: report_config.what_is_limit,
            side_effects: report_config.side_effects_limit,
        },
    )?;
    info!(diseases = records.len(), drugs = index.len(), "loaded report inputs");

    let target_report = TargetReport::build(
        &records,
        &report_config.target_diseases,
        &index,
        report_config.chunk_size,
    )?;

    fs::create_dir_all(&cli.output_dir)?;
    for report in &target_report.reports {
        let path = cli.output_dir.join(format!("{}.csv", report.file_stem()));
        catalog::write_csv(&path, report.lines())?;
        println!(
            "Created report for: {} ({}/{} medications in drug catalog)",
            report.english_name,
            report.found_count(),
            report.medications.len()
        );
    }

    let summary_path = cli.output_dir.join("Summary.csv");
    catalog::write_csv(&summary_path, &target_report.statuses)?;

    println!("\n=== Report Summary ===");
    println!(
        "Diseases successfully processed: {}/{}",
        target_report.found_targets(),
        target_report.statuses.len()
    );
    println!("Success rate: {}%", target_report.success_rate());
    println!("Output saved to: {}", cli.output_dir.display());

    Ok(())
}
