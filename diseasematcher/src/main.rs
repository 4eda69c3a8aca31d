//! # Diseasematcher - Disease to Medication Cross-Referencing
//!
//! Links a scraped disease catalog (diagnosis, treatment, tests per disease)
//! with a scraped drug-relationship catalog (disease, drug family, drug name)
//! and writes one enriched row per distinct disease.
//!
//! ## Pipeline Overview
//!
//! 1. **Loading**: Read both CSV catalogs, canonicalizing header spellings
//! 2. **Matching**: Score every disease against the relationship diseases in parallel
//! 3. **Output Generation**: Write `final_diseases_complete.csv`
//! 4. **Statistics Reporting**: Coverage and top diseases by medication count
//!
//! ## Command-line Usage
//!
//! ```bash
//! cargo run --release --bin diseasematcher -- \
//!     --diseases mayo_clinic_diseases.csv \
//!     --relationships drugs_diseases.csv
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use diseasematcher::catalog::{self, MATCHED_OUTPUT};
use diseasematcher::config::{AppConfig, CandidateStrategy, APP_NAME, APP_VERSION};
use diseasematcher::{init_logging, DiseaseDrugMatcher, MatchSummary};

#[derive(Parser)]
#[command(name = "diseasematcher", version, about, long_about = None)]
struct Cli {
    /// Disease catalog CSV (Disease, Diagnosis, Treatment, Tests)
    #[arg(short, long)]
    diseases: PathBuf,

    /// Drug relationship CSV (Disease, Drug_Family, Drug_Name, Drug_URL)
    #[arg(short, long)]
    relationships: PathBuf,

    /// Output CSV path
    #[arg(short, long, default_value = MATCHED_OUTPUT)]
    output: PathBuf,

    /// JSON configuration file overriding the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only score relationship rows sharing a word with the disease name
    #[arg(long)]
    token_blocking: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if cli.token_blocking {
        config.matcher.candidate_strategy = CandidateStrategy::TokenBlocked;
    }
    info!(app = APP_NAME, version = APP_VERSION, "starting");

    let diseases = catalog::load_diseases(&cli.diseases)?;
    let relationships = catalog::load_relationships(&cli.relationships)?;

    let matcher = DiseaseDrugMatcher::new(config.matcher);
    let records = matcher.match_catalogs(&diseases, &relationships)?;

    catalog::write_disease_records(&cli.output, &records)?;

    println!();
    print!("{}", MatchSummary::from_records(&records, config.report.top_n));
    println!("\nOutput saved to: {}", cli.output.display());

    Ok(())
}
