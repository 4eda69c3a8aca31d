//! # Druganalyzer
//!
//! Frequency analysis over the scraped catalogs. The drug-detail catalog
//! yields side-effect, drug-category, treatment-usage and indication tables;
//! the disease/drug relationship catalog yields per-family, per-disease and
//! per-drug tables; the disease catalog yields the tests, treatments and
//! medications shared across diseases.
//!
//! ## Pipeline Overview
//!
//! 1. **Data Loading**: Drug details (JSON or CSV), relationship CSV and/or disease CSV
//! 2. **Parallel Extraction**: Trigger-phrase segments per drug, items per disease, using Rayon
//! 3. **Counting**: Frequencies in catalog order, sorted by count
//! 4. **Output Generation**: One CSV per table
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin druganalyzer -- --drugs drug_details.json --relationships drugs_diseases.csv
//! cargo run --release --bin druganalyzer -- --diseases diagnosis_treatment_data_full.csv
//! ```

mod analysis;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser};

use analysis::{
    analyze_disease_catalog, analyze_drugs, analyze_relationships, percentage, shared_items,
    CatalogItemRow, DiseaseRow, DrugRow, FamilyRow, FrequencyEntry, FrequencyRow,
};
use diseasematcher::catalog;
use diseasematcher::init_logging;

#[derive(Parser)]
#[command(name = "druganalyzer", version, about, long_about = None)]
#[command(group(ArgGroup::new("inputs").required(true).multiple(true).args(["drugs", "relationships", "diseases"])))]
struct Cli {
    /// Drug detail catalog (.json keyed by drug name, or CSV)
    #[arg(short, long)]
    drugs: Option<PathBuf>,

    /// Disease/drug relationship CSV (Disease, Drug_Family, Drug_Name, Drug_URL)
    #[arg(short, long)]
    relationships: Option<PathBuf>,

    /// Disease catalog CSV (Disease, Diagnosis, Tests, Treatment, Medications)
    #[arg(short = 'D', long)]
    diseases: Option<PathBuf>,

    /// Directory for the output tables
    #[arg(short, long, default_value = "drug_analysis")]
    output_dir: PathBuf,
}

fn write_frequency_table(
    dir: &Path,
    file_name: &str,
    entries: &[FrequencyEntry],
    total_drugs: usize,
) -> Result<(), Box<dyn Error>> {
    let path = dir.join(file_name);
    let rows = entries.iter().map(|entry| FrequencyRow::new(entry, total_drugs));
    let written = catalog::write_csv(&path, rows)?;
    println!("  {} rows -> {}", written, path.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let cli = Cli::parse();
    fs::create_dir_all(&cli.output_dir)?;

    if let Some(drugs_path) = &cli.drugs {
        println!("=== Drug Detail Analysis ===\n");
        let details = catalog::load_drug_details(drugs_path)?;
        let analysis = analyze_drugs(&details);
        let total = analysis.summary.total_drugs;

        write_frequency_table(&cli.output_dir, "side_effects.csv", &analysis.side_effects, total)?;
        write_frequency_table(&cli.output_dir, "drug_categories.csv", &analysis.categories, total)?;
        write_frequency_table(&cli.output_dir, "treatment_usages.csv", &analysis.usages, total)?;
        write_frequency_table(&cli.output_dir, "drug_indications.csv", &analysis.indications, total)?;

        println!("\nTotal drugs analyzed: {}", total);
        println!(
            "Drugs without side effects: {} ({:.2}%)",
            analysis.summary.missing_side_effects,
            percentage(analysis.summary.missing_side_effects, total)
        );
        println!(
            "Drugs without descriptions: {} ({:.2}%)",
            analysis.summary.missing_descriptions,
            percentage(analysis.summary.missing_descriptions, total)
        );
        println!("Unique side effects: {}", analysis.side_effects.len());
        println!("Drug categories: {}", analysis.categories.len());
        println!("Treatment usages: {}", analysis.usages.len());
        println!("Indications: {}\n", analysis.indications.len());
    }

    if let Some(relationships_path) = &cli.relationships {
        println!("=== Disease/Drug Relationship Analysis ===\n");
        let rows = catalog::load_relationships(relationships_path)?;
        let analysis = analyze_relationships(&rows);

        let path = cli.output_dir.join("drug_families.csv");
        let written = catalog::write_csv(&path, analysis.families.iter().map(FamilyRow::from))?;
        println!("  {} rows -> {}", written, path.display());
        let path = cli.output_dir.join("diseases.csv");
        let written = catalog::write_csv(&path, analysis.diseases.iter().map(DiseaseRow::from))?;
        println!("  {} rows -> {}", written, path.display());
        let path = cli.output_dir.join("drugs.csv");
        let written = catalog::write_csv(&path, analysis.drugs.iter().map(DrugRow::from))?;
        println!("  {} rows -> {}", written, path.display());

        println!("\nRelationship rows: {}", analysis.total_rows);
        println!("Skipped incomplete rows: {}", analysis.skipped_rows);
        println!("Unique drug families: {}", analysis.families.len());
        println!("Unique diseases: {}", analysis.diseases.len());
        println!("Unique drugs: {}\n", analysis.drugs.len());
    }

    if let Some(diseases_path) = &cli.diseases {
        println!("=== Disease Catalog Analysis ===\n");
        let diseases = catalog::load_diseases(diseases_path)?;
        let analysis = analyze_disease_catalog(&diseases);

        let path = cli.output_dir.join("disease_catalog_items.csv");
        let rows = analysis.tables().into_iter().flat_map(|(category, entries)| {
            entries.iter().map(move |entry| CatalogItemRow::new(category, entry))
        });
        let written = catalog::write_csv(&path, rows)?;
        println!("  {} rows -> {}", written, path.display());

        println!("\nDiseases analyzed: {}", analysis.analyzed_diseases());
        println!("Skipped without diagnosis page: {}", analysis.skipped_diseases);
        for (category, entries) in analysis.tables() {
            println!(
                "{} items: {} ({} shared by multiple diseases)",
                category.label(),
                entries.len(),
                shared_items(entries)
            );
            for (rank, entry) in entries.iter().take(3).enumerate() {
                println!("  {}. {} ({} uses)", rank + 1, entry.item, entry.count);
            }
        }
    }

    println!("\nOutput saved to: {}", cli.output_dir.display());
    Ok(())
}
