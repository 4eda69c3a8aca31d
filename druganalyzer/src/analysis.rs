//! Frequency tables over the drug-detail, relationship and disease catalogs.
//!
//! Extraction runs per drug (or per disease) on the rayon pool; counting
//! happens afterwards in catalog order, so ties in every table resolve by
//! first appearance.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use diseasematcher::segment::{extract_category, extract_indications, SegmentExtractor};
use diseasematcher::text::{collapse_whitespace, normalize};
use diseasematcher::{AbsentReason, DiseaseSource, DrugDetail, DrugRelationship, Field};

/// Endings common in generic drug names.
const MEDICATION_SUFFIXES: &[&str] = &[
    "cillin", "mycin", "azole", "prazole", "olol", "pril", "sartan", "statin", "ide", "ine", "ate",
    "one", "um", "ex", "max",
];

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("static pattern"));

/// One item with the number of times it appeared and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyEntry {
    pub item: String,
    pub count: usize,
    /// Drug or disease names, one per occurrence
    pub sources: Vec<String>,
}

impl FrequencyEntry {
    /// Distinct sources in first-appearance order.
    pub fn unique_sources(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.sources
            .iter()
            .map(String::as_str)
            .filter(|source| seen.insert(*source))
            .collect()
    }
}

/// Counts items in first-appearance order.
#[derive(Debug, Default)]
pub struct FrequencyCounter {
    positions: HashMap<String, usize>,
    entries: Vec<FrequencyEntry>,
}

impl FrequencyCounter {
    pub fn add(&mut self, item: &str, source: &str) {
        let position = match self.positions.get(item) {
            Some(&position) => position,
            None => {
                self.positions.insert(item.to_string(), self.entries.len());
                self.entries.push(FrequencyEntry {
                    item: item.to_string(),
                    count: 0,
                    sources: Vec::new(),
                });
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[position];
        entry.count += 1;
        entry.sources.push(source.to_string());
    }

    /// Entries by count, highest first; the sort is stable.
    pub fn into_sorted(mut self) -> Vec<FrequencyEntry> {
        self.entries.sort_by(|a, b| b.count.cmp(&a.count));
        self.entries
    }
}

/// What one drug's description and side-effect text yielded.
#[derive(Debug, Clone, Default)]
struct DrugFindings {
    side_effects: Vec<String>,
    category: Option<String>,
    usages: Vec<String>,
    indications: Vec<String>,
}

/// Coverage of the drug-detail catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrugSummary {
    /// Entries in the catalog
    pub total_drugs: usize,
    /// Entries whose side-effect text is a sentinel or empty
    pub missing_side_effects: usize,
    /// Entries whose description is a sentinel or empty
    pub missing_descriptions: usize,
}

/// Tables built from the drug-detail catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugAnalysis {
    /// Side-effect items after the side-effect trigger phrases
    pub side_effects: Vec<FrequencyEntry>,
    /// Drug classes from "is a ... that" phrasing
    pub categories: Vec<FrequencyEntry>,
    /// Conditions listed after "is used to treat" and "is used for"
    pub usages: Vec<FrequencyEntry>,
    /// Whole sentence remainders after the indication phrases
    pub indications: Vec<FrequencyEntry>,
    pub summary: DrugSummary,
}

/// Side-effect, category, usage and indication tables for a drug-detail catalog.
pub fn analyze_drugs(details: &[DrugDetail]) -> DrugAnalysis {
    let side_effect_extractor = SegmentExtractor::side_effects();
    let usage_extractor = SegmentExtractor::usages();
    let processed = AtomicUsize::new(0);

    let findings: Vec<DrugFindings> = details
        .par_iter()
        .map(|detail| {
            let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if count % 1000 == 0 {
                debug!(processed = count, total = details.len(), "extracting drug text");
            }

            let mut findings = DrugFindings::default();
            if let Some(text) = detail.side_effects.as_text() {
                findings.side_effects = side_effect_extractor
                    .extract(text)
                    .all_items()
                    .map(str::to_string)
                    .collect();
            }
            if let Some(text) = detail.what_is.as_text() {
                findings.category = extract_category(text);
                findings.usages = usage_extractor
                    .extract(text)
                    .all_items()
                    .map(str::to_string)
                    .collect();
                let mut seen = HashSet::new();
                findings.indications = extract_indications(text);
                findings.indications.retain(|indication| seen.insert(indication.clone()));
            }
            findings
        })
        .collect();

    let mut side_effects = FrequencyCounter::default();
    let mut categories = FrequencyCounter::default();
    let mut usages = FrequencyCounter::default();
    let mut indications = FrequencyCounter::default();

    for (detail, found) in details.iter().zip(&findings) {
        let drug = detail.drug_name.as_str();
        for item in &found.side_effects {
            side_effects.add(item, drug);
        }
        if let Some(category) = &found.category {
            categories.add(category, drug);
        }
        for item in &found.usages {
            usages.add(item, drug);
        }
        for item in &found.indications {
            indications.add(item, drug);
        }
    }

    let summary = DrugSummary {
        total_drugs: details.len(),
        missing_side_effects: details.iter().filter(|d| !d.side_effects.is_present()).count(),
        missing_descriptions: details.iter().filter(|d| !d.what_is.is_present()).count(),
    };

    let analysis = DrugAnalysis {
        side_effects: side_effects.into_sorted(),
        categories: categories.into_sorted(),
        usages: usages.into_sorted(),
        indications: indications.into_sorted(),
        summary,
    };
    info!(
        side_effects = analysis.side_effects.len(),
        categories = analysis.categories.len(),
        usages = analysis.usages.len(),
        indications = analysis.indications.len(),
        "drug text analysis complete"
    );
    analysis
}

/// Row count of one family, disease or drug plus what it co-occurred with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipEntry {
    pub name: String,
    pub count: usize,
    /// First related dimension, unique in first-appearance order.
    pub first: Vec<String>,
    /// Second related dimension, unique in first-appearance order.
    pub second: Vec<String>,
}

#[derive(Debug, Default)]
struct RelationshipCounter {
    positions: HashMap<String, usize>,
    entries: Vec<RelationshipEntry>,
    seen: Vec<(HashSet<String>, HashSet<String>)>,
}

impl RelationshipCounter {
    fn add(&mut self, name: &str, first: &str, second: &str) {
        let position = match self.positions.get(name) {
            Some(&position) => position,
            None => {
                self.positions.insert(name.to_string(), self.entries.len());
                self.entries.push(RelationshipEntry {
                    name: name.to_string(),
                    count: 0,
                    first: Vec::new(),
                    second: Vec::new(),
                });
                self.seen.push(Default::default());
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[position];
        let (seen_first, seen_second) = &mut self.seen[position];
        entry.count += 1;
        if seen_first.insert(first.to_string()) {
            entry.first.push(first.to_string());
        }
        if seen_second.insert(second.to_string()) {
            entry.second.push(second.to_string());
        }
    }

    fn into_sorted(mut self) -> Vec<RelationshipEntry> {
        self.entries.sort_by(|a, b| b.count.cmp(&a.count));
        self.entries
    }
}

/// Family, disease and drug tables from the relationship catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipAnalysis {
    /// Related: diseases, drugs.
    pub families: Vec<RelationshipEntry>,
    /// Related: families, drugs.
    pub diseases: Vec<RelationshipEntry>,
    /// Related: families, diseases.
    pub drugs: Vec<RelationshipEntry>,
    /// Rows read from the catalog
    pub total_rows: usize,
    /// Rows missing a disease, family or drug name
    pub skipped_rows: usize,
}

/// Rows missing a disease, family or drug name are skipped.
pub fn analyze_relationships(rows: &[DrugRelationship]) -> RelationshipAnalysis {
    let mut families = RelationshipCounter::default();
    let mut diseases = RelationshipCounter::default();
    let mut drugs = RelationshipCounter::default();
    let mut skipped_rows = 0;

    for row in rows {
        let disease = row.disease.trim();
        let family = row.drug_family.trim();
        let drug = row.drug_name.trim();
        if disease.is_empty() || family.is_empty() || drug.is_empty() {
            skipped_rows += 1;
            continue;
        }

        families.add(family, disease, drug);
        diseases.add(disease, family, drug);
        drugs.add(drug, family, disease);
    }

    let analysis = RelationshipAnalysis {
        families: families.into_sorted(),
        diseases: diseases.into_sorted(),
        drugs: drugs.into_sorted(),
        total_rows: rows.len(),
        skipped_rows,
    };
    info!(
        families = analysis.families.len(),
        diseases = analysis.diseases.len(),
        drugs = analysis.drugs.len(),
        skipped = skipped_rows,
        "relationship analysis complete"
    );
    analysis
}

/// Test, treatment and medication items of a disease catalog split on `;`
/// and `|`, normalized, with short fragments dropped.
///
/// Sentinel fields yield nothing.
pub fn split_catalog_items(field: &Field) -> Vec<String> {
    let Some(text) = field.as_text() else {
        return Vec::new();
    };
    text.split(&[';', '|'][..])
        .map(str::trim)
        .filter(|item| item.chars().count() > 3)
        .map(normalize)
        .filter(|item| item.chars().count() > 2)
        .collect()
}

fn is_proper_name(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(first), Some(second)) if first.is_ascii_uppercase() && second.is_ascii_lowercase()
    )
}

/// Likely medication names in a disease page's medication paragraph.
///
/// Items are split on `;`, `|` and `,`. Within an item, a word of four or
/// more letters counts when it has a drug-like ending, is capitalized in the
/// source, or has six or more letters; it is taken together with the next
/// word when that one has three or more letters. The whole cleaned item is
/// kept as well unless it is longer than 50 characters or reads "such as".
/// Results are distinct, in first-appearance order.
pub fn extract_medication_names(field: &Field) -> Vec<String> {
    let Some(text) = field.as_text() else {
        return Vec::new();
    };

    let mut candidates = Vec::new();
    for item in text
        .split(&[';', '|', ','][..])
        .map(str::trim)
        .filter(|item| item.len() > 2)
    {
        let cleaned = collapse_whitespace(&NON_WORD.replace_all(&item.to_lowercase(), " "));
        let words: Vec<&str> = cleaned.split(' ').collect();
        let source_words: Vec<&str> = item.split(' ').collect();

        for (i, word) in words.iter().enumerate() {
            if word.len() < 4 {
                continue;
            }
            let drug_like = MEDICATION_SUFFIXES.iter().any(|suffix| word.ends_with(suffix));
            let proper = source_words.get(i).is_some_and(|source| is_proper_name(source));
            if !(drug_like || proper || word.len() >= 6) {
                continue;
            }
            match words.get(i + 1) {
                Some(next) if next.len() >= 3 => candidates.push(format!("{} {}", word, next)),
                _ => candidates.push(word.to_string()),
            }
        }

        if (4..=50).contains(&cleaned.len()) && !cleaned.contains("such as") {
            candidates.push(cleaned);
        }
    }

    let mut seen = HashSet::new();
    candidates.retain(|name| seen.insert(name.clone()));
    candidates
}

/// Which disease catalog column an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCategory {
    Test,
    Treatment,
    Medication,
}

impl ItemCategory {
    pub fn label(self) -> &'static str {
        match self {
            ItemCategory::Test => "Test",
            ItemCategory::Treatment => "Treatment",
            ItemCategory::Medication => "Medication",
        }
    }
}

#[derive(Debug, Clone, Default)]
struct DiseaseFindings {
    tests: Vec<String>,
    treatments: Vec<String>,
    medications: Vec<String>,
}

/// Tests, treatments and medications counted across a disease catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseCatalogAnalysis {
    pub tests: Vec<FrequencyEntry>,
    pub treatments: Vec<FrequencyEntry>,
    pub medications: Vec<FrequencyEntry>,
    /// Rows in the catalog
    pub total_diseases: usize,
    /// Rows whose diagnosis page was not found or failed to scrape
    pub skipped_diseases: usize,
}

impl DiseaseCatalogAnalysis {
    /// The three tables, each tagged with its category.
    pub fn tables(&self) -> [(ItemCategory, &[FrequencyEntry]); 3] {
        [
            (ItemCategory::Test, self.tests.as_slice()),
            (ItemCategory::Treatment, self.treatments.as_slice()),
            (ItemCategory::Medication, self.medications.as_slice()),
        ]
    }

    pub fn analyzed_diseases(&self) -> usize {
        self.total_diseases - self.skipped_diseases
    }
}

/// Items used by more than one disease.
pub fn shared_items(entries: &[FrequencyEntry]) -> usize {
    entries
        .iter()
        .filter(|entry| entry.unique_sources().len() > 1)
        .count()
}

fn diagnosis_scraped(disease: &DiseaseSource) -> bool {
    !matches!(
        disease.diagnosis,
        Field::Absent(AbsentReason::NotFound | AbsentReason::ScrapeError(_))
    )
}

/// Shared test, treatment and medication tables for a disease catalog.
///
/// # Arguments
///
/// * `diseases` - Disease catalog rows with tests, treatment and medications text
///
/// # Returns
///
/// One table per category, most used first. Rows whose diagnosis page is a
/// not-found or error sentinel are skipped.
pub fn analyze_disease_catalog(diseases: &[DiseaseSource]) -> DiseaseCatalogAnalysis {
    let valid: Vec<&DiseaseSource> = diseases.iter().filter(|d| diagnosis_scraped(d)).collect();
    let processed = AtomicUsize::new(0);

    let findings: Vec<DiseaseFindings> = valid
        .par_iter()
        .map(|disease| {
            let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if count % 50 == 0 {
                debug!(processed = count, total = valid.len(), "extracting disease items");
            }
            DiseaseFindings {
                tests: split_catalog_items(&disease.tests),
                treatments: split_catalog_items(&disease.treatment),
                medications: extract_medication_names(&disease.medications),
            }
        })
        .collect();

    let mut tests = FrequencyCounter::default();
    let mut treatments = FrequencyCounter::default();
    let mut medications = FrequencyCounter::default();

    for (disease, found) in valid.iter().zip(&findings) {
        let name = disease.name.as_str();
        for item in &found.tests {
            tests.add(item, name);
        }
        for item in &found.treatments {
            treatments.add(item, name);
        }
        for item in &found.medications {
            medications.add(item, name);
        }
    }

    let analysis = DiseaseCatalogAnalysis {
        tests: tests.into_sorted(),
        treatments: treatments.into_sorted(),
        medications: medications.into_sorted(),
        total_diseases: diseases.len(),
        skipped_diseases: diseases.len() - valid.len(),
    };
    info!(
        diseases = analysis.analyzed_diseases(),
        skipped = analysis.skipped_diseases,
        tests = analysis.tests.len(),
        treatments = analysis.treatments.len(),
        medications = analysis.medications.len(),
        "disease catalog analysis complete"
    );
    analysis
}

/// `count / total * 100` rounded to two decimals.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// CSV row of a drug frequency table.
#[derive(Debug, Serialize)]
pub struct FrequencyRow<'a> {
    #[serde(rename = "Item")]
    pub item: &'a str,
    #[serde(rename = "Count")]
    pub count: usize,
    /// Share of all drugs, two decimals
    #[serde(rename = "Percentage")]
    pub percentage: String,
    #[serde(rename = "Drugs")]
    pub drugs: String,
}

impl<'a> FrequencyRow<'a> {
    pub fn new(entry: &'a FrequencyEntry, total_drugs: usize) -> Self {
        FrequencyRow {
            item: &entry.item,
            count: entry.count,
            percentage: format!("{:.2}", percentage(entry.count, total_drugs)),
            drugs: entry.sources.join("; "),
        }
    }
}

/// CSV row of the disease catalog item table.
#[derive(Debug, Serialize)]
pub struct CatalogItemRow<'a> {
    #[serde(rename = "Category")]
    pub category: &'static str,
    #[serde(rename = "Item")]
    pub item: &'a str,
    #[serde(rename = "Usage Count")]
    pub usage_count: usize,
    #[serde(rename = "Number of Diseases")]
    pub disease_count: usize,
    #[serde(rename = "Shared by Multiple Diseases")]
    pub shared: &'static str,
    /// Whole item, or only its first word for medications
    #[serde(rename = "Clean Name for Drug Matching")]
    pub match_name: &'a str,
    /// Words of three or more letters
    #[serde(rename = "Search Terms")]
    pub search_terms: String,
    #[serde(rename = "Diseases Using This Item")]
    pub diseases: String,
}

impl<'a> CatalogItemRow<'a> {
    pub fn new(category: ItemCategory, entry: &'a FrequencyEntry) -> Self {
        let diseases = entry.unique_sources();
        let match_name = match category {
            ItemCategory::Medication => entry.item.split(' ').next().unwrap_or_default(),
            ItemCategory::Test | ItemCategory::Treatment => entry.item.as_str(),
        };
        let search_terms: Vec<&str> = entry.item.split(' ').filter(|word| word.len() >= 3).collect();

        CatalogItemRow {
            category: category.label(),
            item: &entry.item,
            usage_count: entry.count,
            disease_count: diseases.len(),
            shared: if diseases.len() > 1 { "Yes" } else { "No" },
            match_name,
            search_terms: search_terms.join(", "),
            diseases: diseases.join("; "),
        }
    }
}

/// CSV row of the drug family table.
#[derive(Debug, Serialize)]
pub struct FamilyRow<'a> {
    #[serde(rename = "Drug Family")]
    pub family: &'a str,
    #[serde(rename = "Total Uses")]
    pub count: usize,
    #[serde(rename = "Unique Diseases")]
    pub unique_diseases: usize,
    #[serde(rename = "Unique Drugs")]
    pub unique_drugs: usize,
    #[serde(rename = "Diseases")]
    pub diseases: String,
    #[serde(rename = "Drugs")]
    pub drugs: String,
}

impl<'a> From<&'a RelationshipEntry> for FamilyRow<'a> {
    fn from(entry: &'a RelationshipEntry) -> Self {
        FamilyRow {
            family: &entry.name,
            count: entry.count,
            unique_diseases: entry.first.len(),
            unique_drugs: entry.second.len(),
            diseases: entry.first.join("; "),
            drugs: entry.second.join("; "),
        }
    }
}

/// CSV row of the per-disease table.
#[derive(Debug, Serialize)]
pub struct DiseaseRow<'a> {
    #[serde(rename = "Disease")]
    pub disease: &'a str,
    #[serde(rename = "Total Drug Entries")]
    pub count: usize,
    #[serde(rename = "Unique Families")]
    pub unique_families: usize,
    #[serde(rename = "Unique Drugs")]
    pub unique_drugs: usize,
    #[serde(rename = "Families")]
    pub families: String,
    #[serde(rename = "Drugs")]
    pub drugs: String,
}

impl<'a> From<&'a RelationshipEntry> for DiseaseRow<'a> {
    fn from(entry: &'a RelationshipEntry) -> Self {
        DiseaseRow {
            disease: &entry.name,
            count: entry.count,
            unique_families: entry.first.len(),
            unique_drugs: entry.second.len(),
            families: entry.first.join("; "),
            drugs: entry.second.join("; "),
        }
    }
}

/// CSV row of the per-drug table.
#[derive(Debug, Serialize)]
pub struct DrugRow<'a> {
    #[serde(rename = "Drug Name")]
    pub drug: &'a str,
    #[serde(rename = "Total Uses")]
    pub count: usize,
    #[serde(rename = "Unique Families")]
    pub unique_families: usize,
    #[serde(rename = "Unique Diseases")]
    pub unique_diseases: usize,
    #[serde(rename = "Families")]
    pub families: String,
    #[serde(rename = "Diseases")]
    pub diseases: String,
}

impl<'a> From<&'a RelationshipEntry> for DrugRow<'a> {
    fn from(entry: &'a RelationshipEntry) -> Self {
        DrugRow {
            drug: &entry.name,
            count: entry.count,
            unique_families: entry.first.len(),
            unique_diseases: entry.second.len(),
            families: entry.first.join("; "),
            diseases: entry.second.join("; "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diseasematcher::catalog::write_rows;

    fn drug(name: &str, what_is: &str, side_effects: &str) -> DrugDetail {
        DrugDetail {
            drug_name: name.to_string(),
            what_is: Field::from_raw(what_is),
            side_effects: Field::from_raw(side_effects),
            url: String::new(),
        }
    }

    fn catalog() -> Vec<DrugDetail> {
        vec![
            drug(
                "Ibuprofen",
                "Ibuprofen is a nonsteroidal anti-inflammatory drug that reduces hormones. \
                 Ibuprofen is used to treat pain, fever.",
                "Common side effects include nausea, headache, dizziness.",
            ),
            drug(
                "Naproxen",
                "Naproxen is a nonsteroidal anti-inflammatory drug that reduces hormones. \
                 Naproxen is used to treat pain, arthritis.",
                "Common side effects include heartburn, headache.",
            ),
            drug("Mystery", "Information not found", "Side effects not found"),
        ]
    }

    fn disease(name: &str, diagnosis: &str, tests: &str, treatment: &str, medications: &str) -> DiseaseSource {
        DiseaseSource {
            name: name.to_string(),
            diagnosis: Field::from_raw(diagnosis),
            treatment: Field::from_raw(treatment),
            tests: Field::from_raw(tests),
            medications: Field::from_raw(medications),
        }
    }

    fn relationship(disease: &str, family: &str, drug: &str) -> DrugRelationship {
        DrugRelationship {
            disease: disease.into(),
            drug_family: family.into(),
            drug_name: drug.into(),
            drug_url: String::new(),
        }
    }

    fn header_line<T: Serialize>(rows: impl IntoIterator<Item = T>) -> String {
        let mut out = Vec::new();
        write_rows(&mut out, rows).unwrap();
        String::from_utf8(out).unwrap().lines().next().unwrap_or_default().to_string()
    }

    #[test]
    fn side_effects_count_across_drugs() {
        let analysis = analyze_drugs(&catalog());
        let headache = analysis
            .side_effects
            .iter()
            .find(|entry| entry.item == "headache")
            .unwrap();
        assert_eq!(headache.count, 2);
        assert_eq!(headache.sources, ["Ibuprofen", "Naproxen"]);
        assert_eq!(analysis.side_effects[0].item, "headache");
    }

    #[test]
    fn ties_keep_first_appearance() {
        let analysis = analyze_drugs(&catalog());
        let usages: Vec<_> = analysis.usages.iter().map(|e| e.item.as_str()).collect();
        assert_eq!(usages, ["pain", "fever", "arthritis"]);

        let side_effects: Vec<_> = analysis.side_effects.iter().map(|e| e.item.as_str()).collect();
        assert_eq!(
            side_effects,
            ["headache", "include nausea", "dizziness", "include heartburn"]
        );
    }

    #[test]
    fn categories_and_summary() {
        let analysis = analyze_drugs(&catalog());
        assert_eq!(analysis.categories.len(), 1);
        assert_eq!(analysis.categories[0].item, "nonsteroidal anti-inflammatory drug");
        assert_eq!(analysis.categories[0].count, 2);
        assert_eq!(
            analysis.summary,
            DrugSummary {
                total_drugs: 3,
                missing_side_effects: 1,
                missing_descriptions: 1,
            }
        );
    }

    #[test]
    fn indications_keep_the_whole_sentence_remainder() {
        let analysis = analyze_drugs(&catalog());
        let indications: Vec<_> = analysis.indications.iter().map(|e| e.item.as_str()).collect();
        assert_eq!(
            indications,
            [
                "nonsteroidal anti-inflammatory drug that reduces hormones",
                "pain, fever",
                "pain, arthritis"
            ]
        );
        assert_eq!(analysis.indications[0].sources, ["Ibuprofen", "Naproxen"]);
    }

    #[test]
    fn secondary_uses_are_indications_not_usages() {
        let details = vec![drug(
            "Metformin",
            "Metformin is used to treat type 2 diabetes. It may also be used for polycystic ovary syndrome.",
            "",
        )];
        let analysis = analyze_drugs(&details);

        let indications: Vec<_> = analysis.indications.iter().map(|e| e.item.as_str()).collect();
        assert_eq!(indications, ["type 2 diabetes", "polycystic ovary syndrome"]);
        let usages: Vec<_> = analysis.usages.iter().map(|e| e.item.as_str()).collect();
        assert_eq!(usages, ["type 2 diabetes"]);
    }

    #[test]
    fn relationship_tables_collect_unique_partners() {
        let rows = vec![
            relationship("Asthma", "Bronchodilators", "Albuterol"),
            relationship("COPD", "Bronchodilators", "Albuterol"),
            relationship("Asthma", "Leukotriene modifiers", "Montelukast"),
            DrugRelationship::new("Gout", "Allopurinol"),
        ];

        let analysis = analyze_relationships(&rows);
        assert_eq!(analysis.skipped_rows, 1);

        let family = &analysis.families[0];
        assert_eq!(family.name, "Bronchodilators");
        assert_eq!(family.count, 2);
        assert_eq!(family.first, ["Asthma", "COPD"]);
        assert_eq!(family.second, ["Albuterol"]);

        let names: Vec<_> = analysis.diseases.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Asthma", "COPD"]);
        assert_eq!(analysis.drugs[0].second, ["Asthma", "COPD"]);
    }

    #[test]
    fn relationship_rows_name_their_columns() {
        let rows = vec![
            relationship("Asthma", "Bronchodilators", "Albuterol"),
            relationship("COPD", "Bronchodilators", "Albuterol"),
        ];
        let analysis = analyze_relationships(&rows);

        let family = FamilyRow::from(&analysis.families[0]);
        assert_eq!(family.unique_diseases, 2);
        assert_eq!(family.diseases, "Asthma; COPD");
        assert_eq!(family.drugs, "Albuterol");

        let drug = DrugRow::from(&analysis.drugs[0]);
        assert_eq!(drug.families, "Bronchodilators");
        assert_eq!(drug.unique_diseases, 2);

        assert_eq!(
            header_line(analysis.families.iter().map(FamilyRow::from)),
            "Drug Family,Total Uses,Unique Diseases,Unique Drugs,Diseases,Drugs"
        );
        assert_eq!(
            header_line(analysis.diseases.iter().map(DiseaseRow::from)),
            "Disease,Total Drug Entries,Unique Families,Unique Drugs,Families,Drugs"
        );
        assert_eq!(
            header_line(analysis.drugs.iter().map(DrugRow::from)),
            "Drug Name,Total Uses,Unique Families,Unique Diseases,Families,Diseases"
        );
    }

    #[test]
    fn catalog_items_split_on_semicolons_and_pipes() {
        let field = Field::from_raw("Blood test; ECG | Chest X-ray (CXR)");
        assert_eq!(split_catalog_items(&field), ["blood test", "chest x-ray cxr"]);
        assert!(split_catalog_items(&Field::from_raw("Tests information not found")).is_empty());
        assert!(split_catalog_items(&Field::from_raw("ERROR - timeout")).is_empty());
    }

    #[test]
    fn medication_names_by_shape() {
        let field = Field::from_raw("Allopurinol (Zyloprim); drugs such as NSAIDs | Advil");
        assert_eq!(
            extract_medication_names(&field),
            ["allopurinol zyloprim", "zyloprim", "nsaids", "advil"]
        );
        assert!(
            extract_medication_names(&Field::from_raw("Medications information not found")).is_empty()
        );
    }

    #[test]
    fn disease_catalog_counts_shared_items() {
        let diseases = vec![
            disease(
                "Gout",
                "Joint fluid test",
                "Joint fluid test; Blood test | Ultrasound",
                "Medications; Diet changes",
                "Allopurinol; Colchicine",
            ),
            disease(
                "Kidney stones",
                "Imaging",
                "Blood test; Urine testing",
                "Diet changes",
                "Allopurinol; Potassium citrate",
            ),
            disease("Broken page", "NO_DIAGNOSIS_URL", "Blood test", "Rest", "Aspirin"),
        ];

        let analysis = analyze_disease_catalog(&diseases);
        assert_eq!(analysis.total_diseases, 3);
        assert_eq!(analysis.skipped_diseases, 1);
        assert_eq!(analysis.analyzed_diseases(), 2);

        let tests: Vec<_> = analysis.tests.iter().map(|e| e.item.as_str()).collect();
        assert_eq!(tests, ["blood test", "joint fluid test", "ultrasound", "urine testing"]);
        assert_eq!(analysis.tests[0].unique_sources(), ["Gout", "Kidney stones"]);

        assert_eq!(analysis.treatments[0].item, "diet changes");
        assert_eq!(analysis.medications[0].item, "allopurinol");
        assert_eq!(analysis.medications[0].count, 2);
        assert!(analysis.medications.iter().all(|e| e.item != "aspirin"));

        assert_eq!(shared_items(&analysis.tests), 1);
        assert_eq!(shared_items(&analysis.treatments), 1);
        assert_eq!(shared_items(&analysis.medications), 1);
    }

    #[test]
    fn catalog_item_row_for_medications() {
        let entry = FrequencyEntry {
            item: "potassium citrate".into(),
            count: 3,
            sources: vec!["Gout".into(), "Kidney stones".into(), "Gout".into()],
        };
        let row = CatalogItemRow::new(ItemCategory::Medication, &entry);
        assert_eq!(row.category, "Medication");
        assert_eq!(row.usage_count, 3);
        assert_eq!(row.disease_count, 2);
        assert_eq!(row.shared, "Yes");
        assert_eq!(row.match_name, "potassium");
        assert_eq!(row.search_terms, "potassium, citrate");
        assert_eq!(row.diseases, "Gout; Kidney stones");

        let test = CatalogItemRow::new(ItemCategory::Test, &entry);
        assert_eq!(test.match_name, "potassium citrate");
    }

    #[test]
    fn percentages_round_to_two_decimals() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(5, 0), 0.0);

        let entry = FrequencyEntry {
            item: "nausea".into(),
            count: 1,
            sources: vec!["A".into()],
        };
        assert_eq!(FrequencyRow::new(&entry, 8).percentage, "12.50");
    }
}
