//! Match summaries and per-disease reports for the target disease list.
//!
//! A report pairs a matched disease row with drug details for each of its
//! medications. Long text sections are packed into sentence chunks so they
//! stay readable in spreadsheet cells.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{CatalogKind, MatchError, Result};
use crate::lookup::{DrugLookupIndex, NO_MEDICATIONS};
use crate::matcher::DiseaseRecord;

pub const NO_DIAGNOSIS: &str = "No diagnosis information available";
pub const NO_TREATMENT: &str = "No treatment information available";
pub const NO_TESTS: &str = "No test information available";

/// Longest name a spreadsheet tab accepts.
pub const SHEET_NAME_LIMIT: usize = 31;

/// First record for `target`: exact name ignoring case, else first containing it.
pub fn select_target<'a>(records: &'a [DiseaseRecord], target: &str) -> Option<&'a DiseaseRecord> {
    let target = target.to_lowercase();
    records
        .iter()
        .find(|record| record.english_name.to_lowercase() == target)
        .or_else(|| {
            records
                .iter()
                .find(|record| record.english_name.to_lowercase().contains(&target))
        })
}

/// Pack sentences into chunks of at most `max_len` characters.
///
/// Sentences are split on runs of `.`, `!` and `?` and each is re-terminated
/// with a period. A single sentence longer than `max_len` becomes its own
/// chunk. Text already within the limit is returned as is.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in text.split(&['.', '!', '?'][..]) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        let sentence_len = sentence.chars().count() + 1;

        if current_len + sentence_len <= max_len {
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(sentence);
            current.push('.');
            current_len += sentence_len;
        } else {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current = format!("{}.", sentence);
            current_len = sentence_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    if chunks.is_empty() {
        chunks.push(text.to_string());
    }
    chunks
}

/// Tab-safe name: parentheses removed, `/` replaced by `-`, 31 characters max.
///
/// ```
/// use diseasematcher::report::sheet_name;
///
/// assert_eq!(sheet_name("Depression (major depressive disorder)"), "Depression major depressive dis");
/// assert_eq!(sheet_name("HIV/AIDS"), "HIV-AIDS");
/// ```
pub fn sheet_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .map(|c| if c == '/' { '-' } else { c })
        .take(SHEET_NAME_LIMIT)
        .collect()
}

/// `stem`, or `stem (2)`, `stem (3)`, ... until it is not in `taken`.
///
/// Stems compare ignoring case and stay within [`SHEET_NAME_LIMIT`].
fn unique_stem(stem: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(stem.to_lowercase()) {
        return stem.to_string();
    }
    (2..)
        .map(|n| {
            let suffix = format!(" ({})", n);
            let keep = SHEET_NAME_LIMIT.saturating_sub(suffix.chars().count());
            let base: String = stem.chars().take(keep).collect();
            format!("{}{}", base.trim_end(), suffix)
        })
        .find(|candidate| taken.insert(candidate.to_lowercase()))
        .unwrap_or_default()
}

/// One line of the "top diseases" ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopDisease {
    /// Disease name as scraped
    pub english_name: String,
    /// Translated name
    pub spanish_name: String,
    /// Number of distinct medications matched to the disease
    pub medication_count: usize,
}

/// Totals printed after a matching run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSummary {
    /// Matched disease rows
    pub total: usize,
    /// Rows with at least one medication
    pub with_medications: usize,
    /// Rows with an empty medication list
    pub without_medications: usize,
    /// Most medications first; ties keep source order.
    pub top: Vec<TopDisease>,
}

impl MatchSummary {
    pub fn from_records(records: &[DiseaseRecord], top_n: usize) -> Self {
        let with_medications = records.iter().filter(|r| !r.medications.is_empty()).count();

        let mut ranked: Vec<&DiseaseRecord> =
            records.iter().filter(|r| !r.medications.is_empty()).collect();
        ranked.sort_by(|a, b| b.medications.len().cmp(&a.medications.len()));

        MatchSummary {
            total: records.len(),
            with_medications,
            without_medications: records.len() - with_medications,
            top: ranked
                .into_iter()
                .take(top_n)
                .map(|record| TopDisease {
                    english_name: record.english_name.clone(),
                    spanish_name: record.spanish_name.clone(),
                    medication_count: record.medications.len(),
                })
                .collect(),
        }
    }

    fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Matching Summary ===")?;
        writeln!(f, "Total diseases processed: {}", self.total)?;
        writeln!(
            f,
            "Diseases with medications: {} ({:.1}%)",
            self.with_medications,
            self.percent(self.with_medications)
        )?;
        writeln!(
            f,
            "Diseases without medications: {} ({:.1}%)",
            self.without_medications,
            self.percent(self.without_medications)
        )?;
        if !self.top.is_empty() {
            writeln!(f, "\nTop {} diseases by medication count:", self.top.len())?;
            for (rank, disease) in self.top.iter().enumerate() {
                writeln!(
                    f,
                    "  {}. {} ({}): {} medications",
                    rank + 1,
                    disease.english_name,
                    disease.spanish_name,
                    disease.medication_count
                )?;
            }
        }
        Ok(())
    }
}

/// A titled block of text split into display chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSection {
    /// Section label written to the `Section` column
    pub title: &'static str,
    pub chunks: Vec<String>,
}

impl TextSection {
    fn new(title: &'static str, text: &str, placeholder: &str, chunk_size: usize) -> Self {
        let text = if text.trim().is_empty() { placeholder } else { text };
        TextSection {
            title,
            chunks: chunk_text(text, chunk_size),
        }
    }
}

/// One medication line of a disease report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicationRow {
    #[serde(rename = "Medication Name")]
    pub medication: String,
    #[serde(rename = "What Is")]
    pub what_is: String,
    #[serde(rename = "Side Effects")]
    pub side_effects: String,
    #[serde(rename = "Disease Tag")]
    pub disease_tag: String,
    /// Whether the drug catalog had an entry for this medication
    #[serde(skip)]
    pub found: bool,
}

/// Flat CSV line of a disease report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine<'a> {
    #[serde(rename = "Section")]
    pub section: &'a str,
    #[serde(rename = "Content")]
    pub content: &'a str,
    #[serde(rename = "What Is")]
    pub what_is: &'a str,
    #[serde(rename = "Side Effects")]
    pub side_effects: &'a str,
    #[serde(rename = "Disease Tag")]
    pub disease_tag: &'a str,
}

/// Everything written for one target disease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseReport {
    /// Matched disease name
    pub english_name: String,
    /// Translated name
    pub spanish_name: String,
    /// Diagnosis, treatment and tests, in that order
    pub sections: Vec<TextSection>,
    /// One row per medication, or a single placeholder row
    pub medications: Vec<MedicationRow>,
    /// Output file name without extension
    file_stem: String,
}

impl DiseaseReport {
    pub fn build(record: &DiseaseRecord, index: &DrugLookupIndex, chunk_size: usize) -> Self {
        let sections = vec![
            TextSection::new("DIAGNOSIS", &record.diagnosis, NO_DIAGNOSIS, chunk_size),
            TextSection::new("TREATMENT", &record.treatments, NO_TREATMENT, chunk_size),
            TextSection::new("TESTS", &record.tests, NO_TESTS, chunk_size),
        ];

        let names: Vec<&str> = if record.medications.is_empty() {
            vec![NO_MEDICATIONS]
        } else {
            record.medications.iter().map(String::as_str).collect()
        };

        let medications = names
            .into_iter()
            .map(|name| {
                let result = index.lookup(name);
                MedicationRow {
                    medication: name.to_string(),
                    what_is: result.what_is().to_string(),
                    side_effects: result.side_effects().to_string(),
                    disease_tag: record.english_name.clone(),
                    found: result.is_found(),
                }
            })
            .collect();

        DiseaseReport {
            english_name: record.english_name.clone(),
            spanish_name: record.spanish_name.clone(),
            sections,
            medications,
            file_stem: sheet_name(&record.english_name),
        }
    }

    /// Medications that had an entry in the drug catalog.
    pub fn found_count(&self) -> usize {
        self.medications.iter().filter(|row| row.found).count()
    }

    /// Tab-safe name of the report, unique within a [`TargetReport`].
    pub fn file_stem(&self) -> &str {
        &self.file_stem
    }

    /// Names, then text chunks, then one line per medication.
    pub fn lines(&self) -> Vec<ReportLine<'_>> {
        let mut lines = vec![
            ReportLine::text("English Name", &self.english_name),
            ReportLine::text("Spanish Name", &self.spanish_name),
        ];
        for section in &self.sections {
            lines.extend(section.chunks.iter().map(|chunk| ReportLine::text(section.title, chunk)));
        }
        lines.extend(self.medications.iter().map(|row| ReportLine {
            section: "MEDICATIONS",
            content: &row.medication,
            what_is: &row.what_is,
            side_effects: &row.side_effects,
            disease_tag: &row.disease_tag,
        }));
        lines
    }
}

impl<'a> ReportLine<'a> {
    fn text(section: &'a str, content: &'a str) -> Self {
        ReportLine {
            section,
            content,
            what_is: "",
            side_effects: "",
            disease_tag: "",
        }
    }
}

/// Whether a target disease resolved to a matched row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetStatus {
    #[serde(rename = "Disease Name")]
    pub target: String,
    #[serde(rename = "Status", serialize_with = "status_label")]
    pub found: bool,
    #[serde(rename = "Matched Name")]
    pub matched_name: String,
    #[serde(rename = "Spanish Name")]
    pub spanish_name: String,
}

fn status_label<S: serde::Serializer>(found: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(if *found { "Found" } else { "Not Found" })
}

/// Reports and status rows for a list of target diseases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    /// One report per distinct matched disease, in target order
    pub reports: Vec<DiseaseReport>,
    /// One row per target, found or not
    pub statuses: Vec<TargetStatus>,
}

impl TargetReport {
    /// Reports for each distinct disease the targets resolve to, in target order.
    ///
    /// # Arguments
    ///
    /// * `records` - Matched disease table
    /// * `targets` - Disease names to report on
    /// * `index` - Drug details for the medication lines
    /// * `chunk_size` - Maximum characters per text chunk
    ///
    /// # Returns
    ///
    /// The reports plus one status row per target. A target resolving to a
    /// disease already reported still counts as found. Reports whose names
    /// collapse to the same file stem get a numbered suffix.
    pub fn build(
        records: &[DiseaseRecord],
        targets: &[String],
        index: &DrugLookupIndex,
        chunk_size: usize,
    ) -> Result<Self> {
        if records.is_empty() {
            return Err(MatchError::EmptyCatalog(CatalogKind::MatchedDiseases));
        }

        let mut reported = HashSet::new();
        let mut stems = HashSet::new();
        let mut reports = Vec::new();
        let mut statuses = Vec::with_capacity(targets.len());

        for target in targets {
            let Some(record) = select_target(records, target) else {
                warn!(target = %target, "no matched disease for target");
                statuses.push(TargetStatus {
                    target: target.clone(),
                    found: false,
                    matched_name: String::new(),
                    spanish_name: String::new(),
                });
                continue;
            };

            statuses.push(TargetStatus {
                target: target.clone(),
                found: true,
                matched_name: record.english_name.clone(),
                spanish_name: record.spanish_name.clone(),
            });

            if !reported.insert(record.english_name.as_str()) {
                continue;
            }
            let mut report = DiseaseReport::build(record, index, chunk_size);
            let stem = unique_stem(&report.file_stem, &mut stems);
            if stem != report.file_stem {
                warn!(disease = %report.english_name, stem = %stem, "report file name already taken");
                report.file_stem = stem;
            }
            info!(
                disease = %report.english_name,
                medications = report.medications.len(),
                found = report.found_count(),
                "built disease report"
            );
            reports.push(report);
        }

        Ok(TargetReport { reports, statuses })
    }

    pub fn found_targets(&self) -> usize {
        self.statuses.iter().filter(|status| status.found).count()
    }

    /// Whole-percent share of targets that resolved.
    pub fn success_rate(&self) -> u32 {
        if self.statuses.is_empty() {
            return 0;
        }
        (self.found_targets() as f64 / self.statuses.len() as f64 * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::lookup::{DrugDetail, WHAT_IS_NOT_IN_DATABASE, WHAT_IS_UNAVAILABLE};

    fn record(name: &str, medications: &[&str]) -> DiseaseRecord {
        DiseaseRecord {
            english_name: name.to_string(),
            spanish_name: format!("{} (es)", name),
            medications: medications.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    fn index() -> DrugLookupIndex {
        DrugLookupIndex::new(vec![DrugDetail {
            drug_name: "Lisinopril".into(),
            what_is: Field::from_raw("Lisinopril is an ACE inhibitor."),
            side_effects: Field::from_raw("Cough."),
            url: String::new(),
        }])
        .unwrap()
    }

    #[test]
    fn exact_target_beats_earlier_partial() {
        let records = vec![record("Heart disease in women", &[]), record("Heart Disease", &[])];
        let picked = select_target(&records, "heart disease").unwrap();
        assert_eq!(picked.english_name, "Heart Disease");
    }

    #[test]
    fn partial_target_takes_first_in_source_order() {
        let records = vec![record("Rheumatoid arthritis", &[]), record("Psoriatic arthritis", &[])];
        assert_eq!(
            select_target(&records, "Arthritis").unwrap().english_name,
            "Rheumatoid arthritis"
        );
        assert!(select_target(&records, "COPD").is_none());
    }

    #[test]
    fn chunks_pack_whole_sentences() {
        let text = "One two three. Four five six! Seven eight nine?";
        assert_eq!(chunk_text(text, 100), vec![text.to_string()]);
        assert_eq!(
            chunk_text(text, 30),
            vec!["One two three. Four five six.", "Seven eight nine."]
        );
    }

    #[test]
    fn oversized_sentence_is_its_own_chunk() {
        let long = "x".repeat(40);
        let text = format!("Short. {}. Tail.", long);
        assert_eq!(
            chunk_text(&text, 20),
            vec!["Short.".to_string(), format!("{}.", long), "Tail.".to_string()]
        );
    }

    #[test]
    fn punctuation_only_text_is_kept() {
        let text = "...!!!".repeat(10);
        assert_eq!(chunk_text(&text, 10), vec![text.clone()]);
    }

    #[test]
    fn sheet_names_are_truncated_by_characters() {
        assert_eq!(sheet_name("COPD"), "COPD");
        assert_eq!(sheet_name(&"é".repeat(40)).chars().count(), 31);
    }

    #[test]
    fn summary_ranks_by_medication_count_with_stable_ties() {
        let records = vec![
            record("A", &["x"]),
            record("B", &["x", "y"]),
            record("C", &[]),
            record("D", &["x", "y"]),
        ];
        let summary = MatchSummary::from_records(&records, 2);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.with_medications, 3);
        assert_eq!(summary.without_medications, 1);
        let top: Vec<_> = summary.top.iter().map(|t| t.english_name.as_str()).collect();
        assert_eq!(top, ["B", "D"]);

        let printed = summary.to_string();
        assert!(printed.contains("Diseases with medications: 3 (75.0%)"));
        assert!(printed.contains("1. B (B (es)): 2 medications"));
    }

    #[test]
    fn report_uses_placeholders_and_lookup() {
        let mut hypertension = record("Hypertension", &["Lisinopril", "Unobtainium"]);
        hypertension.diagnosis = "Blood pressure readings.".into();
        let report = DiseaseReport::build(&hypertension, &index(), 500);

        assert_eq!(report.sections[0].chunks, ["Blood pressure readings."]);
        assert_eq!(report.sections[1].chunks, [NO_TREATMENT]);
        assert_eq!(report.sections[2].chunks, [NO_TESTS]);

        assert_eq!(report.medications[0].what_is, "Lisinopril is an ACE inhibitor.");
        assert_eq!(report.medications[1].what_is, WHAT_IS_NOT_IN_DATABASE);
        assert_eq!(report.medications[1].disease_tag, "Hypertension");
        assert_eq!(report.found_count(), 1);

        let lines = report.lines();
        assert_eq!(lines.len(), 2 + 3 + 2);
        assert_eq!(lines[6].section, "MEDICATIONS");
        assert_eq!(lines[6].content, "Unobtainium");
    }

    #[test]
    fn report_without_medications_has_placeholder_row() {
        let report = DiseaseReport::build(&record("Gout", &[]), &index(), 500);
        assert_eq!(report.medications.len(), 1);
        assert_eq!(report.medications[0].medication, NO_MEDICATIONS);
        assert_eq!(report.medications[0].what_is, WHAT_IS_UNAVAILABLE);
    }

    #[test]
    fn targets_resolving_to_one_disease_are_reported_once() {
        let records = vec![record("Chronic kidney disease", &["Lisinopril"]), record("Stroke", &[])];
        let targets: Vec<String> = ["Chronic kidney disease", "Kidney disease", "Stroke", "COPD"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let built = TargetReport::build(&records, &targets, &index(), 500).unwrap();
        assert_eq!(built.reports.len(), 2);
        assert_eq!(built.found_targets(), 3);
        assert_eq!(built.success_rate(), 75);
        assert!(!built.statuses[3].found);
        assert_eq!(built.statuses[1].matched_name, "Chronic kidney disease");
    }

    #[test]
    fn colliding_file_stems_get_numbered() {
        let long_a = format!("{} alpha", "x".repeat(31));
        let long_b = format!("{} beta", "x".repeat(31));
        let records = vec![
            record("HIV/AIDS", &[]),
            record("HIV-AIDS", &[]),
            record(&long_a, &[]),
            record(&long_b, &[]),
        ];
        let targets: Vec<String> = records.iter().map(|r| r.english_name.clone()).collect();

        let built = TargetReport::build(&records, &targets, &index(), 500).unwrap();
        let stems: Vec<_> = built.reports.iter().map(DiseaseReport::file_stem).collect();
        assert_eq!(stems.len(), 4);
        assert_eq!(stems[0], "HIV-AIDS");
        assert_eq!(stems[1], "HIV-AIDS (2)");
        assert_eq!(stems[2], "x".repeat(31));
        assert_eq!(stems[3], format!("{} (2)", "x".repeat(27)));
        assert!(stems.iter().all(|stem| stem.chars().count() <= SHEET_NAME_LIMIT));
    }

    #[test]
    fn empty_match_table_is_an_error() {
        assert!(matches!(
            TargetReport::build(&[], &[], &index(), 500),
            Err(MatchError::EmptyCatalog(CatalogKind::MatchedDiseases))
        ));
    }
}
