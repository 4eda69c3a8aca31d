//! CSV and JSON catalog loading and CSV export.
//!
//! Scraper exports disagree on header spelling ("Drug_Name", "Drug Name",
//! "drug name"), so headers are canonicalized once per file: lowercased, cut
//! down to ASCII alphanumerics, then mapped through a per-catalog alias table.
//! Rows are then deserialized with `serde` against the canonical names.
//!
//! | Catalog | Required columns | Optional columns |
//! |---------|------------------|------------------|
//! | diseases | `Disease` | `Diagnosis`, `Treatment`, `Tests` |
//! | relationships | `Disease`, `Drug_Name` | `Drug_Family`, `Drug_URL` |
//! | drug details | `Drug` | `What Is`, `Side Effects`, `Original URL` |
//! | matched diseases | `Disease_Name_English` | Spanish name, text fields, `Medications_Drugs` |

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::error::{CatalogKind, MatchError, Result};
use crate::field::Field;
use crate::lookup::DrugDetail;
use crate::matcher::{DiseaseRecord, DiseaseSource, DrugRelationship};

/// Default file name of the matcher output.
pub const MATCHED_OUTPUT: &str = "final_diseases_complete.csv";

struct Column {
    name: &'static str,
    aliases: &'static [&'static str],
    required: bool,
}

const DISEASE_COLUMNS: &[Column] = &[
    Column { name: "disease", aliases: &["diseasename", "diseasenameenglish", "name"], required: true },
    Column { name: "diagnosis", aliases: &[], required: false },
    Column { name: "treatment", aliases: &["treatments"], required: false },
    Column { name: "tests", aliases: &["test"], required: false },
    Column { name: "medications", aliases: &["medication"], required: false },
];

const RELATIONSHIP_COLUMNS: &[Column] = &[
    Column { name: "disease", aliases: &["diseasename", "condition"], required: true },
    Column { name: "drugfamily", aliases: &["family"], required: false },
    Column { name: "drugname", aliases: &["drug"], required: true },
    Column { name: "drugurl", aliases: &["url"], required: false },
];

const DRUG_DETAIL_COLUMNS: &[Column] = &[
    Column { name: "drug", aliases: &["drugname", "name"], required: true },
    Column { name: "whatis", aliases: &["description"], required: false },
    Column { name: "sideeffects", aliases: &[], required: false },
    Column { name: "originalurl", aliases: &["url", "drugurl"], required: false },
];

const MATCHED_COLUMNS: &[Column] = &[
    Column { name: "diseasenameenglish", aliases: &["disease", "englishname"], required: true },
    Column { name: "diseasenamespanish", aliases: &["spanishname"], required: false },
    Column { name: "diagnosis", aliases: &[], required: false },
    Column { name: "treatments", aliases: &["treatment"], required: false },
    Column { name: "tests", aliases: &["test"], required: false },
    Column { name: "medicationsdrugs", aliases: &["medications", "drugs"], required: false },
];

/// Lowercase and keep only ASCII alphanumerics.
///
/// ```
/// use diseasematcher::catalog::canonical_header;
///
/// assert_eq!(canonical_header("Drug_URL"), "drugurl");
/// assert_eq!(canonical_header(" Side Effects "), "sideeffects");
/// ```
pub fn canonical_header(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Rewrite `headers` to canonical column names.
///
/// The first header resolving to a column claims it; later duplicates are
/// blanked so serde ignores them.
fn canonicalize_headers(
    headers: &StringRecord,
    kind: CatalogKind,
    columns: &[Column],
) -> Result<StringRecord> {
    let mut claimed = HashSet::new();
    let mut canonical = Vec::with_capacity(headers.len());

    for raw in headers {
        let key = canonical_header(raw);
        let column = columns
            .iter()
            .find(|column| column.name == key || column.aliases.contains(&key.as_str()));

        match column {
            Some(column) if claimed.insert(column.name) => canonical.push(column.name.to_string()),
            Some(_) => canonical.push(String::new()),
            None => canonical.push(key),
        }
    }

    if let Some(missing) = columns
        .iter()
        .find(|column| column.required && !claimed.contains(column.name))
    {
        return Err(MatchError::MissingColumn {
            kind,
            column: missing.name,
        });
    }

    Ok(StringRecord::from(canonical))
}

/// Deserialize every row of `source` after header canonicalization.
fn read_rows<R, T>(source: R, kind: CatalogKind, columns: &[Column]) -> Result<Vec<T>>
where
    R: io::Read,
    T: for<'de> Deserialize<'de>,
{
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let headers = canonicalize_headers(reader.headers()?, kind, columns)?;
    reader.set_headers(headers);

    let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct DiseaseRow {
    #[serde(default)]
    disease: String,
    #[serde(default)]
    diagnosis: Field,
    #[serde(default)]
    treatment: Field,
    #[serde(default)]
    tests: Field,
    #[serde(default)]
    medications: Field,
}

#[derive(Debug, Deserialize)]
struct RelationshipRow {
    #[serde(default)]
    disease: String,
    #[serde(default)]
    drugfamily: String,
    #[serde(default)]
    drugname: String,
    #[serde(default)]
    drugurl: String,
}

#[derive(Debug, Deserialize)]
struct DrugDetailRow {
    #[serde(default)]
    drug: String,
    #[serde(default)]
    whatis: Field,
    #[serde(default)]
    sideeffects: Field,
    #[serde(default)]
    originalurl: String,
}

#[derive(Debug, Deserialize)]
struct MatchedRow {
    #[serde(default)]
    diseasenameenglish: String,
    #[serde(default)]
    diseasenamespanish: String,
    #[serde(default)]
    diagnosis: String,
    #[serde(default)]
    treatments: String,
    #[serde(default)]
    tests: String,
    #[serde(default)]
    medicationsdrugs: String,
}

/// Read the disease catalog. Rows without a disease name are skipped.
pub fn read_diseases<R: io::Read>(source: R) -> Result<Vec<DiseaseSource>> {
    let rows: Vec<DiseaseRow> = read_rows(source, CatalogKind::Diseases, DISEASE_COLUMNS)?;
    let total = rows.len();

    let diseases: Vec<DiseaseSource> = rows
        .into_iter()
        .filter(|row| !row.disease.is_empty())
        .map(|row| DiseaseSource {
            name: row.disease,
            diagnosis: row.diagnosis,
            treatment: row.treatment,
            tests: row.tests,
            medications: row.medications,
        })
        .collect();

    if diseases.len() < total {
        warn!(skipped = total - diseases.len(), "disease rows without a name");
    }
    Ok(diseases)
}

/// Read the disease-to-drug relationship catalog.
pub fn read_relationships<R: io::Read>(source: R) -> Result<Vec<DrugRelationship>> {
    let rows: Vec<RelationshipRow> =
        read_rows(source, CatalogKind::Relationships, RELATIONSHIP_COLUMNS)?;

    Ok(rows
        .into_iter()
        .map(|row| DrugRelationship {
            disease: row.disease,
            drug_family: row.drugfamily,
            drug_name: row.drugname,
            drug_url: row.drugurl,
        })
        .collect())
}

/// Read the drug-detail catalog in CSV form. Rows without a drug name are skipped.
pub fn read_drug_details_csv<R: io::Read>(source: R) -> Result<Vec<DrugDetail>> {
    let rows: Vec<DrugDetailRow> =
        read_rows(source, CatalogKind::DrugDetails, DRUG_DETAIL_COLUMNS)?;

    Ok(rows
        .into_iter()
        .filter(|row| !row.drug.is_empty())
        .map(|row| DrugDetail {
            drug_name: row.drug,
            what_is: row.whatis,
            side_effects: row.sideeffects,
            url: row.originalurl,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct JsonDrugEntry {
    #[serde(default)]
    what_is: Field,
    #[serde(default)]
    side_effects: Field,
    #[serde(default, alias = "url")]
    original_url: Option<String>,
}

/// JSON object keyed by drug name, kept in document order.
struct OrderedDrugDetails(Vec<DrugDetail>);

impl<'de> Deserialize<'de> for OrderedDrugDetails {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedDrugDetails;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by drug name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, entry)) = map.next_entry::<String, JsonDrugEntry>()? {
                    let drug_name = name.trim().to_string();
                    if drug_name.is_empty() {
                        continue;
                    }
                    entries.push(DrugDetail {
                        drug_name,
                        what_is: entry.what_is,
                        side_effects: entry.side_effects,
                        url: entry.original_url.unwrap_or_default(),
                    });
                }
                Ok(OrderedDrugDetails(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Read the drug-detail catalog in JSON form.
pub fn read_drug_details_json<R: io::Read>(source: R) -> Result<Vec<DrugDetail>> {
    let OrderedDrugDetails(entries) = serde_json::from_reader(io::BufReader::new(source))?;
    Ok(entries)
}

/// Read a previously written match table.
pub fn read_matched<R: io::Read>(source: R) -> Result<Vec<DiseaseRecord>> {
    let rows: Vec<MatchedRow> =
        read_rows(source, CatalogKind::MatchedDiseases, MATCHED_COLUMNS)?;

    Ok(rows
        .into_iter()
        .filter(|row| !row.diseasenameenglish.is_empty())
        .map(|row| DiseaseRecord {
            medications: split_medications(&row.medicationsdrugs),
            english_name: row.diseasenameenglish,
            spanish_name: row.diseasenamespanish,
            diagnosis: row.diagnosis,
            treatments: row.treatments,
            tests: row.tests,
        })
        .collect())
}

fn split_medications(joined: &str) -> Vec<String> {
    joined
        .split(';')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn load_diseases(path: &Path) -> Result<Vec<DiseaseSource>> {
    let diseases = read_diseases(File::open(path)?)?;
    info!(path = %path.display(), rows = diseases.len(), "loaded disease catalog");
    Ok(diseases)
}

pub fn load_relationships(path: &Path) -> Result<Vec<DrugRelationship>> {
    let relationships = read_relationships(File::open(path)?)?;
    info!(path = %path.display(), rows = relationships.len(), "loaded relationship catalog");
    Ok(relationships)
}

/// Load drug details from `.json` or CSV, chosen by file extension.
pub fn load_drug_details(path: &Path) -> Result<Vec<DrugDetail>> {
    let file = File::open(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let details = if is_json {
        read_drug_details_json(file)?
    } else {
        read_drug_details_csv(file)?
    };
    info!(path = %path.display(), rows = details.len(), "loaded drug detail catalog");
    Ok(details)
}

pub fn load_matched(path: &Path) -> Result<Vec<DiseaseRecord>> {
    let records = read_matched(File::open(path)?)?;
    info!(path = %path.display(), rows = records.len(), "loaded matched disease table");
    Ok(records)
}

#[derive(Debug, Serialize)]
struct MatchedOutputRow<'a> {
    #[serde(rename = "Disease_Name_English")]
    english_name: &'a str,
    #[serde(rename = "Disease_Name_Spanish")]
    spanish_name: &'a str,
    #[serde(rename = "Diagnosis")]
    diagnosis: &'a str,
    #[serde(rename = "Treatments")]
    treatments: &'a str,
    #[serde(rename = "Tests")]
    tests: &'a str,
    #[serde(rename = "Medications_Drugs")]
    medications: String,
}

impl<'a> From<&'a DiseaseRecord> for MatchedOutputRow<'a> {
    fn from(record: &'a DiseaseRecord) -> Self {
        MatchedOutputRow {
            english_name: &record.english_name,
            spanish_name: &record.spanish_name,
            diagnosis: &record.diagnosis,
            treatments: &record.treatments,
            tests: &record.tests,
            medications: record.medications_display(),
        }
    }
}

/// Serialize `rows` as CSV with a header row taken from the row type.
pub fn write_rows<W, T>(sink: W, rows: impl IntoIterator<Item = T>) -> Result<usize>
where
    W: io::Write,
    T: Serialize,
{
    let mut writer = Writer::from_writer(sink);
    let mut written = 0;
    for row in rows {
        writer.serialize(row)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

pub fn write_csv<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<usize> {
    write_rows(File::create(path)?, rows)
}

pub fn write_disease_records_to<W: io::Write>(sink: W, records: &[DiseaseRecord]) -> Result<usize> {
    write_rows(sink, records.iter().map(MatchedOutputRow::from))
}

pub fn write_disease_records(path: &Path, records: &[DiseaseRecord]) -> Result<usize> {
    let written = write_disease_records_to(File::create(path)?, records)?;
    info!(path = %path.display(), rows = written, "wrote matched disease table");
    Ok(written)
}
