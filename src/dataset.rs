use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shown in place of a date when no crawl has been stamped yet.
pub const NO_UPDATE_SENTINEL: &str = "No update available yet.";

/// One signatory row. The category column is named `Country` on disk even
/// though a few categories are organization types rather than countries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Country")]
    pub category: String,
    #[serde(rename = "Organization")]
    pub organization: String,
}

impl Record {
    pub fn new(category: &str, organization: &str) -> Self {
        Self {
            category: category.trim().to_string(),
            organization: organization.trim().to_string(),
        }
    }
}

/// Overwrite `path` with a `Country,Organization` CSV of `rows`.
pub fn write_dataset(path: &Path, rows: &[Record]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create dataset file {}", path.display()))?;
    if rows.is_empty() {
        // serde only emits the header alongside the first record
        wtr.write_record(["Country", "Organization"])?;
    }
    for row in rows {
        wtr.serialize(Record::new(&row.category, &row.organization))?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to flush dataset file {}", path.display()))?;
    Ok(())
}

pub fn read_dataset(path: &Path) -> Result<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open dataset file {}", path.display()))?;
    let mut rows = Vec::new();
    for row in rdr.deserialize::<Record>() {
        rows.push(row.with_context(|| format!("Malformed row in {}", path.display()))?);
    }
    Ok(rows)
}

/// Overwrite the freshness file with `date` as `YYYY-MM-DD`.
pub fn store_date(path: &Path, date: NaiveDate) -> Result<()> {
    fs::write(path, format!("{}\n", date.format("%Y-%m-%d")))
        .with_context(|| format!("Failed to write freshness file {}", path.display()))
}

/// Stored freshness date, or [`NO_UPDATE_SENTINEL`] when the file is
/// missing, unreadable or blank.
pub fn read_stored_date(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => NO_UPDATE_SENTINEL.to_string(),
    }
}
