//! Country-level views over the stored dataset.
//!
//! The raw file keeps every row; these helpers only decide what counts as a
//! country and how rows are grouped.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::dataset::Record;

/// Source spellings that differ from the reference country names.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("Timor-Leste", "East Timor"),
    ("The Netherlands", "Netherlands"),
];

pub const EU_WIDENING_COUNTRIES: &[&str] = &[
    "Bulgaria",
    "Croatia",
    "Cyprus",
    "Czechia",
    "Estonia",
    "Greece",
    "Hungary",
    "Latvia",
    "Lithuania",
    "Malta",
    "Poland",
    "Portugal",
    "Romania",
    "Slovakia",
    "Slovenia",
    "Albania",
    "Bosnia and Herzegovina",
    "Georgia",
    "Kosovo",
    "Montenegro",
    "North Macedonia",
    "Serbia",
    "Moldova",
    "Ukraine",
];

/// Categories on the site that are organization types, not countries,
/// with the short label used when reporting them.
pub const ORGANIZATION_TYPES: &[(&str, &str)] = &[
    (
        "Academies, learned societies, and their associations, and associations of researchers",
        "Academies & Societies",
    ),
    (
        "National/regional authorities or agencies that implement some form of research assessment and their associations",
        "Assessment Authorities",
    ),
    (
        "Other relevant non-for-profit organisations involved with research assessment, and their associations",
        "Other NPOs",
    ),
    (
        "Research centres, research infrastructures, and their associations",
        "Research Centres",
    ),
    ("Universities and their associations", "Universities"),
    (
        "Public or private research funding organisations and their associations",
        "Funding Orgs",
    ),
];

pub fn normalize_country(name: &str) -> &str {
    COUNTRY_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
        .unwrap_or(name)
}

/// Set of names accepted as countries.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCountries {
    names: Option<HashSet<String>>,
}

impl ReferenceCountries {
    /// Accept every country.
    pub fn any() -> Self {
        Self { names: None }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    /// One name per line; blank lines are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read reference countries {}", path.display()))?;
        Ok(Self::from_names(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        ))
    }

    pub fn contains(&self, country: &str) -> bool {
        match &self.names {
            Some(names) => names.contains(country),
            None => true,
        }
    }
}

/// Alias-remapped rows whose country is in `reference`.
pub fn filter_countries(records: &[Record], reference: &ReferenceCountries) -> Vec<Record> {
    records
        .iter()
        .map(|r| Record {
            category: normalize_country(&r.category).to_string(),
            organization: r.organization.clone(),
        })
        .filter(|r| reference.contains(&r.category))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

/// Rows per country, largest first, ties by name.
pub fn country_counts(records: &[Record]) -> Vec<CountryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.category.as_str()).or_default() += 1;
    }
    let mut out: Vec<CountryCount> = counts
        .into_iter()
        .map(|(country, count)| CountryCount {
            country: country.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.country.cmp(&b.country)));
    out
}

pub fn signatories_of<'a>(records: &'a [Record], country: &str) -> Vec<&'a str> {
    records
        .iter()
        .filter(|r| r.category == country)
        .map(|r| r.organization.as_str())
        .collect()
}

/// Rows filed under an organization-type category, keyed by short label.
pub fn organization_type_counts(records: &[Record]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        if let Some((_, short)) = ORGANIZATION_TYPES.iter().find(|(long, _)| *long == r.category) {
            *counts.entry(*short).or_default() += 1;
        }
    }
    counts
}

/// Counts for EU widening countries, matched on the raw category name.
pub fn widening_counts(records: &[Record]) -> Vec<CountryCount> {
    let widening: Vec<Record> = records
        .iter()
        .filter(|r| EU_WIDENING_COUNTRIES.contains(&r.category.as_str()))
        .cloned()
        .collect();
    country_counts(&widening)
}
