use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://coara.eu/agreement/signatories/";
pub const DEFAULT_DATASET_PATH: &str = "coara_signatories.csv";
pub const DEFAULT_FRESHNESS_PATH: &str = "last_update.txt";
pub const DEFAULT_MAX_PAGES: usize = 500;

const ENV_PREFIX: &str = "COARA";

/// Where to crawl from and where the results live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub dataset_path: PathBuf,
    pub freshness_path: PathBuf,
    /// Safety bound on "next page" links followed within one category.
    pub max_pages_per_category: usize,
    /// One valid country name per line; unset means every country counts.
    pub reference_countries_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            freshness_path: PathBuf::from(DEFAULT_FRESHNESS_PATH),
            max_pages_per_category: DEFAULT_MAX_PAGES,
            reference_countries_path: None,
        }
    }
}

impl Settings {
    /// Load from `COARA_*` environment variables over the defaults.
    pub fn load() -> Result<Self> {
        Self::load_with_prefix(ENV_PREFIX)
    }

    fn load_with_prefix(prefix: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()
            .and_then(Config::try_deserialize::<Settings>)
            .with_context(|| format!("Invalid {prefix}_* settings"))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Re-run after applying command-line overrides.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.max_pages_per_category >= 1,
            "max_pages_per_category must be at least 1"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_file_names() {
        let s = Settings::default();
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.dataset_path, PathBuf::from("coara_signatories.csv"));
        assert_eq!(s.freshness_path, PathBuf::from("last_update.txt"));
        assert_eq!(s.max_pages_per_category, 500);
        assert!(s.reference_countries_path.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        std::env::set_var("COARATEST_DATASET_PATH", "/tmp/out.csv");
        std::env::set_var("COARATEST_MAX_PAGES_PER_CATEGORY", "7");
        let s = Settings::load_with_prefix("COARATEST").unwrap();
        assert_eq!(s.dataset_path, PathBuf::from("/tmp/out.csv"));
        assert_eq!(s.max_pages_per_category, 7);
        assert_eq!(s.freshness_path, PathBuf::from(DEFAULT_FRESHNESS_PATH));
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let s = Settings::load_with_prefix("COARA_UNUSED_PREFIX").unwrap();
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn zero_page_limit_rejected() {
        std::env::set_var("COARAZERO_MAX_PAGES_PER_CATEGORY", "0");
        let err = Settings::load_with_prefix("COARAZERO").unwrap_err();
        assert!(format!("{err:#}").contains("at least 1"));

        let s = Settings {
            max_pages_per_category: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
        assert!(Settings::default().validate().is_ok());
    }
}
