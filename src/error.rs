use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("cannot resolve link {href:?} against {base}: {source}")]
    InvalidUrl {
        href: String,
        base: String,
        #[source]
        source: url::ParseError,
    },

    #[error("category {category:?} exceeded the limit of {limit} pages")]
    PageLimitExceeded { category: String, limit: usize },

    #[error("no categories found on the signatories index page")]
    NoCategories,

    #[error("{categories} categories crawled but no signatories found")]
    NoRecords { categories: usize },
}

/// A crawl that stopped before producing a dataset.
///
/// Everything gathered up to the failure is discarded; the counters only
/// describe how far the crawl got.
#[derive(Error, Debug)]
#[error("crawl failed{}: {error}", .category.as_deref().map(|c| format!(" in {c:?}")).unwrap_or_default())]
pub struct CrawlFailure {
    #[source]
    pub error: CrawlError,
    /// Label of the category being crawled, `None` if the index page failed.
    pub category: Option<String>,
    pub records_discarded: usize,
    pub pages_fetched: usize,
}

impl CrawlFailure {
    pub fn at_index(error: CrawlError) -> Self {
        Self {
            error,
            category: None,
            records_discarded: 0,
            pages_fetched: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_names_category() {
        let failure = CrawlFailure {
            error: CrawlError::PageLimitExceeded {
                category: "Italy".into(),
                limit: 3,
            },
            category: Some("Italy".into()),
            records_discarded: 12,
            pages_fetched: 3,
        };
        assert_eq!(
            failure.to_string(),
            "crawl failed in \"Italy\": category \"Italy\" exceeded the limit of 3 pages"
        );
    }

    #[test]
    fn index_failure_has_no_category() {
        let failure = CrawlFailure::at_index(CrawlError::NoCategories);
        assert_eq!(
            failure.to_string(),
            "crawl failed: no categories found on the signatories index page"
        );
        assert_eq!(failure.records_discarded, 0);
    }
}
