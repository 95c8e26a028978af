use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use tracing::{debug, error, info};
use url::Url;

use crate::aggregate::{self, CategoryRecords};
use crate::dataset::{self, Record};
use crate::error::{CrawlError, CrawlFailure};
use crate::parser::{self, Category};
use crate::settings::Settings;

/// Anything that can turn a URL into an HTML body.
pub trait PageSource {
    fn fetch(&self, url: &Url) -> Result<String, CrawlError>;
}

/// Plain blocking HTTP GET, no custom headers, client-default timeouts.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        let http_err = |source| CrawlError::Http {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url.clone()).send().map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(http_err)
    }
}

pub fn fetch_document(source: &dyn PageSource, url: &Url) -> Result<Html, CrawlError> {
    let body = source.fetch(url)?;
    debug!(%url, bytes = body.len(), "Fetched page");
    Ok(Html::parse_document(&body))
}

/// Resolve `href` against the page it appeared on. Absolute hrefs pass through.
pub fn resolve(base: &Url, href: &str) -> Result<Url, CrawlError> {
    base.join(href.trim()).map_err(|source| CrawlError::InvalidUrl {
        href: href.to_string(),
        base: base.to_string(),
        source,
    })
}

/// Fetch the landing page and list its categories.
pub fn discover_categories(
    source: &dyn PageSource,
    landing: &Url,
) -> Result<Vec<Category>, CrawlError> {
    let document = fetch_document(source, landing)?;
    let categories = parser::extract_categories(&document);
    if categories.is_empty() {
        return Err(CrawlError::NoCategories);
    }
    info!("Found {} categories on {}", categories.len(), landing);
    Ok(categories)
}

enum PageState {
    Fetching(Url),
    Done,
}

/// Walk one category's listing pages, following "next" links until a page
/// has none. More than `max_pages` pages is a failure, not a truncation.
pub fn crawl_category(
    source: &dyn PageSource,
    landing: &Url,
    category: &Category,
    max_pages: usize,
) -> Result<CategoryRecords, CrawlFailure> {
    let mut organizations: Vec<String> = Vec::new();
    let mut pages = 0usize;

    let fail = |error: CrawlError, organizations: &Vec<String>, pages: usize| CrawlFailure {
        error,
        category: Some(category.label.clone()),
        records_discarded: organizations.len(),
        pages_fetched: pages,
    };

    let mut state = match resolve(landing, &category.index_url) {
        Ok(url) => PageState::Fetching(url),
        Err(e) => return Err(fail(e, &organizations, pages)),
    };

    while let PageState::Fetching(url) = state {
        if pages >= max_pages {
            let error = CrawlError::PageLimitExceeded {
                category: category.label.clone(),
                limit: max_pages,
            };
            return Err(fail(error, &organizations, pages));
        }

        let document = match fetch_document(source, &url) {
            Ok(doc) => doc,
            Err(e) => return Err(fail(e, &organizations, pages)),
        };
        pages += 1;

        let found = parser::extract_organizations(&document);
        debug!(category = %category.label, page = pages, found = found.len(), "Extracted page");
        organizations.extend(found);

        state = match parser::next_page_href(&document) {
            Some(href) => match resolve(&url, &href) {
                Ok(next) => PageState::Fetching(next),
                Err(e) => return Err(fail(e, &organizations, pages)),
            },
            None => PageState::Done,
        };
    }

    Ok(CategoryRecords {
        category: category.clone(),
        organizations,
        pages,
    })
}

/// A finished crawl, ready to persist.
#[derive(Debug)]
pub struct Crawl {
    pub categories: usize,
    pub pages: usize,
    pub records: Vec<Record>,
}

/// Crawl every category reachable from `base_url`, one request at a time.
/// Any failure discards everything gathered so far.
pub fn crawl_signatories(
    source: &dyn PageSource,
    base_url: &str,
    max_pages: usize,
) -> Result<Crawl, CrawlFailure> {
    let landing = Url::parse(base_url).map_err(|source| {
        CrawlFailure::at_index(CrawlError::InvalidUrl {
            href: base_url.to_string(),
            base: String::new(),
            source,
        })
    })?;
    let categories = discover_categories(source, &landing).map_err(CrawlFailure::at_index)?;

    let pb = ProgressBar::new(categories.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut crawled: Vec<CategoryRecords> = Vec::with_capacity(categories.len());
    for category in &categories {
        pb.set_message(category.label.clone());
        match crawl_category(source, &landing, category, max_pages) {
            Ok(c) => {
                info!(
                    "{}: {} signatories over {} page(s)",
                    c.category.label,
                    c.organizations.len(),
                    c.pages
                );
                crawled.push(c);
            }
            Err(mut failure) => {
                pb.abandon();
                failure.records_discarded += crawled.iter().map(|c| c.organizations.len()).sum::<usize>();
                failure.pages_fetched += 1 + crawled.iter().map(|c| c.pages).sum::<usize>();
                return Err(failure);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let pages = 1 + crawled.iter().map(|c| c.pages).sum::<usize>();
    let records = aggregate::flatten(&crawled);
    if records.is_empty() {
        return Err(CrawlFailure {
            error: CrawlError::NoRecords {
                categories: crawled.len(),
            },
            category: None,
            records_discarded: 0,
            pages_fetched: pages,
        });
    }
    info!(
        "Crawled {} categories, {} pages, {} signatories",
        crawled.len(),
        pages,
        records.len()
    );

    Ok(Crawl {
        categories: crawled.len(),
        pages,
        records,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Failed(String),
}

impl SaveStatus {
    fn from_result(what: &str, result: anyhow::Result<()>) -> Self {
        match result {
            Ok(()) => Self::Saved,
            Err(e) => {
                error!("Failed to save {}: {:#}", what, e);
                Self::Failed(format!("{e:#}"))
            }
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

/// Outcome of a crawl that succeeded. Persisting the two files can still
/// fail independently; see [`RefreshReport::is_consistent`].
#[derive(Debug)]
pub struct RefreshReport {
    pub categories: usize,
    pub pages: usize,
    pub rows: usize,
    pub stamped: NaiveDate,
    pub freshness: SaveStatus,
    pub dataset: SaveStatus,
}

impl RefreshReport {
    /// Both files describe this crawl. Anything else means the stored date
    /// cannot be trusted to describe the stored dataset.
    pub fn is_consistent(&self) -> bool {
        self.freshness.is_saved() && self.dataset.is_saved()
    }
}

/// Crawl, then stamp the freshness file, then overwrite the dataset.
/// A failed crawl writes nothing.
pub fn refresh(
    source: &dyn PageSource,
    settings: &Settings,
    today: NaiveDate,
) -> Result<RefreshReport, CrawlFailure> {
    let crawl = crawl_signatories(source, &settings.base_url, settings.max_pages_per_category)?;

    let freshness = SaveStatus::from_result(
        "freshness date",
        dataset::store_date(&settings.freshness_path, today),
    );
    let saved = SaveStatus::from_result(
        "dataset",
        dataset::write_dataset(&settings.dataset_path, &crawl.records),
    );
    if saved.is_saved() {
        info!(
            "Saved {} rows to {}",
            crawl.records.len(),
            settings.dataset_path.display()
        );
    }

    Ok(RefreshReport {
        categories: crawl.categories,
        pages: crawl.pages,
        rows: crawl.records.len(),
        stamped: today,
        freshness,
        dataset: saved,
    })
}
