use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::{has_classes, stripped_text};

static REGION_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("#signatories > div > div.flex.items-center.flex-wrap.justify-center.mb-12")
        .expect("valid category region selector")
});
static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));
static SPAN_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span").expect("valid span selector"));

const LABEL_CLASS: &str = "py-[14px]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub label: String,
    /// As written in the page; may be relative to the landing URL.
    pub index_url: String,
}

impl Category {
    pub fn new(label: impl Into<String>, index_url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            index_url: index_url.into(),
        }
    }
}

/// Categories listed on the signatories landing page, in page order.
///
/// Each anchor in the category region yields one (label, href) pair, then
/// the first pair is dropped: the site always leads with an "All" filter
/// that is not a real category. Pairing per anchor keeps labels aligned
/// with hrefs whether or not that "All" anchor carries a label span.
/// Anchors without an href are skipped; an anchor without a label span
/// falls back to its own text. Duplicated labels are kept as-is.
pub fn extract_categories(document: &Html) -> Vec<Category> {
    let mut pairs: Vec<Category> = Vec::new();

    for region in document.select(&REGION_SEL) {
        for link in region.select(&ANCHOR_SEL) {
            let Some(href) = link.value().attr("href").filter(|h| !h.is_empty()) else {
                warn!(text = %stripped_text(&link), "Skipping category anchor without href");
                continue;
            };
            let label = link
                .select(&SPAN_SEL)
                .find(|s| has_classes(s, &[LABEL_CLASS]))
                .map(|span| stripped_text(&span))
                .unwrap_or_else(|| stripped_text(&link));
            pairs.push(Category::new(label, href));
        }
    }

    if pairs.is_empty() {
        return pairs;
    }
    let all = pairs.remove(0);
    debug!(label = %all.label, href = %all.index_url, "Dropped leading aggregate category");
    pairs
}
