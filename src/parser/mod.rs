pub mod index;
pub mod listing;

use scraper::ElementRef;

pub use index::{extract_categories, Category};
pub use listing::{extract_organizations, next_page_href};

/// True when `el` carries every class in `classes`.
///
/// The site uses Tailwind class names (`md:grid-cols-2`, `py-[14px]`) that
/// would need escaping inside a CSS selector, so class checks go through here.
pub(crate) fn has_classes(el: &ElementRef, classes: &[&str]) -> bool {
    classes.iter().all(|wanted| el.value().classes().any(|c| c == *wanted))
}

/// Text content with each text node trimmed, then joined.
pub(crate) fn stripped_text(el: &ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<String>()
}
