use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{has_classes, stripped_text};

static DIV_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div").expect("valid div selector"));
static H3_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("valid h3 selector"));
static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));

// "gird-cols-1" is how the site spells it.
const GRID_CLASSES: &[&str] = &[
    "grid",
    "gird-cols-1",
    "md:grid-cols-2",
    "lg:grid-cols-4",
    "gap-8",
    "mb-20",
];
const NAME_CLASSES: &[&str] = &["mt-4", "mb-20", "text-left", "txt-lg"];
const NEXT_CLASSES: &[&str] = &["-mt-px", "w-0", "flex-1", "flex", "justify-end"];

/// Organization names on one listing page, in document order.
pub fn extract_organizations(document: &Html) -> Vec<String> {
    document
        .select(&DIV_SEL)
        .filter(|div| has_classes(div, GRID_CLASSES))
        .flat_map(|grid| grid.select(&H3_SEL))
        .filter(|h3| has_classes(h3, NAME_CLASSES))
        .map(|h3| stripped_text(&h3))
        .collect()
}

/// Raw href of the "next page" link, if the page has one.
pub fn next_page_href(document: &Html) -> Option<String> {
    let container = document
        .select(&DIV_SEL)
        .find(|div| has_classes(div, NEXT_CLASSES))?;
    let link = container.select(&ANCHOR_SEL).next()?;
    link.value()
        .attr("href")
        .filter(|h| !h.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = r#"class="grid gird-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-8 mb-20""#;
    const NAME: &str = r#"class="mt-4 mb-20 text-left txt-lg""#;
    const NEXT: &str = r#"class="-mt-px w-0 flex-1 flex justify-end""#;

    fn listing(names: &[&str], next: Option<&str>) -> Html {
        let cards: String = names
            .iter()
            .map(|n| format!(r#"<div><img src="logo.png"><h3 {NAME}>  {n}  </h3></div>"#))
            .collect();
        let pager = match next {
            Some(href) => format!(
                r#"<nav><div class="-mt-px flex w-0 flex-1"><a href="?p=0">Previous</a></div>
                   <div {NEXT}><a href="{href}">Next</a></div></nav>"#
            ),
            None => String::new(),
        };
        Html::parse_document(&format!(
            "<html><body><div {GRID}>{cards}</div>{pager}</body></html>"
        ))
    }

    #[test]
    fn names_in_document_order() {
        let doc = listing(&["Uni A", "Uni B", "Institute C"], None);
        assert_eq!(extract_organizations(&doc), vec!["Uni A", "Uni B", "Institute C"]);
    }

    #[test]
    fn headings_outside_grid_ignored() {
        let html = format!(
            r#"<h3 {NAME}>Sidebar</h3><div class="grid gap-8"><h3 {NAME}>Other grid</h3></div>
               <div {GRID}><h3 {NAME}>Real</h3><h3 class="mt-4">Wrong class</h3></div>"#
        );
        let doc = Html::parse_document(&html);
        assert_eq!(extract_organizations(&doc), vec!["Real"]);
    }

    #[test]
    fn several_grids_concatenate() {
        let html = format!(
            r#"<div {GRID}><h3 {NAME}>One</h3></div><div {GRID}><h3 {NAME}>Two</h3></div>"#
        );
        let doc = Html::parse_document(&html);
        assert_eq!(extract_organizations(&doc), vec!["One", "Two"]);
    }

    #[test]
    fn empty_page_has_no_names() {
        assert!(extract_organizations(&listing(&[], None)).is_empty());
    }

    #[test]
    fn next_link_found() {
        let doc = listing(&["Uni A"], Some("?page=2"));
        assert_eq!(next_page_href(&doc).as_deref(), Some("?page=2"));
    }

    #[test]
    fn no_pager_means_last_page() {
        assert_eq!(next_page_href(&listing(&["Uni A"], None)), None);
    }

    #[test]
    fn pager_without_anchor_means_last_page() {
        let html = format!(r#"<div {NEXT}><span>Next</span></div>"#);
        assert_eq!(next_page_href(&Html::parse_document(&html)), None);
    }

    #[test]
    fn anchor_without_href_means_last_page() {
        let html = format!(r#"<div {NEXT}><a>Next</a></div>"#);
        assert_eq!(next_page_href(&Html::parse_document(&html)), None);
    }
}
