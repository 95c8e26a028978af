use crate::dataset::Record;
use crate::parser::Category;

/// Everything one category crawl produced.
#[derive(Debug, Clone)]
pub struct CategoryRecords {
    pub category: Category,
    pub organizations: Vec<String>,
    pub pages: usize,
}

/// Flatten per-category results into rows: categories in discovery order,
/// organizations in crawl order. Nothing is deduplicated or sorted.
pub fn flatten(crawled: &[CategoryRecords]) -> Vec<Record> {
    crawled
        .iter()
        .flat_map(|c| {
            c.organizations
                .iter()
                .map(move |org| Record::new(&c.category.label, org))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawled(label: &str, orgs: &[&str]) -> CategoryRecords {
        CategoryRecords {
            category: Category::new(label, format!("/{}", label.to_lowercase())),
            organizations: orgs.iter().map(|s| s.to_string()).collect(),
            pages: 1,
        }
    }

    #[test]
    fn preserves_discovery_and_crawl_order() {
        let rows = flatten(&[
            crawled("Spain", &["Uni C"]),
            crawled("Italy", &["Uni B", "Uni A"]),
        ]);
        assert_eq!(
            rows,
            vec![
                Record::new("Spain", "Uni C"),
                Record::new("Italy", "Uni B"),
                Record::new("Italy", "Uni A"),
            ]
        );
    }

    #[test]
    fn duplicates_are_kept() {
        let rows = flatten(&[
            crawled("Italy", &["Uni A", "Uni A"]),
            crawled("Italy", &["Uni A"]),
        ]);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r == &Record::new("Italy", "Uni A")));
    }

    #[test]
    fn empty_categories_contribute_nothing() {
        let rows = flatten(&[crawled("Malta", &[]), crawled("Chile", &["Uni D"])]);
        assert_eq!(rows, vec![Record::new("Chile", "Uni D")]);
    }

    #[test]
    fn fields_are_trimmed() {
        let rows = flatten(&[crawled(" Italy\n", &["  Uni A "])]);
        assert_eq!(rows, vec![Record::new("Italy", "Uni A")]);
        assert_eq!(rows[0].category, "Italy");
    }
}
