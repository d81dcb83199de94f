use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::state::FilterField;

/// Which filters each dashboard page honors.
///
/// Paths missing from the table honor every filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PageFields", into = "PageFields")]
pub struct RelevanceTable {
    pages: PageFields,
}

type PageFields = BTreeMap<String, BTreeSet<FilterField>>;

impl From<PageFields> for RelevanceTable {
    fn from(pages: PageFields) -> Self {
        pages
            .into_iter()
            .fold(Self::empty(), |table, (path, fields)| table.with_page(&path, fields))
    }
}

impl From<RelevanceTable> for PageFields {
    fn from(table: RelevanceTable) -> Self {
        table.pages
    }
}

impl Default for RelevanceTable {
    fn default() -> Self {
        use FilterField::*;

        Self::empty()
            // Transaction Trends
            .with_page("/", [DateRange, Location])
            .with_page("/product-mix", [DateRange, Category, Brand, Location])
            .with_page(
                "/consumer-insights",
                [DateRange, Category, Brand, Location, WeekdayWeekend],
            )
    }
}

fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

impl RelevanceTable {
    pub fn empty() -> Self {
        Self {
            pages: BTreeMap::new(),
        }
    }

    pub fn with_page(
        mut self,
        path: &str,
        fields: impl IntoIterator<Item = FilterField>,
    ) -> Self {
        self.pages
            .insert(normalize_path(path).to_string(), fields.into_iter().collect());
        self
    }

    pub fn is_relevant(&self, field: FilterField, path: &str) -> bool {
        self.pages
            .get(normalize_path(path))
            .map_or(true, |fields| fields.contains(&field))
    }

    pub fn relevant_fields(&self, path: &str) -> Vec<FilterField> {
        FilterField::FIELDS
            .into_iter()
            .filter(|f| self.is_relevant(*f, path))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_pages_restrict_fields() {
        let table = RelevanceTable::default();
        assert!(table.is_relevant(FilterField::Location, "/"));
        assert!(!table.is_relevant(FilterField::Brand, "/"));
        assert!(table.is_relevant(FilterField::Brand, "/product-mix"));
        assert!(!table.is_relevant(FilterField::WeekdayWeekend, "/product-mix/"));
        assert!(table.is_relevant(FilterField::WeekdayWeekend, "/consumer-insights?x=1"));
    }

    #[test]
    fn test_deserialized_paths_are_normalized() {
        let table: RelevanceTable =
            serde_json::from_str(r#"{"/product-mix/":["brand"]}"#).unwrap();
        assert!(table.is_relevant(FilterField::Brand, "/product-mix"));
        assert!(!table.is_relevant(FilterField::Category, "/product-mix"));
    }

    #[test]
    fn test_unknown_page_fails_open() {
        let table = RelevanceTable::default();
        assert_eq!(table.relevant_fields("/settings"), FilterField::FIELDS.to_vec());
        assert!(RelevanceTable::empty().is_relevant(FilterField::IncomeRanges, "/"));
    }
}
