//! Catalog validation and lookup helpers.
//!
//! The graph crate assumes unique, non-empty identifiers. This module is
//! where that precondition is checked, before the records reach the core.

use crate::error::{DataLoadError, Result};
use crate::types::{MovieCatalog, MovieId};
use std::collections::HashMap;

impl MovieCatalog {
    /// Validate data integrity
    ///
    /// Check that:
    /// - Every id and title is non-empty
    /// - No id appears twice
    /// - Ratings, when present, are finite
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(self.records.len());

        for (position, record) in self.records.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(DataLoadError::InvalidValue {
                    id: record.id.clone(),
                    field: "id".to_string(),
                    value: format!("empty id at position {}", position),
                });
            }
            if record.title.trim().is_empty() {
                return Err(DataLoadError::InvalidValue {
                    id: record.id.clone(),
                    field: "title".to_string(),
                    value: "empty title".to_string(),
                });
            }
            if let Some(rating) = record.rating {
                if !rating.is_finite() {
                    return Err(DataLoadError::InvalidValue {
                        id: record.id.clone(),
                        field: "rating".to_string(),
                        value: rating.to_string(),
                    });
                }
            }
            if let Some(&first) = seen.get(record.id.as_str()) {
                return Err(DataLoadError::DuplicateId {
                    id: record.id.clone(),
                    first,
                    second: position,
                });
            }
            seen.insert(&record.id, position);
        }
        Ok(())
    }

    /// Search records by title (case-insensitive).
    ///
    /// Exact matches on `title` or `original_title` come first, then
    /// substring matches; each group keeps catalog order.
    pub fn search_title(&self, query: &str) -> Vec<MovieId> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut exact = Vec::new();
        let mut partial = Vec::new();
        for record in &self.records {
            let titles = std::iter::once(record.title.as_str())
                .chain(record.original_title.as_deref())
                .map(str::to_lowercase)
                .collect::<Vec<_>>();

            if titles.iter().any(|t| *t == query) {
                exact.push(record.id.clone());
            } else if titles.iter().any(|t| t.contains(&query)) {
                partial.push(record.id.clone());
            }
        }
        exact.extend(partial);
        exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MovieRecord;

    fn create_test_catalog() -> MovieCatalog {
        let mut catalog = MovieCatalog::new();
        catalog.insert(MovieRecord::new("tt1", "Heat").with_year(1995));
        catalog.insert(MovieRecord::new("tt2", "The Heat").with_year(2013));
        catalog.insert(MovieRecord::new("tt3", "Collateral").with_year(2004));
        catalog
    }

    #[test]
    fn test_validate_ok() {
        assert!(create_test_catalog().validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_id() {
        let catalog = MovieCatalog::from_records(vec![
            MovieRecord::new("tt1", "Heat"),
            MovieRecord::new("tt2", "Ronin"),
            MovieRecord::new("tt1", "Heat (again)"),
        ]);

        match catalog.validate() {
            Err(DataLoadError::DuplicateId { id, first, second }) => {
                assert_eq!(id, "tt1");
                assert_eq!(first, 0);
                assert_eq!(second, 2);
            }
            other => panic!("expected duplicate id error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_empty_title() {
        let catalog = MovieCatalog::from_records(vec![MovieRecord::new("tt1", "  ")]);
        assert!(matches!(
            catalog.validate(),
            Err(DataLoadError::InvalidValue { ref field, .. }) if field == "title"
        ));
    }

    #[test]
    fn test_search_title_exact_first() {
        let catalog = create_test_catalog();
        let found = catalog.search_title("heat");
        assert_eq!(found, vec!["tt1".to_string(), "tt2".to_string()]);

        assert!(catalog.search_title("nothing like it").is_empty());
        assert!(catalog.search_title("   ").is_empty());
    }
}
