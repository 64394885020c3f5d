//! `MovieProvider` over a local catalog.
//!
//! Lets enrichment run against a previously scraped cache instead of the
//! network: lookups scan the cache in its own order, so the same cache always
//! yields the same additions.

use crate::enrichment::MovieProvider;
use crate::types::{MovieCatalog, MovieId, MovieRecord};

fn same_name(a: &str, b: &str) -> bool {
    a.split_whitespace()
        .map(str::to_lowercase)
        .eq(b.split_whitespace().map(str::to_lowercase))
}

/// Serves related movies out of an in-memory catalog
pub struct CatalogProvider {
    cache: MovieCatalog,
}

impl CatalogProvider {
    pub fn new(cache: MovieCatalog) -> Self {
        Self { cache }
    }

    fn matching<F>(&self, limit: usize, predicate: F) -> Vec<MovieId>
    where
        F: Fn(&MovieRecord) -> bool,
    {
        self.cache
            .records()
            .iter()
            .filter(|r| predicate(r))
            .take(limit)
            .map(|r| r.id.clone())
            .collect()
    }
}

impl MovieProvider for CatalogProvider {
    fn by_director(&self, director: &str, limit: usize) -> anyhow::Result<Vec<MovieId>> {
        Ok(self.matching(limit, |r| {
            r.director.as_deref().is_some_and(|d| same_name(d, director))
        }))
    }

    fn by_actor(&self, actor: &str, limit: usize) -> anyhow::Result<Vec<MovieId>> {
        Ok(self.matching(limit, |r| r.cast.iter().any(|c| same_name(c, actor))))
    }

    fn fetch(&self, id: &str) -> anyhow::Result<Option<MovieRecord>> {
        Ok(self.cache.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::{Enricher, EnrichmentConfig};

    fn create_test_cache() -> MovieCatalog {
        MovieCatalog::from_records(vec![
            MovieRecord::new("heat", "Heat")
                .with_director("Michael Mann")
                .with_cast(["Al Pacino", "Robert De Niro"]),
            MovieRecord::new("collateral", "Collateral")
                .with_director("Michael Mann")
                .with_cast(["Tom Cruise"]),
            MovieRecord::new("serpico", "Serpico")
                .with_director("Sidney Lumet")
                .with_cast(["Al Pacino"]),
            MovieRecord::new("up", "Up").with_director("Pete Docter"),
        ])
    }

    #[test]
    fn test_lookups_ignore_case_and_spacing() {
        let provider = CatalogProvider::new(create_test_cache());
        assert_eq!(
            provider.by_director("michael  mann", 10).unwrap(),
            vec!["heat".to_string(), "collateral".to_string()]
        );
        assert_eq!(provider.by_actor("AL PACINO", 1).unwrap(), vec!["heat".to_string()]);
        assert!(provider.fetch("up").unwrap().is_some());
        assert!(provider.fetch("missing").unwrap().is_none());
    }

    #[test]
    fn test_enrich_from_cache() {
        let provider = CatalogProvider::new(create_test_cache());
        let mut catalog = MovieCatalog::from_records(vec![MovieRecord::new("heat", "Heat")
            .with_director("Michael Mann")
            .with_cast(["Al Pacino"])]);

        let report = Enricher::new(&provider, EnrichmentConfig::default())
            .unwrap()
            .enrich(&mut catalog);

        assert_eq!(
            report.added_per_round,
            vec![vec!["collateral".to_string(), "serpico".to_string()]]
        );
        assert!(!catalog.contains("up"));
    }
}
