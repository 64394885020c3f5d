//! # Data Loader Crate
//!
//! This crate is the boundary between the data-acquisition layer and the
//! similarity graph: it owns the movie record type, reads and writes the
//! catalog cache, validates it, and drives bounded enrichment.
//!
//! ## Main Components
//!
//! - **types**: `MovieRecord`, `MovieCatalog`
//! - **parser**: Read/write catalog JSON documents
//! - **index**: Catalog validation and title search
//! - **enrichment**: Bounded expansion through a `MovieProvider`
//! - **provider**: `CatalogProvider`, a `MovieProvider` over a cached catalog
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::load_catalog;
//! use std::path::Path;
//!
//! let catalog = load_catalog(Path::new("output/films_data.json"))?;
//! catalog.validate()?;
//!
//! let heat = catalog.get("tt0113277").unwrap();
//! println!("{} ({:?}) by {:?}", heat.title, heat.year, heat.director);
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod enrichment;
pub mod provider;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{MovieCatalog, MovieId, MovieRecord};
pub use parser::{load_catalog, parse_catalog, write_catalog};
pub use enrichment::{Enricher, EnrichmentConfig, EnrichmentReport, MovieProvider};
pub use provider::CatalogProvider;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_creation() {
        let catalog = MovieCatalog::new();
        assert_eq!(catalog.len(), 0);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_insert_movie() {
        let mut catalog = MovieCatalog::new();

        let movie = MovieRecord::new("tt0114709", "Toy Story")
            .with_year(1995)
            .with_genres(["Animation", "Comedy"])
            .with_director("John Lasseter")
            .with_cast(["Tom Hanks", "Tim Allen"]);

        assert!(catalog.insert(movie.clone()));
        // Second insert with the same id is refused
        assert!(!catalog.insert(movie));

        let retrieved = catalog.get("tt0114709").unwrap();
        assert_eq!(retrieved.year, Some(1995));
        assert_eq!(retrieved.genres.len(), 2);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_top_cast() {
        let movie = MovieRecord::new("a", "A").with_cast(["1", "2", "3"]);
        assert_eq!(movie.top_cast(2), &["1".to_string(), "2".to_string()]);
        assert_eq!(movie.top_cast(10).len(), 3);
        assert!(MovieRecord::new("b", "B").top_cast(5).is_empty());
    }

    #[test]
    fn test_empty_queries() {
        let catalog = MovieCatalog::new();
        assert!(catalog.get("missing").is_none());
        assert!(!catalog.contains("missing"));
        assert!(catalog.search_title("anything").is_empty());
    }
}
