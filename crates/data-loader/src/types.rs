//! Core domain types for the movie catalog.
//!
//! This module defines the records every other crate reads:
//! - `MovieId` type alias for the stable record key
//! - `MovieRecord` with explicitly optional metadata
//! - `MovieCatalog`, the ordered in-memory collection handed to the graph

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Stable key of a movie (canonical title or external id such as "tt0133093")
pub type MovieId = String;

// =============================================================================
// Movie Record
// =============================================================================

/// A movie as produced by the data-acquisition layer.
///
/// Only `id` and `title` are mandatory. Every other field has an "absent"
/// state (`None` or an empty list) and scoring treats absence as a zero
/// contribution, never as an error.
///
/// Deserialization goes through `RawMovieRecord`, which also reads the
/// scraper cache field names and fills in a missing `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMovieRecord")]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    /// Title as the user originally typed it, when the provider resolved it
    /// to a different canonical title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    pub year: Option<u16>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    /// Principal cast in billing order
    pub cast: Vec<String>,
    /// External rating (informational, not used for scoring)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// Poster reference (relative path or URL)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

/// On-disk shape of a record.
///
/// Accepts both the English field names written by `write_catalog` and the
/// scraper cache names (`titre`, `annee`, `acteurs`, ...). Scraper records
/// carry no `id`; it falls back to `imdb_id`, then to the title.
#[derive(Deserialize)]
struct RawMovieRecord {
    #[serde(default)]
    id: Option<MovieId>,
    #[serde(default)]
    imdb_id: Option<String>,
    #[serde(alias = "titre")]
    title: String,
    #[serde(default, alias = "titre_original")]
    original_title: Option<String>,
    #[serde(default, alias = "annee")]
    year: Option<u16>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default, alias = "realisateur")]
    director: Option<String>,
    #[serde(default, alias = "acteurs")]
    cast: Vec<String>,
    #[serde(default, alias = "note")]
    rating: Option<f32>,
    #[serde(default)]
    poster: Option<String>,
}

impl From<RawMovieRecord> for MovieRecord {
    fn from(raw: RawMovieRecord) -> Self {
        let id = raw
            .id
            .or_else(|| {
                raw.imdb_id
                    .map(|imdb| imdb.trim().to_string())
                    .filter(|imdb| !imdb.is_empty())
            })
            .unwrap_or_else(|| raw.title.clone());

        Self {
            id,
            title: raw.title,
            original_title: raw.original_title,
            year: raw.year,
            genres: raw.genres,
            director: raw.director,
            cast: raw.cast,
            rating: raw.rating,
            poster: raw.poster,
        }
    }
}

impl MovieRecord {
    /// Create a record with only the mandatory fields set
    pub fn new(id: impl Into<MovieId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            original_title: None,
            year: None,
            genres: Vec::new(),
            director: None,
            cast: Vec::new(),
            rating: None,
            poster: None,
        }
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_director(mut self, director: impl Into<String>) -> Self {
        self.director = Some(director.into());
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cast<I, S>(mut self, cast: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cast = cast.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    /// The first `n` billed cast members (fewer if the list is shorter)
    pub fn top_cast(&self, n: usize) -> &[String] {
        &self.cast[..self.cast.len().min(n)]
    }
}

// =============================================================================
// MovieCatalog - ordered collection of records
// =============================================================================

/// Ordered collection of movie records with an id index.
///
/// Insertion order is kept because graph node order, layout seeding and the
/// exported document all follow it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieCatalog {
    pub(crate) records: Vec<MovieRecord>,
    pub(crate) index: HashMap<MovieId, usize>,
}

impl MovieCatalog {
    /// Creates a new, empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from records, keeping their order.
    ///
    /// A repeated id keeps the first position in the index; `validate`
    /// reports such duplicates.
    pub fn from_records(records: Vec<MovieRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            index.entry(record.id.clone()).or_insert(position);
        }
        Self { records, index }
    }

    /// Get a record by id
    pub fn get(&self, id: &str) -> Option<&MovieRecord> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    /// Insertion position of a record
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Append a record. Returns false (and leaves the catalog untouched)
    /// when the id is already present.
    pub fn insert(&mut self, record: MovieRecord) -> bool {
        if self.index.contains_key(&record.id) {
            return false;
        }
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<MovieRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
