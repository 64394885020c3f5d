//! Parser for movie catalog documents.
//!
//! The data-acquisition layer writes its cache as JSON, in one of two shapes:
//! - a bare array of records: `[{"id": ..., "title": ...}, ...]`
//! - a wrapped document: `{"films": [...]}`
//!
//! Both are accepted. Field names follow `MovieRecord`; the scraper cache
//! names (`titre`, `annee`, `acteurs`, `realisateur`, `note`,
//! `titre_original`, `imdb_id`) are read too.

use crate::error::{DataLoadError, Result};
use crate::types::{MovieCatalog, MovieRecord};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Accepted top-level layouts of a catalog document
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Bare(Vec<MovieRecord>),
    Wrapped { films: Vec<MovieRecord> },
}

/// Parse a catalog from any reader.
///
/// `source` names the input in error messages (usually the file path).
pub fn parse_catalog<R: Read>(reader: R, source: &str) -> Result<MovieCatalog> {
    let document: CatalogDocument =
        serde_json::from_reader(reader).map_err(|e| DataLoadError::ParseError {
            file: source.to_string(),
            reason: e.to_string(),
        })?;

    let records = match document {
        CatalogDocument::Bare(records) => records,
        CatalogDocument::Wrapped { films } => films,
    };
    debug!("Parsed {} records from {}", records.len(), source);

    Ok(MovieCatalog::from_records(records))
}

/// Read a catalog file from disk
pub fn load_catalog(path: &Path) -> Result<MovieCatalog> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    parse_catalog(BufReader::new(file), &path.display().to_string())
}

/// Write a catalog as a wrapped `{"films": [...]}` document
pub fn write_catalog(catalog: &MovieCatalog, path: &Path) -> Result<()> {
    #[derive(serde::Serialize)]
    struct Wrapped<'a> {
        films: &'a [MovieRecord],
    }

    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &Wrapped { films: catalog.records() }).map_err(|e| {
        DataLoadError::ParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok(())
}
