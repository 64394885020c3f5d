//! Resolution of user-supplied movie references to graph nodes.
//!
//! Users name movies the way they remember them ("Heat", "heat (1995)",
//! "tt0113277"). Each query is matched by exact id first, then by normalized
//! title or original title.

use data_loader::MovieId;
use graph::SimilarityGraph;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Lowercase, fold whitespace, drop a trailing "(YYYY)"
pub fn normalize_title(title: &str) -> String {
    let folded = title.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();

    let stripped = folded
        .strip_suffix(')')
        .and_then(|rest| rest.rsplit_once('('))
        .filter(|(_, year)| year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()))
        .map(|(head, _)| head.trim_end());

    match stripped {
        Some(head) if !head.is_empty() => head.to_string(),
        _ => folded,
    }
}

/// Known movies of one request, with the queries that matched nothing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownSet {
    pub ids: BTreeSet<MovieId>,
    pub unresolved: Vec<String>,
}

impl KnownSet {
    /// Map each query to a node of `graph`.
    ///
    /// When several nodes share a normalized title the first in node order
    /// wins.
    pub fn resolve<S: AsRef<str>>(graph: &SimilarityGraph, queries: &[S]) -> Self {
        let mut by_title: HashMap<String, &str> = HashMap::new();
        for movie in graph.nodes() {
            let titles = std::iter::once(&movie.title).chain(movie.original_title.as_ref());
            for title in titles {
                by_title.entry(normalize_title(title)).or_insert(movie.id.as_str());
            }
        }

        let mut known = KnownSet::default();
        for query in queries {
            let query = query.as_ref().trim();
            if query.is_empty() {
                continue;
            }

            let hit = if graph.contains(query) {
                Some(query)
            } else {
                by_title.get(&normalize_title(query)).copied()
            };

            match hit {
                Some(id) => {
                    debug!("Resolved {:?} to {}", query, id);
                    known.ids.insert(id.to_string());
                }
                None => known.unresolved.push(query.to_string()),
            }
        }
        known
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
