//! Filter to remove movies the user already knows.
//!
//! Always the first filter in the pipeline: there's no point in
//! recommending a movie the user listed as liked.

use crate::traits::{Filter, RecommendationContext};
use crate::types::Candidate;
use anyhow::Result;

/// Removes candidates present in the known set.
pub struct KnownMoviesFilter;

impl Filter for KnownMoviesFilter {
    fn name(&self) -> &str {
        "KnownMoviesFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &RecommendationContext<'_>,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !context.known.contains(&candidate.movie_id))
            .collect();
        Ok(filtered)
    }
}
