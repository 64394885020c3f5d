//! Filter to drop candidates left without a positive score.

use crate::traits::{Filter, RecommendationContext};
use crate::types::Candidate;
use anyhow::Result;

/// Removes candidates whose score is not strictly positive.
///
/// Always the last filter: earlier filters may have scaled a score down
/// to 0.
pub struct MinimumScoreFilter;

impl Filter for MinimumScoreFilter {
    fn name(&self) -> &str {
        "MinimumScoreFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        _context: &RecommendationContext<'_>,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| candidate.score > 0.0)
            .collect();
        Ok(filtered)
    }
}
