//! Penalty for hub movies.
//!
//! A movie connected to most of the catalog collects weight from any known
//! set. Candidates whose degree is above the mean have their score scaled
//! down in proportion to the excess.

use crate::traits::{Filter, RecommendationContext};
use crate::types::Candidate;
use anyhow::{Result, bail};

/// Scales `score` by `1 - factor * (degree - mean) / mean` for candidates
/// above the mean degree, floored at 0.
pub struct PopularityPenalty {
    factor: f64,
}

impl PopularityPenalty {
    /// `factor` must be within [0, 1]; 0 leaves every score untouched
    pub fn new(factor: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&factor) {
            bail!("popularity penalty factor must be within [0, 1], got {}", factor);
        }
        Ok(Self { factor })
    }
}

impl Filter for PopularityPenalty {
    fn name(&self) -> &str {
        "PopularityPenalty"
    }

    fn apply(
        &self,
        mut candidates: Vec<Candidate>,
        context: &RecommendationContext<'_>,
    ) -> Result<Vec<Candidate>> {
        let mean = context.mean_degree();
        if self.factor == 0.0 || mean <= 0.0 {
            return Ok(candidates);
        }

        for candidate in &mut candidates {
            let degree = context.degree(&candidate.movie_id) as f64;
            if degree > mean {
                let scale = 1.0 - self.factor * (degree - mean) / mean;
                candidate.score = (candidate.score * scale).max(0.0);
            }
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{MovieCatalog, MovieRecord};
    use graph::{Edge, SimilarityGraph};
    use std::collections::BTreeSet;

    /// Star around "hub": degrees hub=3, others=1, mean=1.5
    fn create_star_graph() -> SimilarityGraph {
        let nodes = MovieCatalog::from_records(
            ["hub", "a", "b", "c"].iter().map(|id| MovieRecord::new(*id, *id)).collect(),
        );
        SimilarityGraph::from_parts(
            nodes,
            vec![Edge::new("hub", "a", 0.5), Edge::new("hub", "b", 0.5), Edge::new("hub", "c", 0.5)],
        )
    }

    #[test]
    fn test_penalizes_above_mean_only() {
        let graph = create_star_graph();
        let known = BTreeSet::new();
        let context = RecommendationContext::new(&graph, &known);

        let penalty = PopularityPenalty::new(0.5).unwrap();
        let scored = penalty
            .apply(vec![Candidate::new("hub", 1.0), Candidate::new("a", 1.0)], &context)
            .unwrap();

        // 1 - 0.5 * (3 - 1.5) / 1.5 = 0.5
        assert!((scored[0].score - 0.5).abs() < 1e-12);
        assert_eq!(scored[1].score, 1.0);
    }

    #[test]
    fn test_score_floored_at_zero() {
        let graph = create_star_graph();
        let known = BTreeSet::new();
        let context = RecommendationContext::new(&graph, &known);

        // 1 - 1.0 * 1.5 / 1.5 = 0
        let scored = PopularityPenalty::new(1.0)
            .unwrap()
            .apply(vec![Candidate::new("hub", 2.0)], &context)
            .unwrap();
        assert_eq!(scored[0].score, 0.0);
    }

    #[test]
    fn test_zero_factor_is_noop() {
        let graph = create_star_graph();
        let known = BTreeSet::new();
        let context = RecommendationContext::new(&graph, &known);

        let scored = PopularityPenalty::new(0.0)
            .unwrap()
            .apply(vec![Candidate::new("hub", 0.8)], &context)
            .unwrap();
        assert_eq!(scored[0].score, 0.8);
    }

    #[test]
    fn test_invalid_factor() {
        assert!(PopularityPenalty::new(-0.1).is_err());
        assert!(PopularityPenalty::new(1.5).is_err());
        assert!(PopularityPenalty::new(f64::NAN).is_err());
    }
}
