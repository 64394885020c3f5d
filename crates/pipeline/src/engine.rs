//! # Recommendation Engine
//!
//! Ranks unseen movies by how strongly they are connected to the known set
//! in the filtered graph:
//! 1. Aggregate: every edge between a known and an unknown movie adds its
//!    weight to the unknown movie's score
//! 2. Post-process through the `FilterPipeline`. Known movies never become
//!    candidates since step 1 only credits the unknown endpoint;
//!    `KnownMoviesFilter` stays first as a guard for filters that add
//!    candidates, not as the exclusion mechanism
//! 3. Rank by score descending, id ascending
//! 4. Truncate to `top_k`

use crate::filter_pipeline::FilterPipeline;
use crate::filters::{KnownMoviesFilter, MinimumScoreFilter, PopularityPenalty, TitleDedupFilter};
use crate::traits::RecommendationContext;
use crate::types::{rank_order, Candidate, Recommendation};
use anyhow::{Context, Result};
use data_loader::MovieId;
use graph::SimilarityGraph;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, instrument, warn};

/// Optional post-processing steps
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineOptions {
    /// Hub penalty factor in [0, 1], 0 disables it
    pub popularity_penalty: f64,
    /// Collapse candidates sharing a normalized title
    pub dedup_titles: bool,
}

/// Connectivity-based recommender over a filtered graph
pub struct RecommendationEngine {
    filter_pipeline: FilterPipeline,
}

impl RecommendationEngine {
    /// Build the engine and its filter pipeline
    pub fn new(options: EngineOptions) -> Result<Self> {
        let mut filter_pipeline = FilterPipeline::new().add_filter(KnownMoviesFilter);
        if options.popularity_penalty != 0.0 {
            filter_pipeline = filter_pipeline.add_filter(
                PopularityPenalty::new(options.popularity_penalty).context("Invalid engine options")?,
            );
        }
        if options.dedup_titles {
            filter_pipeline = filter_pipeline.add_filter(TitleDedupFilter);
        }
        filter_pipeline = filter_pipeline.add_filter(MinimumScoreFilter);

        debug!("Recommendation filters: {:?}", filter_pipeline.filter_names());
        Ok(Self { filter_pipeline })
    }

    /// Rank movies not in `known` by their summed edge weight to `known`.
    ///
    /// Ids in `known` that are not graph nodes are ignored with a warning.
    /// An empty (or entirely unknown) known set yields no recommendations.
    #[instrument(skip(self, graph, known), fields(known = known.len()))]
    pub fn recommend(
        &self,
        graph: &SimilarityGraph,
        known: &BTreeSet<MovieId>,
        top_k: Option<usize>,
    ) -> Result<Vec<Recommendation>> {
        let missing: Vec<&str> = known
            .iter()
            .filter(|id| !graph.contains(id))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            warn!("Ignoring {} known ids absent from the graph: {:?}", missing.len(), missing);
        }
        if missing.len() == known.len() {
            return Ok(Vec::new());
        }

        let candidates = aggregate(graph, known);
        let aggregated = candidates.len();

        let context = RecommendationContext::new(graph, known);
        let mut candidates = self
            .filter_pipeline
            .apply(candidates, &context)
            .context("Failed to apply recommendation filters")?;

        candidates.sort_by(rank_order);
        if let Some(k) = top_k {
            candidates.truncate(k);
        }

        let recommendations: Vec<Recommendation> = candidates
            .into_iter()
            .filter_map(|mut candidate| {
                let movie = graph.node(&candidate.movie_id)?;
                candidate
                    .connections
                    .sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.known_id.cmp(&b.known_id)));
                Some(Recommendation {
                    movie_id: candidate.movie_id,
                    title: movie.title.clone(),
                    year: movie.year,
                    score: candidate.score,
                    connections: candidate.connections,
                })
            })
            .collect();

        info!(
            "Recommended {} movies ({} connected candidates)",
            recommendations.len(),
            aggregated
        );
        Ok(recommendations)
    }
}

/// One candidate per unknown node adjacent to the known set, in first-seen
/// edge order
fn aggregate(graph: &SimilarityGraph, known: &BTreeSet<MovieId>) -> Vec<Candidate> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut candidates: Vec<Candidate> = Vec::new();

    for edge in graph.edges() {
        let (known_id, other) = match (known.contains(&edge.source), known.contains(&edge.target)) {
            (true, false) => (&edge.source, &edge.target),
            (false, true) => (&edge.target, &edge.source),
            _ => continue,
        };

        let index = *position.entry(other.as_str()).or_insert_with(|| {
            candidates.push(Candidate::new(other.clone(), 0.0));
            candidates.len() - 1
        });
        candidates[index].connect(known_id.clone(), edge.weight);
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{MovieCatalog, MovieRecord};
    use graph::Edge;

    fn known(ids: &[&str]) -> BTreeSet<MovieId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    /// K1 and K2 known; X linked to both, Y to K1 only, Z isolated
    fn create_test_graph() -> SimilarityGraph {
        let nodes = MovieCatalog::from_records(
            ["k1", "k2", "x", "y", "z"]
                .iter()
                .map(|id| MovieRecord::new(*id, id.to_uppercase()))
                .collect(),
        );
        SimilarityGraph::from_parts(
            nodes,
            vec![
                Edge::new("k1", "x", 0.5),
                Edge::new("k2", "x", 0.25),
                Edge::new("k1", "y", 0.6),
                Edge::new("k1", "k2", 0.9),
            ],
        )
    }

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(EngineOptions::default()).unwrap()
    }

    #[test]
    fn test_scores_are_summed_edge_weights() {
        let recs = engine()
            .recommend(&create_test_graph(), &known(&["k1", "k2"]), None)
            .unwrap();

        let ids: Vec<_> = recs.iter().map(|r| r.movie_id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
        assert!((recs[0].score - 0.75).abs() < 1e-12);
        assert_eq!(recs[1].score, 0.6);

        // Strongest link first
        assert_eq!(recs[0].connections[0].known_id, "k1");
        assert_eq!(recs[0].connections.len(), 2);
        assert_eq!(recs[0].title, "X");
    }

    #[test]
    fn test_never_recommends_known() {
        let recs = engine()
            .recommend(&create_test_graph(), &known(&["k1"]), None)
            .unwrap();
        assert!(recs.iter().all(|r| r.movie_id != "k1"));
        // k2 is reachable from k1 and not known here
        assert!(recs.iter().any(|r| r.movie_id == "k2"));
    }

    #[test]
    fn test_empty_and_full_known_sets() {
        let graph = create_test_graph();
        let e = engine();
        assert!(e.recommend(&graph, &known(&[]), None).unwrap().is_empty());
        assert!(e.recommend(&graph, &known(&["nope"]), None).unwrap().is_empty());
        assert!(
            e.recommend(&graph, &known(&["k1", "k2", "x", "y", "z"]), None)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_top_k_and_ties() {
        let nodes = MovieCatalog::from_records(
            ["k", "b", "a", "c"].iter().map(|id| MovieRecord::new(*id, *id)).collect(),
        );
        let graph = SimilarityGraph::from_parts(
            nodes,
            vec![Edge::new("k", "b", 0.5), Edge::new("k", "a", 0.5), Edge::new("k", "c", 0.7)],
        );
        let e = engine();

        let all = e.recommend(&graph, &known(&["k"]), None).unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.movie_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        let top = e.recommend(&graph, &known(&["k"]), Some(2)).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[1].movie_id, "a");

        assert!(e.recommend(&graph, &known(&["k"]), Some(0)).unwrap().is_empty());
    }

    #[test]
    fn test_zero_weight_edges_do_not_recommend() {
        let nodes = MovieCatalog::from_records(
            ["k", "a"].iter().map(|id| MovieRecord::new(*id, *id)).collect(),
        );
        let graph = SimilarityGraph::from_parts(nodes, vec![Edge::new("k", "a", 0.0)]);
        assert!(engine().recommend(&graph, &known(&["k"]), None).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let recs = engine()
            .recommend(&create_test_graph(), &known(&["k2", "ghost"]), None)
            .unwrap();
        let ids: Vec<_> = recs.iter().map(|r| r.movie_id.as_str()).collect();
        assert_eq!(ids, vec!["k1", "x"]);
    }

    #[test]
    fn test_invalid_options() {
        let options = EngineOptions {
            popularity_penalty: 2.0,
            dedup_titles: false,
        };
        assert!(RecommendationEngine::new(options).is_err());
    }
}
