//! Complete-graph construction.
//!
//! Every unordered pair of distinct movies is scored once. The pass is
//! O(n²) in the number of movies, which suits catalogs of tens to a few
//! hundred movies; the pairs are spread over the rayon pool one row at a time.

use crate::similarity::{MovieFeatures, SimilarityScorer};
use crate::types::{Edge, SimilarityGraph};
use data_loader::{MovieCatalog, MovieRecord};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

/// Builds the complete similarity graph over a movie list
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    scorer: SimilarityScorer,
    keep_zero_weight: bool,
}

impl GraphBuilder {
    pub fn new(scorer: SimilarityScorer) -> Self {
        Self {
            scorer,
            keep_zero_weight: true,
        }
    }

    /// Drop pairs that share nothing at all (weight 0) at build time.
    ///
    /// A filter threshold above 0 removes them anyway, so this only changes
    /// the complete graph. Defaults to keeping them.
    pub fn with_zero_weight_edges(mut self, keep: bool) -> Self {
        self.keep_zero_weight = keep;
        self
    }

    pub fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    /// Score every pair of `movies`.
    ///
    /// Records repeating an earlier id are ignored. Edge order follows input
    /// order (row by row over the upper triangle), so identical input gives
    /// an identical graph.
    #[instrument(skip(self, movies), fields(movies = movies.len()))]
    pub fn build(&self, movies: &[MovieRecord]) -> SimilarityGraph {
        let mut catalog = MovieCatalog::new();
        let mut skipped = 0usize;
        for movie in movies {
            if !catalog.insert(movie.clone()) {
                skipped += 1;
            }
        }
        if skipped > 0 {
            debug!("Ignored {} records with a repeated id", skipped);
        }

        self.build_catalog(catalog)
    }

    /// Score every pair of an already-deduplicated catalog
    pub fn build_catalog(&self, catalog: MovieCatalog) -> SimilarityGraph {
        let records = catalog.records();
        let n = records.len();

        let features: Vec<MovieFeatures> = records.par_iter().map(|r| self.scorer.features(r)).collect();

        let edges: Vec<Edge> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| {
                let features = &features;
                (i + 1..n).filter_map(move |j| {
                    let breakdown = self.scorer.breakdown_features(&features[i], &features[j]);
                    let weight = self.scorer.combine(&breakdown);
                    if weight <= 0.0 && !self.keep_zero_weight {
                        return None;
                    }
                    Some(Edge::new(records[i].id.clone(), records[j].id.clone(), weight).with_breakdown(breakdown))
                })
            })
            .collect();

        let graph = SimilarityGraph { nodes: catalog, edges };
        let stats = graph.stats();
        info!(
            "Built complete graph: {} nodes, {} edges (weights {:.3}..{:.3}, mean {:.3})",
            stats.nodes, stats.edges, stats.min_weight, stats.max_weight, stats.mean_weight
        );
        graph
    }
}
