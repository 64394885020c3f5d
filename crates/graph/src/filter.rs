//! Threshold filtering of the complete graph.

use crate::error::{GraphError, Result};
use crate::types::SimilarityGraph;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Minimum edge weight kept by the filter, within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return Err(GraphError::InvalidThreshold { value });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Threshold {
    type Error = GraphError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> f64 {
        threshold.0
    }
}

/// Keeps edges whose weight reaches the threshold.
///
/// All nodes survive, including those left without edges.
#[derive(Debug, Clone, Copy)]
pub struct GraphFilter {
    threshold: Threshold,
}

impl GraphFilter {
    pub fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Filter a graph. Idempotent, and a higher threshold never keeps an
    /// edge a lower one dropped.
    pub fn apply(&self, graph: &SimilarityGraph) -> SimilarityGraph {
        let t = self.threshold.value();
        let edges: Vec<_> = graph.edges.iter().filter(|e| e.weight >= t).cloned().collect();

        let filtered = SimilarityGraph {
            nodes: graph.nodes.clone(),
            edges,
        };
        let stats = filtered.stats();
        info!(
            "Threshold {:.3}: kept {}/{} edges, {} isolated nodes",
            t,
            stats.edges,
            graph.edge_count(),
            stats.isolated
        );
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Edge;
    use data_loader::{MovieCatalog, MovieRecord};

    fn graph() -> SimilarityGraph {
        let nodes = MovieCatalog::from_records(vec![
            MovieRecord::new("a", "A"),
            MovieRecord::new("b", "B"),
            MovieRecord::new("c", "C"),
        ]);
        SimilarityGraph::from_parts(
            nodes,
            vec![Edge::new("a", "b", 0.59), Edge::new("a", "c", 0.3), Edge::new("b", "c", 0.0)],
        )
    }

    fn filter(t: f64) -> GraphFilter {
        GraphFilter::new(Threshold::new(t).unwrap())
    }

    #[test]
    fn test_threshold_keeps_heavy_edges() {
        let filtered = filter(0.5).apply(&graph());
        assert_eq!(filtered.edge_count(), 1);
        assert_eq!(filtered.weight_between("a", "b"), Some(0.59));
        // Nodes are never removed
        assert_eq!(filtered.node_count(), 3);

        // Boundary is inclusive
        assert_eq!(filter(0.59).apply(&graph()).edge_count(), 1);
        assert_eq!(filter(0.3).apply(&graph()).edge_count(), 2);
    }

    #[test]
    fn test_edge_at_threshold_survives() {
        let nodes = MovieCatalog::from_records(
            ["a", "b", "c", "d"].iter().map(|id| MovieRecord::new(*id, *id)).collect(),
        );
        let graph = SimilarityGraph::from_parts(
            nodes,
            vec![Edge::new("a", "b", 0.59), Edge::new("b", "c", 0.3), Edge::new("c", "d", 0.5)],
        );

        let filtered = filter(0.5).apply(&graph);
        let weights: Vec<f64> = filtered.edges().iter().map(|e| e.weight).collect();
        assert_eq!(weights, vec![0.59, 0.5]);
        assert_eq!(filtered.node_count(), 4);
    }

    #[test]
    fn test_threshold_bounds() {
        assert_eq!(filter(0.0).apply(&graph()).edge_count(), 3);
        assert_eq!(filter(1.0).apply(&graph()).edge_count(), 0);
    }

    #[test]
    fn test_idempotent() {
        let f = filter(0.3);
        let once = f.apply(&graph());
        let twice = f.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_monotonic() {
        let g = graph();
        let thresholds = [0.0, 0.1, 0.3, 0.5, 0.59, 0.6, 1.0];
        for pair in thresholds.windows(2) {
            let low = filter(pair[0]).apply(&g);
            let high = filter(pair[1]).apply(&g);
            for edge in high.edges() {
                assert!(low.edges().contains(edge));
            }
        }
    }

    #[test]
    fn test_invalid_threshold() {
        for value in [-0.1, 1.01, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Threshold::new(value),
                Err(GraphError::InvalidThreshold { .. })
            ));
        }
    }

    #[test]
    fn test_threshold_deserialize() {
        let t: Threshold = serde_json::from_str("0.25").unwrap();
        assert_eq!(t.value(), 0.25);
        assert!(serde_json::from_str::<Threshold>("1.5").is_err());
    }
}
