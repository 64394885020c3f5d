//! Graph types shared by the builder, the filter and the layout.

use data_loader::{MovieCatalog, MovieId, MovieRecord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Edges
// =============================================================================

/// Raw sub-scores behind an edge weight, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub actor: f64,
    pub director: f64,
    pub genre: f64,
    pub year: f64,
}

/// Undirected weighted edge between two distinct movies.
///
/// Endpoints are stored in lexicographic order so that `(a, b)` and `(b, a)`
/// produce the same edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: MovieId,
    pub target: MovieId,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

impl Edge {
    pub fn new(a: impl Into<MovieId>, b: impl Into<MovieId>, weight: f64) -> Self {
        let (a, b) = (a.into(), b.into());
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        Self {
            source,
            target,
            weight,
            breakdown: None,
        }
    }

    pub fn with_breakdown(mut self, breakdown: ScoreBreakdown) -> Self {
        self.breakdown = Some(breakdown);
        self
    }

    pub fn connects(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    /// The endpoint opposite to `id`, if `id` is an endpoint
    pub fn other(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(self.target.as_str())
        } else if self.target == id {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}

// =============================================================================
// SimilarityGraph
// =============================================================================

/// Movie nodes plus weighted similarity edges.
///
/// Used for both the complete graph (every pair scored) and the filtered
/// graph (low-weight edges dropped). Nodes are never removed between the
/// two; they keep catalog order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimilarityGraph {
    pub(crate) nodes: MovieCatalog,
    pub(crate) edges: Vec<Edge>,
}

impl SimilarityGraph {
    /// Assemble a graph from already-scored parts.
    ///
    /// Self-loops, edges with an unknown endpoint, edges whose weight is NaN
    /// or outside [0, 1], and repeated pairs (after the first kept one) are
    /// discarded so the graph invariants hold whatever the caller passes in.
    /// Out-of-range weights are dropped, not clamped.
    pub fn from_parts(nodes: MovieCatalog, edges: Vec<Edge>) -> Self {
        let mut seen: HashSet<(MovieId, MovieId)> = HashSet::with_capacity(edges.len());
        let edges = edges
            .into_iter()
            .filter(|e| e.source != e.target && nodes.contains(&e.source) && nodes.contains(&e.target))
            .filter(|e| (0.0..=1.0).contains(&e.weight))
            .filter(|e| seen.insert((e.source.clone(), e.target.clone())))
            .collect();
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[MovieRecord] {
        self.nodes.records()
    }

    pub fn catalog(&self) -> &MovieCatalog {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&MovieRecord> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Weight of the edge between `a` and `b`, if one exists
    pub fn weight_between(&self, a: &str, b: &str) -> Option<f64> {
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
            .map(|e| e.weight)
    }

    /// Neighbors of `id` with the connecting edge weight
    pub fn neighbors<'a>(&'a self, id: &'a str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.edges
            .iter()
            .filter_map(move |e| e.other(id).map(|other| (other, e.weight)))
    }

    /// Number of edges touching each node (isolated nodes map to 0)
    pub fn degrees(&self) -> HashMap<&str, usize> {
        let mut degrees: HashMap<&str, usize> =
            self.nodes().iter().map(|n| (n.id.as_str(), 0)).collect();
        for edge in &self.edges {
            *degrees.entry(edge.source.as_str()).or_insert(0) += 1;
            *degrees.entry(edge.target.as_str()).or_insert(0) += 1;
        }
        degrees
    }

    /// Summary numbers for logging
    pub fn stats(&self) -> GraphStats {
        let degrees = self.degrees();
        let isolated = degrees.values().filter(|&&d| d == 0).count();

        let (min_weight, max_weight, mean_weight) = if self.edges.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let min = self.edges.iter().map(|e| e.weight).fold(f64::INFINITY, f64::min);
            let max = self.edges.iter().map(|e| e.weight).fold(f64::NEG_INFINITY, f64::max);
            let mean = self.edges.iter().map(|e| e.weight).sum::<f64>() / self.edges.len() as f64;
            (min, max, mean)
        };

        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            isolated,
            min_weight,
            mean_weight,
            max_weight,
        }
    }
}

/// Precomputed statistics for a graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub isolated: usize,
    pub min_weight: f64,
    pub mean_weight: f64,
    pub max_weight: f64,
}

// =============================================================================
// Layout output
// =============================================================================

/// A node position in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn distance(&self, other: &Position3D) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}
