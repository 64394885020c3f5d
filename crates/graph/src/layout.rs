//! 3D force-directed layout of the filtered graph.
//!
//! Connected nodes are placed by a spring embedding: every edge pulls its
//! endpoints together in proportion to its weight, every pair of nodes pushes
//! apart, and the step size cools linearly over the iteration budget.
//! Isolated nodes take no part in the simulation; they are spread over a
//! Fibonacci sphere just outside the connected component.

use crate::error::{GraphError, Result};
use crate::types::{Position3D, SimilarityGraph};
use data_loader::MovieId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Keeps the repulsion finite for near-coincident nodes
const MIN_DISTANCE: f64 = 0.1;

/// Gap between the connected component and the isolated shell, as a
/// fraction of the layout radius
const ISOLATED_MARGIN: f64 = 0.2;

const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Iteration budget
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Stop early once no node moves further than this in one step
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Seed of the initial placement
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Radius of the initial placement, also the minimum radius of the
    /// isolated shell
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Largest displacement of a node in the first step
    #[serde(default = "default_max_step")]
    pub max_step: f64,
}

fn default_iterations() -> usize {
    50
}

fn default_tolerance() -> f64 {
    1e-3
}

fn default_seed() -> u64 {
    42
}

fn default_radius() -> f64 {
    15.0
}

fn default_max_step() -> f64 {
    2.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            tolerance: default_tolerance(),
            seed: default_seed(),
            radius: default_radius(),
            max_step: default_max_step(),
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("radius", self.radius),
            ("max_step", self.max_step),
        ];
        for (parameter, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(GraphError::InvalidLayout {
                    parameter: parameter.to_string(),
                    value: value.to_string(),
                });
            }
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(GraphError::InvalidLayout {
                parameter: "tolerance".to_string(),
                value: self.tolerance.to_string(),
            });
        }
        Ok(())
    }
}

/// Positions for every node of a graph
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub positions: HashMap<MovieId, Position3D>,
    /// Simulation steps actually run
    pub iterations_run: usize,
    /// Whether the tolerance was reached before the budget ran out
    pub converged: bool,
}

impl Layout {
    pub fn get(&self, id: &str) -> Option<&Position3D> {
        self.positions.get(id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

type Vec3 = [f64; 3];

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn norm(v: Vec3) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Point `i` of `n` spread evenly over a sphere of the given radius
fn fibonacci_point(i: usize, n: usize, radius: f64) -> Vec3 {
    let n = n.max(1) as f64;
    let y = 1.0 - 2.0 * (i as f64 + 0.5) / n;
    let ring = (1.0 - y * y).max(0.0).sqrt();
    let theta = GOLDEN_ANGLE * i as f64;
    [radius * ring * theta.cos(), radius * y, radius * ring * theta.sin()]
}

/// Fixed direction used to separate two coincident nodes
fn fallback_direction(i: usize, j: usize) -> Vec3 {
    let p = fibonacci_point(i.min(j), i.max(j) + 1, 1.0);
    if i < j { p } else { [-p[0], -p[1], -p[2]] }
}

#[derive(Debug, Clone)]
pub struct ForceLayout {
    config: LayoutConfig,
}

impl ForceLayout {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Position every node of `graph`. Deterministic for a given graph and
    /// configuration, never yields non-finite coordinates.
    #[instrument(skip(self, graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
    pub fn compute(&self, graph: &SimilarityGraph) -> Layout {
        let degrees = graph.degrees();
        let (connected, isolated): (Vec<&str>, Vec<&str>) = graph
            .nodes()
            .iter()
            .map(|n| n.id.as_str())
            .partition(|id| degrees.get(id).copied().unwrap_or(0) > 0);

        let (mut points, iterations_run, converged) = self.simulate(graph, &connected);

        // Center the connected component on the origin
        if !points.is_empty() {
            let m = points.len() as f64;
            let mut centroid = [0.0; 3];
            for p in &points {
                for axis in 0..3 {
                    centroid[axis] += p[axis] / m;
                }
            }
            for p in &mut points {
                *p = sub(*p, centroid);
            }
        }

        let outer = points.iter().map(|p| norm(*p)).fold(0.0, f64::max);
        let shell = outer.max(self.config.radius) * (1.0 + ISOLATED_MARGIN);

        let mut positions = HashMap::with_capacity(graph.node_count());
        let mut sanitized = 0usize;
        for (i, (id, p)) in connected.iter().zip(points).enumerate() {
            let p = if p.iter().all(|c| c.is_finite()) {
                p
            } else {
                sanitized += 1;
                fibonacci_point(i, connected.len(), self.config.radius)
            };
            positions.insert(id.to_string(), Position3D::new(p[0], p[1], p[2]));
        }
        for (i, id) in isolated.iter().enumerate() {
            let p = fibonacci_point(i, isolated.len(), shell);
            positions.insert(id.to_string(), Position3D::new(p[0], p[1], p[2]));
        }

        if sanitized > 0 {
            warn!("Replaced {} non-finite positions", sanitized);
        }
        info!(
            "Layout: {} connected, {} isolated, {} iterations (converged: {})",
            connected.len(),
            isolated.len(),
            iterations_run,
            converged
        );

        Layout {
            positions,
            iterations_run,
            converged,
        }
    }

    /// Run the spring simulation over the connected nodes
    fn simulate(&self, graph: &SimilarityGraph, connected: &[&str]) -> (Vec<Vec3>, usize, bool) {
        let m = connected.len();
        if m == 0 {
            return (Vec::new(), 0, true);
        }

        let index: HashMap<&str, usize> = connected.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); m];
        for edge in graph.edges() {
            if let (Some(&a), Some(&b)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
                adjacency[a].push((b, edge.weight));
                adjacency[b].push((a, edge.weight));
            }
        }

        let radius = self.config.radius;
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut points: Vec<Vec3> = (0..m)
            .map(|_| {
                [
                    rng.random_range(-radius..radius),
                    rng.random_range(-radius..radius),
                    rng.random_range(-radius..radius),
                ]
            })
            .collect();

        // Ideal spring length for m nodes sharing a ball of this radius
        let k = radius / (m as f64).cbrt();
        let budget = self.config.iterations;
        let mut iterations_run = 0;
        let mut converged = false;

        for iteration in 0..budget {
            let temperature = self.config.max_step * (1.0 - iteration as f64 / budget as f64);

            let displacements: Vec<Vec3> = (0..m)
                .into_par_iter()
                .map(|i| {
                    let mut force = [0.0; 3];
                    for j in 0..m {
                        if i == j {
                            continue;
                        }
                        let delta = sub(points[i], points[j]);
                        let dist = norm(delta);
                        let dir = if dist > 1e-9 {
                            [delta[0] / dist, delta[1] / dist, delta[2] / dist]
                        } else {
                            fallback_direction(i, j)
                        };
                        let repulsion = k * k / (dist + MIN_DISTANCE);
                        for axis in 0..3 {
                            force[axis] += dir[axis] * repulsion;
                        }
                    }
                    for &(j, weight) in &adjacency[i] {
                        let delta = sub(points[j], points[i]);
                        let dist = norm(delta);
                        if dist <= 1e-9 {
                            continue;
                        }
                        let attraction = dist * dist / k * weight;
                        for axis in 0..3 {
                            force[axis] += delta[axis] / dist * attraction;
                        }
                    }

                    let magnitude = norm(force);
                    if !magnitude.is_finite() || magnitude <= 0.0 {
                        return [0.0; 3];
                    }
                    let step = magnitude.min(temperature);
                    [
                        force[0] / magnitude * step,
                        force[1] / magnitude * step,
                        force[2] / magnitude * step,
                    ]
                })
                .collect();

            let mut largest = 0.0f64;
            for (p, d) in points.iter_mut().zip(&displacements) {
                for axis in 0..3 {
                    p[axis] += d[axis];
                }
                largest = largest.max(norm(*d));
            }
            iterations_run = iteration + 1;

            if largest < self.config.tolerance {
                converged = true;
                debug!("Layout converged after {} iterations", iterations_run);
                break;
            }
        }

        (points, iterations_run, converged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Edge;
    use data_loader::{MovieCatalog, MovieRecord};

    fn nodes(ids: &[&str]) -> MovieCatalog {
        MovieCatalog::from_records(ids.iter().map(|id| MovieRecord::new(*id, id.to_uppercase())).collect())
    }

    fn layout() -> ForceLayout {
        ForceLayout::new(LayoutConfig::default()).unwrap()
    }

    fn assert_all_finite(layout: &Layout) {
        for (id, p) in &layout.positions {
            assert!(p.is_finite(), "non-finite position for {}", id);
        }
    }

    #[test]
    fn test_empty_graph() {
        let result = layout().compute(&SimilarityGraph::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_single_node() {
        let graph = SimilarityGraph::from_parts(nodes(&["solo"]), vec![]);
        let result = layout().compute(&graph);
        assert_eq!(result.len(), 1);
        assert_all_finite(&result);
    }

    #[test]
    fn test_edgeless_graph_spreads_nodes() {
        let ids = ["a", "b", "c", "d", "e"];
        let graph = SimilarityGraph::from_parts(nodes(&ids), vec![]);
        let result = layout().compute(&graph);
        assert_eq!(result.len(), 5);
        assert_all_finite(&result);

        // No two isolated nodes share a position
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert!(result.get(a).unwrap().distance(result.get(b).unwrap()) > 1e-6);
            }
        }
    }

    #[test]
    fn test_isolated_nodes_outside_component() {
        let graph = SimilarityGraph::from_parts(
            nodes(&["a", "b", "c", "lonely"]),
            vec![Edge::new("a", "b", 0.8), Edge::new("b", "c", 0.6)],
        );
        let result = layout().compute(&graph);
        assert_all_finite(&result);

        let origin = Position3D::default();
        let lonely = result.get("lonely").unwrap().distance(&origin);
        for id in ["a", "b", "c"] {
            assert!(result.get(id).unwrap().distance(&origin) < lonely);
        }
    }

    #[test]
    fn test_deterministic() {
        let graph = SimilarityGraph::from_parts(
            nodes(&["a", "b", "c", "d"]),
            vec![Edge::new("a", "b", 0.8), Edge::new("c", "d", 0.4), Edge::new("a", "d", 0.3)],
        );
        let l = layout();
        assert_eq!(l.compute(&graph), l.compute(&graph));
    }

    #[test]
    fn test_similar_nodes_end_up_closer() {
        // Two tight triangles joined by one weak edge
        let graph = SimilarityGraph::from_parts(
            nodes(&["a", "b", "c", "d", "e", "f"]),
            vec![
                Edge::new("a", "b", 0.9),
                Edge::new("b", "c", 0.9),
                Edge::new("a", "c", 0.9),
                Edge::new("d", "e", 0.9),
                Edge::new("e", "f", 0.9),
                Edge::new("d", "f", 0.9),
                Edge::new("c", "d", 0.1),
            ],
        );
        let config = LayoutConfig {
            iterations: 300,
            ..LayoutConfig::default()
        };
        let result = ForceLayout::new(config).unwrap().compute(&graph);
        assert_all_finite(&result);

        let d = |x: &str, y: &str| result.get(x).unwrap().distance(result.get(y).unwrap());
        let within = (d("a", "b") + d("b", "c") + d("a", "c") + d("d", "e") + d("e", "f") + d("d", "f")) / 6.0;
        let across = (d("a", "e") + d("a", "f") + d("b", "e") + d("b", "f")) / 4.0;
        assert!(within < across, "within {} across {}", within, across);
    }

    #[test]
    fn test_zero_iterations() {
        let graph = SimilarityGraph::from_parts(nodes(&["a", "b"]), vec![Edge::new("a", "b", 0.5)]);
        let config = LayoutConfig {
            iterations: 0,
            ..LayoutConfig::default()
        };
        let result = ForceLayout::new(config).unwrap().compute(&graph);
        assert_eq!(result.iterations_run, 0);
        assert!(!result.converged);
        assert_all_finite(&result);
    }

    #[test]
    fn test_invalid_config() {
        let config = LayoutConfig {
            radius: 0.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            ForceLayout::new(config),
            Err(GraphError::InvalidLayout { ref parameter, .. }) if parameter == "radius"
        ));
    }
}
