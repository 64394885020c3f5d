//! # Graph Crate
//!
//! Turns a movie catalog into a weighted similarity graph and lays it out in
//! 3D for the visualization client.
//!
//! ## Main Components
//!
//! - **similarity**: `SimilarityScorer`, the four-factor pairwise score
//! - **builder**: `GraphBuilder`, scores every pair into the complete graph
//! - **filter**: `GraphFilter`, drops edges under a `Threshold`
//! - **layout**: `ForceLayout`, spring embedding with isolated-node placement
//! - **export**: `GraphDocument` JSON and CSV tables
//!
//! ## Example Usage
//!
//! ```ignore
//! use graph::{ForceLayout, GraphBuilder, GraphDocument, GraphFilter, LayoutConfig,
//!     ScorerConfig, SimilarityScorer, Threshold};
//!
//! let scorer = SimilarityScorer::new(ScorerConfig::default())?;
//! let complete = GraphBuilder::new(scorer).build(catalog.records());
//! let filtered = GraphFilter::new(Threshold::new(0.4)?).apply(&complete);
//! let layout = ForceLayout::new(LayoutConfig::default())?.compute(&filtered);
//!
//! GraphDocument::from_graph(&filtered, &layout, false).write_json(Path::new("graph.json"))?;
//! ```

pub mod error;
pub mod types;
pub mod similarity;
pub mod builder;
pub mod filter;
pub mod layout;
pub mod export;

pub use error::{GraphError, Result};
pub use types::{Edge, GraphStats, Position3D, ScoreBreakdown, SimilarityGraph};
pub use similarity::{OverlapMetric, ScorerConfig, ScoringWeights, SimilarityScorer, YearDecay};
pub use builder::GraphBuilder;
pub use filter::{GraphFilter, Threshold};
pub use layout::{ForceLayout, Layout, LayoutConfig};
pub use export::{write_csv, EdgeDocument, GraphDocument, NodeDocument};
