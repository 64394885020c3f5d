//! Recommendation pipeline over the filtered similarity graph.
//!
//! This crate provides:
//! - `RecommendationEngine`, connectivity-based ranking
//! - Filter trait and implementations for post-processing candidates
//! - FilterPipeline for composing filters
//! - `KnownSet` resolution of user-supplied ids and titles
//! - `PipelineConfig` and the `PipelineOrchestrator` running
//!   build → filter → layout → recommend
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{PipelineConfig, PipelineOrchestrator};
//!
//! let orchestrator = PipelineOrchestrator::new(PipelineConfig::with_threshold(0.4))?;
//! let output = orchestrator.run(catalog)?;
//! orchestrator.write_artifacts(&output, Path::new("output"), false)?;
//!
//! let result = orchestrator.recommend(&output.graph, &["Heat", "Thief"], Some(10))?;
//! for rec in result.recommendations {
//!     println!("{} {:.3}", rec.title, rec.score);
//! }
//! ```

pub mod types;
pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod known;
pub mod engine;
pub mod config;
pub mod orchestrator;

// Re-export main types
pub use types::{Candidate, Connection, Recommendation};
pub use traits::{Filter, RecommendationContext};
pub use filter_pipeline::FilterPipeline;
pub use known::{normalize_title, KnownSet};
pub use engine::{EngineOptions, RecommendationEngine};
pub use config::{EnrichmentSettings, PipelineConfig};
pub use orchestrator::{PipelineOrchestrator, PipelineOutput, RecommendationResult};
