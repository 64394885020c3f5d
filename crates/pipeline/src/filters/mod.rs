//! Filter implementations for recommendation post-processing.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod known_movies;
pub mod popularity_penalty;
pub mod title_dedup;
pub mod minimum_score;

// Re-export for convenience
pub use known_movies::KnownMoviesFilter;
pub use popularity_penalty::PopularityPenalty;
pub use title_dedup::TitleDedupFilter;
pub use minimum_score::MinimumScoreFilter;
