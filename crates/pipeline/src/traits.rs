//! Core traits for recommendation post-processing.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to ranked candidates.

use crate::types::Candidate;
use anyhow::Result;
use data_loader::MovieId;
use graph::SimilarityGraph;
use std::collections::{BTreeSet, HashMap};

/// Per-request state shared by all filters
pub struct RecommendationContext<'a> {
    pub graph: &'a SimilarityGraph,
    pub known: &'a BTreeSet<MovieId>,
    /// Edge count of every node in `graph`
    pub degrees: HashMap<&'a str, usize>,
}

impl<'a> RecommendationContext<'a> {
    pub fn new(graph: &'a SimilarityGraph, known: &'a BTreeSet<MovieId>) -> Self {
        Self {
            graph,
            known,
            degrees: graph.degrees(),
        }
    }

    pub fn degree(&self, id: &str) -> usize {
        self.degrees.get(id).copied().unwrap_or(0)
    }

    /// Mean degree over all nodes, 0 for an empty graph
    pub fn mean_degree(&self) -> f64 {
        if self.degrees.is_empty() {
            return 0.0;
        }
        self.degrees.values().sum::<usize>() as f64 / self.degrees.len() as f64
    }
}

/// Core trait for post-processing candidates.
///
/// ## Design Note
/// - `Send + Sync` lets one engine serve concurrent requests
/// - Filters take ownership of the Vec<Candidate> and return the kept ones,
///   possibly with adjusted scores
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &RecommendationContext<'_>,
    ) -> Result<Vec<Candidate>>;
}
