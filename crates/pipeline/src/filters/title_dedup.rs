//! Filter to collapse candidates that are the same film under several ids.
//!
//! Scraped catalogs sometimes hold a movie twice (a remaster, a different
//! id scheme). Only the best-scored candidate per normalized title is kept.

use crate::known::normalize_title;
use crate::traits::{Filter, RecommendationContext};
use crate::types::{rank_order, Candidate};
use anyhow::Result;
use std::collections::HashMap;

/// Keeps one candidate per normalized title, the best-ranked one.
pub struct TitleDedupFilter;

impl Filter for TitleDedupFilter {
    fn name(&self) -> &str {
        "TitleDedupFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &RecommendationContext<'_>,
    ) -> Result<Vec<Candidate>> {
        let mut best: HashMap<String, usize> = HashMap::new();
        for (i, candidate) in candidates.iter().enumerate() {
            // Candidates missing from the graph dedup on their id
            let key = context
                .graph
                .node(&candidate.movie_id)
                .map(|m| normalize_title(&m.title))
                .unwrap_or_else(|| candidate.movie_id.clone());

            best.entry(key)
                .and_modify(|kept| {
                    if rank_order(candidate, &candidates[*kept]).is_lt() {
                        *kept = i;
                    }
                })
                .or_insert(i);
        }

        let mut keep = vec![false; candidates.len()];
        for &i in best.values() {
            keep[i] = true;
        }

        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .zip(keep)
            .filter_map(|(candidate, kept)| kept.then_some(candidate))
            .collect();
        Ok(filtered)
    }
}
