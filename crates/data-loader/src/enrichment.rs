//! Bounded catalog enrichment.
//!
//! Enrichment adds movies related to the ones already in the catalog (same
//! director, same leading actors) before the graph is built. The lookups are
//! done by a caller-supplied `MovieProvider`; this module only drives the
//! expansion and keeps it finite:
//! - at most `max_per_criterion` new ids per criterion per movie
//! - at most `max_rounds` rounds, each round expanding only the movies added
//!   by the previous one

use crate::error::{DataLoadError, Result};
use crate::types::{MovieCatalog, MovieId, MovieRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Source of related movies (typically a network-backed scraper with its own
/// cache and retry policy).
pub trait MovieProvider {
    /// Ids of other movies by this director, best matches first
    fn by_director(&self, director: &str, limit: usize) -> anyhow::Result<Vec<MovieId>>;

    /// Ids of other movies featuring this actor, best matches first
    fn by_actor(&self, actor: &str, limit: usize) -> anyhow::Result<Vec<MovieId>>;

    /// Full record for an id, `None` if the provider has nothing usable
    fn fetch(&self, id: &str) -> anyhow::Result<Option<MovieRecord>>;
}

/// Limits of one enrichment run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_max_per_criterion")]
    pub max_per_criterion: usize,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    /// Leading actors used as criteria for each movie
    #[serde(default = "default_actors_per_movie")]
    pub actors_per_movie: usize,
}

fn default_max_per_criterion() -> usize {
    3
}

fn default_max_rounds() -> usize {
    1
}

fn default_actors_per_movie() -> usize {
    2
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_per_criterion: default_max_per_criterion(),
            max_rounds: default_max_rounds(),
            actors_per_movie: default_actors_per_movie(),
        }
    }
}

impl EnrichmentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_per_criterion == 0 {
            return Err(DataLoadError::InvalidEnrichment {
                parameter: "max_per_criterion".to_string(),
                value: self.max_per_criterion.to_string(),
            });
        }
        if self.max_rounds == 0 {
            return Err(DataLoadError::InvalidEnrichment {
                parameter: "max_rounds".to_string(),
                value: self.max_rounds.to_string(),
            });
        }
        Ok(())
    }
}

/// What an enrichment run added, round by round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub added_per_round: Vec<Vec<MovieId>>,
}

impl EnrichmentReport {
    pub fn total_added(&self) -> usize {
        self.added_per_round.iter().map(Vec::len).sum()
    }
}

/// Drives a `MovieProvider` to grow a catalog within fixed bounds
pub struct Enricher<'a, P: MovieProvider> {
    provider: &'a P,
    config: EnrichmentConfig,
}

impl<'a, P: MovieProvider> Enricher<'a, P> {
    pub fn new(provider: &'a P, config: EnrichmentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    /// Grow `catalog` in place and report what was added.
    ///
    /// Provider failures are logged and skipped: a missing related movie
    /// only makes the catalog smaller.
    #[instrument(skip(self, catalog), fields(initial = catalog.len()))]
    pub fn enrich(&self, catalog: &mut MovieCatalog) -> EnrichmentReport {
        let mut report = EnrichmentReport::default();
        let mut frontier: Vec<MovieId> = catalog.records().iter().map(|r| r.id.clone()).collect();

        for round in 1..=self.config.max_rounds {
            if frontier.is_empty() {
                break;
            }

            let wanted = self.related_ids(catalog, &frontier);
            let mut added = Vec::new();
            for id in wanted {
                match self.provider.fetch(&id) {
                    Ok(Some(mut record)) => {
                        // Keep the id we asked for as the key, whatever the provider echoes
                        record.id = id.clone();
                        if catalog.insert(record) {
                            added.push(id);
                        }
                    }
                    Ok(None) => debug!("Provider had no record for {}", id),
                    Err(e) => warn!("Failed to fetch {}: {:#}", id, e),
                }
            }

            info!("Enrichment round {} added {} movies", round, added.len());
            frontier = added.clone();
            report.added_per_round.push(added);
        }

        report
    }

    /// New ids related to the frontier movies, in deterministic order
    fn related_ids(&self, catalog: &MovieCatalog, frontier: &[MovieId]) -> Vec<MovieId> {
        let limit = self.config.max_per_criterion;
        let mut queued: HashSet<MovieId> = HashSet::new();
        let mut wanted = Vec::new();

        let mut take = |ids: Vec<MovieId>| {
            let mut taken = 0;
            for id in ids {
                if taken == limit {
                    break;
                }
                if catalog.contains(&id) || queued.contains(&id) {
                    continue;
                }
                queued.insert(id.clone());
                wanted.push(id);
                taken += 1;
            }
        };

        for id in frontier {
            let Some(record) = catalog.get(id) else {
                continue;
            };

            if let Some(director) = record.director.as_deref() {
                // Over-ask so already-known ids don't eat the budget
                match self.provider.by_director(director, limit.saturating_mul(2)) {
                    Ok(ids) => take(ids),
                    Err(e) => warn!("Director lookup failed for {:?}: {:#}", director, e),
                }
            }

            for actor in record.top_cast(self.config.actors_per_movie) {
                match self.provider.by_actor(actor, limit.saturating_mul(2)) {
                    Ok(ids) => take(ids),
                    Err(e) => warn!("Actor lookup failed for {:?}: {:#}", actor, e),
                }
            }
        }

        wanted
    }
}
