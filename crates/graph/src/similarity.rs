//! Pairwise movie similarity.
//!
//! The edge weight between two movies is a weighted sum of four independent
//! sub-scores, each in [0, 1]:
//!
//! | factor   | measure                                             |
//! |----------|-----------------------------------------------------|
//! | actor    | overlap of the top-billed cast prefixes             |
//! | director | 1 when both directors are known and identical       |
//! | genre    | Jaccard overlap of genre sets                       |
//! | year     | decays with the release-year gap, 0 past a horizon  |
//!
//! A missing field (no year, no director, empty cast or genres) makes its
//! factor 0. Names are compared after trimming, whitespace folding and
//! lowercasing.

use crate::error::{GraphError, Result};
use crate::types::ScoreBreakdown;
use data_loader::MovieRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Allowed drift of the coefficient sum around 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

// =============================================================================
// Configuration
// =============================================================================

/// Coefficients of the four factors. Must be non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub actor: f64,
    pub director: f64,
    pub genre: f64,
    pub year: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            actor: 0.3,
            director: 0.4,
            genre: 0.2,
            year: 0.1,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("actor", self.actor),
            ("director", self.director),
            ("genre", self.genre),
            ("year", self.year),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(GraphError::InvalidWeights {
                    reason: format!("{} weight must be a non-negative number, got {}", name, value),
                });
            }
        }

        let sum = self.actor + self.director + self.genre + self.year;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(GraphError::InvalidWeights {
                reason: format!("weights must sum to 1, got {}", sum),
            });
        }
        Ok(())
    }
}

/// Set-overlap measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapMetric {
    /// |A ∩ B| / |A ∪ B|
    Jaccard,
    /// |A ∩ B| / min(|A|, |B|)
    OverlapCoefficient,
}

impl OverlapMetric {
    /// Overlap of two sets, 0 when either is empty
    pub fn overlap(&self, a: &HashSet<String>, b: &HashSet<String>) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let shared = a.intersection(b).count() as f64;
        let denominator = match self {
            OverlapMetric::Jaccard => a.union(b).count(),
            OverlapMetric::OverlapCoefficient => a.len().min(b.len()),
        } as f64;
        (shared / denominator).clamp(0.0, 1.0)
    }
}

/// How the year factor falls off with the gap between release years
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum YearDecay {
    /// `1 - gap / horizon_years`, 0 from the horizon on
    Linear { horizon_years: u16 },
    /// `exp(-gap / scale_years)`, 0 past the horizon
    Exponential { scale_years: f64, horizon_years: u16 },
}

impl Default for YearDecay {
    fn default() -> Self {
        YearDecay::Linear { horizon_years: 10 }
    }
}

impl YearDecay {
    pub fn validate(&self) -> Result<()> {
        match *self {
            YearDecay::Linear { horizon_years } if horizon_years == 0 => Err(GraphError::InvalidScorer {
                parameter: "year_decay.horizon_years".to_string(),
                value: horizon_years.to_string(),
            }),
            YearDecay::Exponential { scale_years, .. } if !(scale_years.is_finite() && scale_years > 0.0) => {
                Err(GraphError::InvalidScorer {
                    parameter: "year_decay.scale_years".to_string(),
                    value: scale_years.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Score for a release-year gap, in [0, 1] and non-increasing in `gap`
    pub fn score(&self, gap: u16) -> f64 {
        let score = match *self {
            YearDecay::Linear { horizon_years } => {
                if gap >= horizon_years {
                    0.0
                } else {
                    1.0 - f64::from(gap) / f64::from(horizon_years)
                }
            }
            YearDecay::Exponential {
                scale_years,
                horizon_years,
            } => {
                if gap > horizon_years {
                    0.0
                } else {
                    (-f64::from(gap) / scale_years).exp()
                }
            }
        };
        score.clamp(0.0, 1.0)
    }
}

/// Everything that shapes a similarity score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    #[serde(default)]
    pub weights: ScoringWeights,
    /// Top-billed cast members taken into account
    #[serde(default = "default_cast_prefix")]
    pub cast_prefix: usize,
    #[serde(default = "default_actor_metric")]
    pub actor_metric: OverlapMetric,
    #[serde(default = "default_genre_metric")]
    pub genre_metric: OverlapMetric,
    #[serde(default)]
    pub year_decay: YearDecay,
}

fn default_cast_prefix() -> usize {
    5
}

fn default_actor_metric() -> OverlapMetric {
    OverlapMetric::OverlapCoefficient
}

fn default_genre_metric() -> OverlapMetric {
    OverlapMetric::Jaccard
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            cast_prefix: default_cast_prefix(),
            actor_metric: default_actor_metric(),
            genre_metric: default_genre_metric(),
            year_decay: YearDecay::default(),
        }
    }
}

impl ScorerConfig {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.year_decay.validate()?;
        if self.cast_prefix == 0 {
            return Err(GraphError::InvalidScorer {
                parameter: "cast_prefix".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Scorer
// =============================================================================

/// Normalized view of a record, computed once per movie before the pairwise
/// pass
#[derive(Debug, Clone, Default)]
pub struct MovieFeatures {
    cast: HashSet<String>,
    genres: HashSet<String>,
    director: Option<String>,
    year: Option<u16>,
}

/// Trim, fold inner whitespace, lowercase. Empty results are dropped by the
/// callers.
fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn normalized_set<'a>(names: impl IntoIterator<Item = &'a String>) -> HashSet<String> {
    names
        .into_iter()
        .map(|n| normalize_name(n))
        .filter(|n| !n.is_empty())
        .collect()
}

/// Computes edge weights between movies
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    config: ScorerConfig,
}

impl SimilarityScorer {
    /// Create a scorer, rejecting unusable configuration
    pub fn new(config: ScorerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Extract the comparable features of a record
    pub fn features(&self, record: &MovieRecord) -> MovieFeatures {
        MovieFeatures {
            cast: normalized_set(record.top_cast(self.config.cast_prefix)),
            genres: normalized_set(&record.genres),
            director: record
                .director
                .as_deref()
                .map(normalize_name)
                .filter(|d| !d.is_empty()),
            year: record.year,
        }
    }

    /// Sub-scores of two feature sets, each clamped to [0, 1]
    pub fn breakdown_features(&self, a: &MovieFeatures, b: &MovieFeatures) -> ScoreBreakdown {
        let director = match (&a.director, &b.director) {
            (Some(da), Some(db)) if da == db => 1.0,
            _ => 0.0,
        };
        let year = match (a.year, b.year) {
            (Some(ya), Some(yb)) => self.config.year_decay.score(ya.abs_diff(yb)),
            _ => 0.0,
        };

        ScoreBreakdown {
            actor: self.config.actor_metric.overlap(&a.cast, &b.cast),
            director,
            genre: self.config.genre_metric.overlap(&a.genres, &b.genres),
            year,
        }
    }

    /// Combine sub-scores with the configured weights, clamped to [0, 1]
    pub fn combine(&self, breakdown: &ScoreBreakdown) -> f64 {
        let w = &self.config.weights;
        let weight = w.actor * breakdown.actor
            + w.director * breakdown.director
            + w.genre * breakdown.genre
            + w.year * breakdown.year;
        weight.clamp(0.0, 1.0)
    }

    /// Sub-scores of two records
    pub fn breakdown(&self, a: &MovieRecord, b: &MovieRecord) -> ScoreBreakdown {
        self.breakdown_features(&self.features(a), &self.features(b))
    }

    /// Edge weight between two records, symmetric and within [0, 1]
    pub fn score(&self, a: &MovieRecord, b: &MovieRecord) -> f64 {
        self.combine(&self.breakdown(a, b))
    }
}
