//! Pipeline configuration.
//!
//! Read from a JSON file, every section optional except the threshold:
//!
//! ```json
//! {
//!   "threshold": 0.4,
//!   "scoring": { "weights": { "actor": 0.3, "director": 0.4, "genre": 0.2, "year": 0.1 } },
//!   "layout": { "iterations": 100, "seed": 7 },
//!   "top_k": 10,
//!   "enrichment": { "enabled": true, "max_per_criterion": 2 }
//! }
//! ```

use crate::engine::EngineOptions;
use anyhow::{Context, Result, bail};
use data_loader::EnrichmentConfig;
use graph::{LayoutConfig, ScorerConfig, Threshold};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Enrichment toggle plus its limits
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnrichmentSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub limits: EnrichmentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum edge weight kept in the filtered graph. No default: callers
    /// must choose one.
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub scoring: ScorerConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Maximum recommendations per request, all when absent
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub popularity_penalty: f64,
    #[serde(default)]
    pub dedup_titles: bool,
    /// Keep the score breakdown of each edge in the exported document
    #[serde(default)]
    pub include_breakdown: bool,
    #[serde(default)]
    pub enrichment: EnrichmentSettings,
}

impl Default for PipelineConfig {
    /// Every default, threshold still unset
    fn default() -> Self {
        Self {
            threshold: None,
            scoring: ScorerConfig::default(),
            layout: LayoutConfig::default(),
            top_k: None,
            popularity_penalty: 0.0,
            dedup_titles: false,
            include_breakdown: false,
            enrichment: EnrichmentSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Default settings around an explicit threshold
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold: Some(threshold),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration file. The result is not validated yet:
    /// command-line overrides usually come first.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn threshold(&self) -> Result<Threshold> {
        let Some(value) = self.threshold else {
            bail!("threshold is required (set it in the config file or pass --threshold)");
        };
        Threshold::new(value).context("Invalid threshold")
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            popularity_penalty: self.popularity_penalty,
            dedup_titles: self.dedup_titles,
        }
    }

    /// Reject any setting a stage would refuse, before anything runs
    pub fn validate(&self) -> Result<()> {
        self.threshold()?;
        self.scoring.validate().context("Invalid scoring settings")?;
        self.layout.validate().context("Invalid layout settings")?;
        if !(0.0..=1.0).contains(&self.popularity_penalty) {
            bail!(
                "popularity_penalty must be within [0, 1], got {}",
                self.popularity_penalty
            );
        }
        if self.enrichment.enabled {
            self.enrichment
                .limits
                .validate()
                .context("Invalid enrichment settings")?;
        }
        Ok(())
    }
}
