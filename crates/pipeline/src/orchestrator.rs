//! # Pipeline Orchestrator
//!
//! Coordinates one run of the graph pipeline:
//! 1. Validate the catalog (and optionally enrich it)
//! 2. Score every pair into the complete graph
//! 3. Filter edges under the threshold
//! 4. Lay the filtered graph out in 3D
//! 5. Serve recommendation requests against the filtered graph
//!
//! Every run starts from scratch: the same catalog and configuration always
//! produce the same graph, layout and rankings.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use data_loader::{Enricher, EnrichmentReport, MovieCatalog, MovieProvider};
use graph::{
    write_csv, ForceLayout, GraphBuilder, GraphDocument, GraphFilter, GraphStats, Layout, SimilarityGraph,
    SimilarityScorer,
};

use crate::config::PipelineConfig;
use crate::engine::RecommendationEngine;
use crate::known::KnownSet;
use crate::types::Recommendation;

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Statistics of the complete graph, before filtering
    pub complete_stats: GraphStats,
    /// The filtered graph
    pub graph: SimilarityGraph,
    pub layout: Layout,
}

impl PipelineOutput {
    pub fn document(&self, include_breakdown: bool) -> GraphDocument {
        GraphDocument::from_graph(&self.graph, &self.layout, include_breakdown)
    }
}

/// Answer to one recommendation request
#[derive(Debug, Clone)]
pub struct RecommendationResult {
    pub known: KnownSet,
    pub recommendations: Vec<Recommendation>,
}

/// Main orchestrator holding every configured stage
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    builder: GraphBuilder,
    filter: GraphFilter,
    layout: ForceLayout,
    engine: RecommendationEngine,
}

impl PipelineOrchestrator {
    /// Validate `config` and set up every stage
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let scorer = SimilarityScorer::new(config.scoring).context("Failed to create similarity scorer")?;
        let builder = GraphBuilder::new(scorer);
        let filter = GraphFilter::new(config.threshold()?);
        let layout = ForceLayout::new(config.layout).context("Failed to create layout")?;
        let engine = RecommendationEngine::new(config.engine_options())?;

        Ok(Self {
            config,
            builder,
            filter,
            layout,
            engine,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Grow `catalog` through `provider` when enrichment is enabled
    pub fn enrich<P: MovieProvider>(&self, catalog: &mut MovieCatalog, provider: &P) -> Result<Option<EnrichmentReport>> {
        let settings = self.config.enrichment;
        if !settings.enabled {
            return Ok(None);
        }

        let enricher = Enricher::new(provider, settings.limits).context("Failed to create enricher")?;
        let report = enricher.enrich(catalog);
        info!(
            "Enrichment added {} movies in {} rounds (catalog now {})",
            report.total_added(),
            report.added_per_round.len(),
            catalog.len()
        );
        Ok(Some(report))
    }

    /// Build, filter and lay out the graph of `catalog`
    #[instrument(skip(self, catalog), fields(movies = catalog.len()))]
    pub fn run(&self, catalog: MovieCatalog) -> Result<PipelineOutput> {
        let start_time = Instant::now();

        catalog.validate().context("Invalid movie catalog")?;

        let complete = self.builder.build_catalog(catalog);
        let complete_stats = complete.stats();

        let graph = self.filter.apply(&complete);
        let layout = self.layout.compute(&graph);

        info!(
            "Pipeline run finished in {:.2?}: {} nodes, {}/{} edges kept",
            start_time.elapsed(),
            graph.node_count(),
            graph.edge_count(),
            complete_stats.edges
        );

        Ok(PipelineOutput {
            complete_stats,
            graph,
            layout,
        })
    }

    /// Resolve `queries` against the filtered graph and rank the rest.
    ///
    /// `top_k` overrides the configured limit.
    pub fn recommend<S: AsRef<str>>(
        &self,
        graph: &SimilarityGraph,
        queries: &[S],
        top_k: Option<usize>,
    ) -> Result<RecommendationResult> {
        let known = KnownSet::resolve(graph, queries);
        let recommendations = self
            .engine
            .recommend(graph, &known.ids, top_k.or(self.config.top_k))
            .context("Failed to compute recommendations")?;
        Ok(RecommendationResult { known, recommendations })
    }

    /// Write `graph.json` (and the CSV tables when asked) into `dir`
    pub fn write_artifacts(&self, output: &PipelineOutput, dir: &Path, csv: bool) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        let path = dir.join("graph.json");
        output
            .document(self.config.include_breakdown)
            .write_json(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        if csv {
            write_csv(&output.graph, dir).context("Failed to write CSV tables")?;
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{CatalogProvider, MovieRecord};

    fn create_test_catalog() -> MovieCatalog {
        MovieCatalog::from_records(vec![
            MovieRecord::new("heat", "Heat")
                .with_year(1995)
                .with_director("Michael Mann")
                .with_genres(["Crime", "Drama"])
                .with_cast(["Al Pacino", "Robert De Niro"]),
            MovieRecord::new("thief", "Thief")
                .with_year(1981)
                .with_director("Michael Mann")
                .with_genres(["Crime", "Drama"])
                .with_cast(["James Caan"]),
            MovieRecord::new("up", "Up").with_year(2009).with_genres(["Animation"]),
        ])
    }

    fn orchestrator(threshold: f64) -> PipelineOrchestrator {
        PipelineOrchestrator::new(PipelineConfig::with_threshold(threshold)).unwrap()
    }

    #[test]
    fn test_orchestrator_construction() {
        assert!(PipelineOrchestrator::new(PipelineConfig::with_threshold(0.3)).is_ok());
        assert!(PipelineOrchestrator::new(PipelineConfig::with_threshold(-1.0)).is_err());
    }

    #[test]
    fn test_run_keeps_every_node() {
        let output = orchestrator(0.5).run(create_test_catalog()).unwrap();
        assert_eq!(output.complete_stats.edges, 3);
        assert_eq!(output.graph.node_count(), 3);
        // heat-thief: director .4 + genre .2 = .6, the other pairs stay under .5
        assert_eq!(output.graph.edge_count(), 1);
        assert_eq!(output.layout.len(), 3);
    }

    #[test]
    fn test_run_rejects_duplicate_ids() {
        let mut records = create_test_catalog().into_records();
        records.push(MovieRecord::new("heat", "Heat again"));
        let err = orchestrator(0.5)
            .run(MovieCatalog::from_records(records))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("heat"));
    }

    #[test]
    fn test_recommend_resolves_titles() {
        let o = orchestrator(0.5);
        let output = o.run(create_test_catalog()).unwrap();
        let result = o.recommend(&output.graph, &["HEAT", "Casablanca"], None).unwrap();

        assert_eq!(result.known.unresolved, vec!["Casablanca".to_string()]);
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].movie_id, "thief");
    }

    #[test]
    fn test_enrich_respects_toggle() {
        let provider = CatalogProvider::new(MovieCatalog::from_records(vec![MovieRecord::new(
            "collateral",
            "Collateral",
        )
        .with_director("Michael Mann")]));

        let mut catalog = create_test_catalog();
        let o = orchestrator(0.5);
        assert!(o.enrich(&mut catalog, &provider).unwrap().is_none());
        assert_eq!(catalog.len(), 3);

        let mut config = PipelineConfig::with_threshold(0.5);
        config.enrichment.enabled = true;
        let o = PipelineOrchestrator::new(config).unwrap();
        let report = o.enrich(&mut catalog, &provider).unwrap().unwrap();
        assert_eq!(report.total_added(), 1);
        assert!(catalog.contains("collateral"));
    }

    #[test]
    fn test_write_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let o = orchestrator(0.5);
        let output = o.run(create_test_catalog()).unwrap();

        let path = o.write_artifacts(&output, &dir.path().join("out"), true).unwrap();
        assert!(path.exists());
        assert!(dir.path().join("out/nodes.csv").exists());
        assert!(dir.path().join("out/edges.csv").exists());
    }
}
