use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{load_catalog, CatalogProvider, MovieCatalog};
use graph::GraphStats;
use pipeline::{PipelineConfig, PipelineOrchestrator, PipelineOutput, Recommendation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::warn;

/// film-graph - Movie similarity graph and recommendations
#[derive(Parser)]
#[command(name = "film-graph")]
#[command(about = "Builds a weighted movie similarity graph and recommends by connectivity", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that builds the graph
#[derive(Args)]
struct GraphArgs {
    /// Path to the movie catalog (JSON array or {"films": [...]})
    #[arg(long)]
    catalog: PathBuf,

    /// Minimum edge weight kept, in [0, 1] (overrides the config file)
    #[arg(long)]
    threshold: Option<f64>,

    /// JSON pipeline configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enrich the catalog from this larger cached catalog before building
    #[arg(long)]
    enrich_from: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the filtered graph and write the graph document
    Build {
        #[command(flatten)]
        graph: GraphArgs,

        /// Output directory
        #[arg(long, default_value = "output")]
        out: PathBuf,

        /// Also write nodes.csv and edges.csv
        #[arg(long)]
        csv: bool,

        /// Include per-edge score breakdowns in the document
        #[arg(long)]
        breakdown: bool,
    },

    /// Recommend movies connected to the ones you like
    Recommend {
        #[command(flatten)]
        graph: GraphArgs,

        /// Liked movies, by id or title (repeatable)
        #[arg(long, required = true, num_args = 1..)]
        known: Vec<String>,

        /// Number of recommendations to return
        #[arg(long)]
        top_k: Option<usize>,

        /// Show which liked movies each recommendation is linked to
        #[arg(long)]
        explain: bool,
    },

    /// Search the catalog by title
    Search {
        /// Path to the movie catalog
        #[arg(long)]
        catalog: PathBuf,

        /// Title to search for (case-insensitive)
        #[arg(long)]
        title: String,
    },

    /// Run concurrent recommendation requests to measure latency
    Benchmark {
        #[command(flatten)]
        graph: GraphArgs,

        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of requests in flight at once
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// Seed for picking the known movies of each request
        #[arg(long, default_value = "7")]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            graph,
            out,
            csv,
            breakdown,
        } => handle_build(graph, &out, csv, breakdown)?,
        Commands::Recommend {
            graph,
            known,
            top_k,
            explain,
        } => handle_recommend(graph, &known, top_k, explain)?,
        Commands::Search { catalog, title } => handle_search(&catalog, &title)?,
        Commands::Benchmark {
            graph,
            requests,
            concurrent,
            seed,
        } => handle_benchmark(graph, requests, concurrent, seed).await?,
    }

    Ok(())
}

/// Load the catalog and configuration, then run the graph pipeline
fn run_pipeline(
    args: &GraphArgs,
    tweak: impl FnOnce(&mut PipelineConfig),
) -> Result<(PipelineOrchestrator, PipelineOutput)> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    // Flags override the file
    if args.threshold.is_some() {
        config.threshold = args.threshold;
    }
    if args.enrich_from.is_some() {
        config.enrichment.enabled = true;
    }
    tweak(&mut config);

    let orchestrator = PipelineOrchestrator::new(config)?;

    println!("Loading catalog from {}...", args.catalog.display());
    let start = Instant::now();
    let mut catalog = load_catalog(&args.catalog).context("Failed to load movie catalog")?;
    println!("{} Loaded {} movies in {:?}", "✓".green(), catalog.len(), start.elapsed());

    if let Some(cache_path) = &args.enrich_from {
        let cache = load_catalog(cache_path).context("Failed to load enrichment cache")?;
        let provider = CatalogProvider::new(cache);
        if let Some(report) = orchestrator.enrich(&mut catalog, &provider)? {
            println!(
                "{} Enrichment added {} movies",
                "✓".green(),
                report.total_added()
            );
        }
    }

    let start = Instant::now();
    let output = orchestrator.run(catalog)?;
    println!("{} Built graph in {:?}", "✓".green(), start.elapsed());

    Ok((orchestrator, output))
}

/// Handle the 'build' command
fn handle_build(args: GraphArgs, out: &Path, csv: bool, breakdown: bool) -> Result<()> {
    let (orchestrator, output) = run_pipeline(&args, |config| {
        config.include_breakdown |= breakdown;
    })?;

    print_stats("Complete graph", &output.complete_stats);
    print_stats("Filtered graph", &output.graph.stats());
    println!(
        "Layout: {} iterations{}",
        output.layout.iterations_run,
        if output.layout.converged { " (converged)" } else { "" }
    );

    let path = orchestrator.write_artifacts(&output, out, csv)?;
    println!("{} Wrote {}", "✓".green(), path.display());
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(args: GraphArgs, known: &[String], top_k: Option<usize>, explain: bool) -> Result<()> {
    let (orchestrator, output) = run_pipeline(&args, |_| {})?;

    let result = orchestrator.recommend(&output.graph, known, top_k)?;
    for query in &result.known.unresolved {
        warn!("No movie matches {:?}", query);
    }
    if result.known.is_empty() {
        bail!("None of the known movies are in the catalog");
    }

    let title_of = |id: &str| {
        output
            .graph
            .node(id)
            .map(|m| m.title.clone())
            .unwrap_or_else(|| id.to_string())
    };
    let liked: Vec<String> = result.known.ids.iter().map(|id| title_of(id)).collect();
    println!("{} {}", "Known:".bold(), liked.join(", "));

    print_recommendations(&result.recommendations, explain, title_of);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(catalog_path: &Path, title: &str) -> Result<()> {
    let catalog: MovieCatalog = load_catalog(catalog_path).context("Failed to load movie catalog")?;
    let matches = catalog.search_title(title);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  no match");
    }
    for id in matches.iter().take(20) {
        if let Some(movie) = catalog.get(id) {
            println!(
                "{}: {} ({}) dir. {} [{}]",
                id,
                movie.title,
                movie.year.map(|y| y.to_string()).unwrap_or_else(|| "?".to_string()),
                movie.director.as_deref().unwrap_or("?"),
                movie.genres.join(", ")
            );
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(args: GraphArgs, requests: usize, concurrent: usize, seed: u64) -> Result<()> {
    if requests == 0 || concurrent == 0 {
        bail!("--requests and --concurrent must be positive");
    }

    let (orchestrator, output) = run_pipeline(&args, |_| {})?;
    let orchestrator = Arc::new(orchestrator);
    let output = Arc::new(output);

    let ids: Vec<String> = output.graph.nodes().iter().map(|m| m.id.clone()).collect();
    if ids.is_empty() {
        bail!("The catalog is empty");
    }

    // Each request likes one to three random movies
    let mut rng = StdRng::seed_from_u64(seed);
    let known_sets: Vec<Vec<String>> = (0..requests)
        .map(|_| {
            let n = rng.random_range(1..=3);
            (0..n).map(|_| ids[rng.random_range(0..ids.len())].clone()).collect()
        })
        .collect();

    // Use tokio::spawn to make concurrent requests
    let semaphore = Arc::new(Semaphore::new(concurrent));
    let wall_clock = Instant::now();
    let mut handles = vec![];
    for known in known_sets {
        let orchestrator = orchestrator.clone();
        let output = output.clone();
        let semaphore = semaphore.clone();
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let start = Instant::now();
            // Ranking is CPU-bound
            tokio::task::spawn_blocking(move || orchestrator.recommend(&output.graph, &known, None)).await??;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let wall_time = wall_clock.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / wall_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent);
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_stats(label: &str, stats: &GraphStats) {
    println!(
        "{} {} nodes, {} edges, {} isolated, weights {:.3}..{:.3} (mean {:.3})",
        format!("{}:", label).bold(),
        stats.nodes,
        stats.edges,
        stats.isolated,
        stats.min_weight,
        stats.max_weight,
        stats.mean_weight
    );
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[Recommendation], explain: bool, title_of: impl Fn(&str) -> String) {
    print!("{}", "Movie Recommendations:\n".bold().blue());
    if recommendations.is_empty() {
        println!("  nothing connected above the threshold");
    }
    for (i, rec) in recommendations.iter().enumerate() {
        let year = rec.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        println!(
            "{}. {}{} - Score: {:.3}",
            (i + 1).to_string().green(),
            rec.title,
            year,
            rec.score
        );
        if explain {
            println!("   {}", rec.explanation(&title_of));
        }
    }
}
