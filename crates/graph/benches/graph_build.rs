//! Benchmarks for graph construction and layout
//!
//! Run with: cargo bench --package graph
//!
//! Uses a synthetic catalog so the numbers don't depend on a scraped cache.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::MovieRecord;
use graph::{ForceLayout, GraphBuilder, GraphFilter, LayoutConfig, ScorerConfig, SimilarityScorer, Threshold};

const DIRECTORS: [&str; 7] = ["Mann", "Scott", "Fincher", "Nolan", "Bigelow", "Coppola", "Lynch"];
const GENRES: [&str; 6] = ["Crime", "Drama", "Thriller", "Action", "Sci-Fi", "Mystery"];

fn synthetic_movies(n: usize) -> Vec<MovieRecord> {
    (0..n)
        .map(|i| {
            MovieRecord::new(format!("m{:04}", i), format!("Movie {}", i))
                .with_year(1970 + (i % 50) as u16)
                .with_director(DIRECTORS[i % DIRECTORS.len()])
                .with_genres([GENRES[i % GENRES.len()], GENRES[(i / 3) % GENRES.len()]])
                .with_cast((0..5).map(|k| format!("Actor {}", (i * 7 + k * 13) % 120)))
        })
        .collect()
}

fn builder() -> GraphBuilder {
    GraphBuilder::new(SimilarityScorer::new(ScorerConfig::default()).unwrap())
}

fn bench_build_complete_graph(c: &mut Criterion) {
    let movies = synthetic_movies(500);
    let builder = builder();

    c.bench_function("build_complete_graph_500", |b| {
        b.iter(|| {
            let graph = builder.build(black_box(&movies));
            black_box(graph)
        })
    });
}

fn bench_filter_and_layout(c: &mut Criterion) {
    let complete = builder().build(&synthetic_movies(200));
    let filter = GraphFilter::new(Threshold::new(0.4).unwrap());
    let layout = ForceLayout::new(LayoutConfig::default()).unwrap();

    c.bench_function("filter_and_layout_200", |b| {
        b.iter(|| {
            let filtered = filter.apply(black_box(&complete));
            black_box(layout.compute(&filtered))
        })
    });
}

criterion_group!(benches, bench_build_complete_graph, bench_filter_and_layout);
criterion_main!(benches);
