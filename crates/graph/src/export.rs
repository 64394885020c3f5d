//! Graph document written for the visualization client.
//!
//! The JSON document carries each node's metadata and position next to the
//! weighted edges. The CSV tables hold the same nodes and edges without
//! positions.

use crate::error::Result;
use crate::layout::Layout;
use crate::types::{ScoreBreakdown, SimilarityGraph};
use data_loader::MovieId;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub id: MovieId,
    pub title: String,
    pub year: Option<u16>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub cast: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDocument {
    pub source: MovieId,
    pub target: MovieId,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeDocument>,
    pub edges: Vec<EdgeDocument>,
}

impl GraphDocument {
    /// Assemble the document in node order. Nodes missing from `layout` sit
    /// at the origin.
    pub fn from_graph(graph: &SimilarityGraph, layout: &Layout, include_breakdown: bool) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|movie| {
                let position = layout.get(&movie.id).copied().unwrap_or_default();
                NodeDocument {
                    id: movie.id.clone(),
                    title: movie.title.clone(),
                    year: movie.year,
                    genres: movie.genres.clone(),
                    director: movie.director.clone(),
                    cast: movie.cast.clone(),
                    poster: movie.poster.clone(),
                    x: round_to(position.x, 2),
                    y: round_to(position.y, 2),
                    z: round_to(position.z, 2),
                }
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|edge| EdgeDocument {
                source: edge.source.clone(),
                target: edge.target.clone(),
                weight: round_to(edge.weight, 4),
                breakdown: if include_breakdown {
                    edge.breakdown.map(|b| ScoreBreakdown {
                        actor: round_to(b.actor, 4),
                        director: round_to(b.director, 4),
                        genre: round_to(b.genre, 4),
                        year: round_to(b.year, 4),
                    })
                } else {
                    None
                },
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!(
            "Wrote graph document ({} nodes, {} edges) to {}",
            self.nodes.len(),
            self.edges.len(),
            path.display()
        );
        Ok(())
    }
}

/// Quote a CSV field when it holds a separator, a quote or a line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_nodes_csv<W: Write>(graph: &SimilarityGraph, mut out: W) -> Result<()> {
    writeln!(out, "id,title,year,genres,director,cast,rating,poster")?;
    for movie in graph.nodes() {
        let fields = [
            movie.id.clone(),
            movie.title.clone(),
            movie.year.map(|y| y.to_string()).unwrap_or_default(),
            movie.genres.join("|"),
            movie.director.clone().unwrap_or_default(),
            movie.cast.join("|"),
            movie.rating.map(|r| r.to_string()).unwrap_or_default(),
            movie.poster.clone().unwrap_or_default(),
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        writeln!(out, "{}", line.join(","))?;
    }
    out.flush()?;
    Ok(())
}

fn write_edges_csv<W: Write>(graph: &SimilarityGraph, mut out: W) -> Result<()> {
    writeln!(out, "source,target,weight")?;
    for edge in graph.edges() {
        writeln!(
            out,
            "{},{},{}",
            csv_field(&edge.source),
            csv_field(&edge.target),
            round_to(edge.weight, 4)
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Write `nodes.csv` and `edges.csv` into `dir`
pub fn write_csv(graph: &SimilarityGraph, dir: &Path) -> Result<()> {
    write_nodes_csv(graph, BufWriter::new(File::create(dir.join("nodes.csv"))?))?;
    write_edges_csv(graph, BufWriter::new(File::create(dir.join("edges.csv"))?))?;
    info!("Wrote nodes.csv and edges.csv to {}", dir.display());
    Ok(())
}
