//! Candidate and recommendation types.

use data_loader::MovieId;
use serde::Serialize;
use std::cmp::Ordering;

/// A known movie a candidate is connected to, with the edge weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub known_id: MovieId,
    pub weight: f64,
}

/// An unseen movie reached from the known set, before post-processing
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub movie_id: MovieId,
    /// Sum of the weights in `connections`, possibly adjusted by filters
    pub score: f64,
    pub connections: Vec<Connection>,
}

impl Candidate {
    pub fn new(movie_id: impl Into<MovieId>, score: f64) -> Self {
        Self {
            movie_id: movie_id.into(),
            score,
            connections: Vec::new(),
        }
    }

    /// Add an edge to a known movie and its weight to the score
    pub fn connect(&mut self, known_id: impl Into<MovieId>, weight: f64) {
        self.score += weight;
        self.connections.push(Connection {
            known_id: known_id.into(),
            weight,
        });
    }
}

/// Ranking order: score descending, then id ascending
pub fn rank_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.movie_id.cmp(&b.movie_id))
}

/// Final recommendation returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub year: Option<u16>,
    pub score: f64,
    /// Known movies this one is linked to, strongest first
    pub connections: Vec<Connection>,
}

impl Recommendation {
    /// One-line reason, e.g. "linked to Heat (0.59), Ronin (0.31)"
    pub fn explanation(&self, title_of: impl Fn(&str) -> String) -> String {
        let links: Vec<String> = self
            .connections
            .iter()
            .map(|c| format!("{} ({:.2})", title_of(&c.known_id), c.weight))
            .collect();
        format!("linked to {}", links.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_accumulates() {
        let mut candidate = Candidate::new("x", 0.0);
        candidate.connect("a", 0.5);
        candidate.connect("b", 0.25);
        assert_eq!(candidate.score, 0.75);
        assert_eq!(candidate.connections.len(), 2);
    }

    #[test]
    fn test_rank_order_breaks_ties_by_id() {
        let mut candidates = vec![
            Candidate::new("b", 0.5),
            Candidate::new("c", 0.9),
            Candidate::new("a", 0.5),
        ];
        candidates.sort_by(rank_order);
        let ids: Vec<_> = candidates.iter().map(|c| c.movie_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_explanation() {
        let rec = Recommendation {
            movie_id: "x".to_string(),
            title: "X".to_string(),
            year: None,
            score: 0.9,
            connections: vec![
                Connection { known_id: "heat".to_string(), weight: 0.59 },
                Connection { known_id: "ronin".to_string(), weight: 0.31 },
            ],
        };
        let text = rec.explanation(|id| id.to_uppercase());
        assert_eq!(text, "linked to HEAT (0.59), RONIN (0.31)");
    }
}
