//! Descriptive statistics of hypergraphs and clique sets.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::{
    graphs::Hypergraph,
    search::CliqueResult,
    types::Vertex,
    utils::binom,
};

/// Edge density of one rank: the contained fraction of all possible
/// rank-k hyperedges over the rank's vertex set.
#[derive(Clone, Debug, Serialize)]
pub struct RankDensity {
    /// Vertices touched by rank-k hyperedges.
    pub nbnodes: usize,
    /// Number of rank-k hyperedges.
    pub nbedges: usize,
    /// The rank k.
    pub rank: usize,
    /// `nbedges / C(nbnodes, k)`.
    pub density: f64,
}

/// Arity and degree statistics of a hypergraph; rank-1 edges are ignored.
#[derive(Clone, Debug, Serialize)]
pub struct HypergraphStats {
    /// Number of vertices.
    pub nbnodes: usize,
    /// Number of hyperedges.
    pub nbedges: usize,
    /// Largest hyperedge size.
    pub maxrank: usize,
    /// Hyperedges per vertex.
    #[serde(rename = "avgEdge")]
    pub avg_edges_per_node: f64,
    /// Mean hyperedge size.
    #[serde(rename = "avgArity")]
    pub avg_arity: f64,
    /// Standard deviation of the hyperedge sizes.
    #[serde(rename = "stdArity")]
    pub std_arity: f64,
    /// Mean vertex degree.
    #[serde(rename = "avgDegree")]
    pub avg_degree: f64,
    /// Standard deviation of the vertex degrees.
    #[serde(rename = "stdDegree")]
    pub std_degree: f64,
    /// Per-rank densities.
    pub densities: Vec<RankDensity>,
}

impl HypergraphStats {
    /// Computes the statistics of a catalogue.
    pub fn collect(graph: &Hypergraph) -> Self {
        let nbnodes = graph.vertex_count();
        let nbedges = graph.edge_count();

        let mut degrees: BTreeMap<Vertex, usize> = BTreeMap::new();
        let mut rank_vertices: BTreeMap<usize, BTreeSet<Vertex>> = BTreeMap::new();
        let mut rank_edges: BTreeMap<usize, usize> = BTreeMap::new();
        let mut sum_arities = 0u64;
        let mut sum_arities_sq = 0u64;

        for (_, vertices) in graph.edges() {
            let arity = vertices.len();
            if arity <= 1 {
                continue;
            }
            *rank_edges.entry(arity).or_insert(0) += 1;
            rank_vertices
                .entry(arity)
                .or_default()
                .extend(vertices.iter().copied());
            sum_arities += arity as u64;
            sum_arities_sq += (arity * arity) as u64;
            for &v in vertices {
                *degrees.entry(v).or_insert(0) += 1;
            }
        }

        let mean = |sum: u64, count: usize| {
            if count == 0 {
                0.0
            } else {
                sum as f64 / count as f64
            }
        };
        let deviation = |sum_sq: f64, count: usize, mean: f64| {
            if count == 0 {
                0.0
            } else {
                (sum_sq / count as f64 - mean * mean).max(0.0).sqrt()
            }
        };

        let avg_arity = mean(sum_arities, nbedges);
        let std_arity = deviation(sum_arities_sq as f64, nbedges, avg_arity);
        let avg_degree = mean(sum_arities, nbnodes);
        let sum_degrees_sq: f64 = degrees.values().map(|&d| (d * d) as f64).sum();
        let std_degree = deviation(sum_degrees_sq, nbnodes, avg_degree);
        let avg_edges_per_node = mean(nbedges as u64, nbnodes);

        let densities = rank_vertices
            .into_iter()
            .map(|(rank, vertices)| {
                let nbedges = rank_edges[&rank];
                let all = binom(vertices.len() as u64, rank as u64);
                let density = if all == 0 {
                    0.0
                } else {
                    nbedges as f64 / all as f64
                };
                RankDensity {
                    nbnodes: vertices.len(),
                    nbedges,
                    rank,
                    density,
                }
            })
            .collect();

        Self {
            nbnodes,
            nbedges,
            maxrank: graph.max_rank(),
            avg_edges_per_node,
            avg_arity,
            std_arity,
            avg_degree,
            std_degree,
            densities,
        }
    }
}

impl fmt::Display for HypergraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{} ({}),{} ({})",
            self.nbnodes,
            self.nbedges,
            self.avg_edges_per_node,
            self.avg_arity,
            self.std_arity,
            self.avg_degree,
            self.std_degree
        )?;
        for d in &self.densities {
            write!(f, ",{},{},{},{}", d.nbnodes, d.nbedges, d.rank, d.density)?;
        }
        Ok(())
    }
}

/// Per-vertex membership counts over a set of cliques.
#[derive(Clone, Debug, Default)]
pub struct CliqueStats {
    occurrences: BTreeMap<Vertex, usize>,
}

impl CliqueStats {
    /// Counts, for every vertex, the cliques containing it.
    pub fn new<'a, I>(cliques: I) -> Self
    where
        I: IntoIterator<Item = &'a CliqueResult>,
    {
        let mut occurrences: BTreeMap<Vertex, usize> = BTreeMap::new();
        for clique in cliques {
            for &v in &clique.vertices {
                *occurrences.entry(v).or_insert(0) += 1;
            }
        }
        Self { occurrences }
    }

    /// The number of cliques containing `v`.
    pub fn occurrences_of(&self, v: Vertex) -> usize {
        self.occurrences.get(&v).copied().unwrap_or(0)
    }
}

impl fmt::Display for CliqueStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "c | how many times a vertex appears in a clique:")?;
        write!(f, "c | {{ ")?;
        for (i, (v, n)) in self.occurrences.iter().enumerate() {
            write!(f, "({v}: {n}) ")?;
            if (i + 1) % 10 == 0 {
                write!(f, "\nc |   ")?;
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_arity_and_degree_moments() {
        let graph = Hypergraph::new(
            4,
            vec![
                (1, vec![1, 2, 3]),
                (2, vec![2, 3, 4]),
                (3, vec![1, 2]),
                (4, vec![4]),
            ],
        )
        .unwrap();
        let stats = HypergraphStats::collect(&graph);

        // The unit edge counts towards nbedges but not towards the moments.
        assert_eq!(stats.nbnodes, 4);
        assert_eq!(stats.nbedges, 4);
        assert_eq!(stats.maxrank, 3);
        assert!((stats.avg_arity - 2.0).abs() < 1e-9);
        assert_eq!(stats.densities.len(), 2);
        assert_eq!(stats.densities[0].rank, 2);
        assert!((stats.densities[0].density - 1.0).abs() < 1e-9);
        assert_eq!(stats.densities[1].nbnodes, 4);
        assert!((stats.densities[1].density - 0.5).abs() < 1e-9);
    }

    #[test]
    fn clique_membership_counts() {
        let cliques = vec![
            CliqueResult {
                vertices: vec![1, 2, 3],
                rank: 3,
                edges: vec![],
            },
            CliqueResult {
                vertices: vec![2, 3, 4],
                rank: 3,
                edges: vec![],
            },
        ];
        let stats = CliqueStats::new(&cliques);
        assert_eq!(stats.occurrences_of(2), 2);
        assert_eq!(stats.occurrences_of(1), 1);
        assert_eq!(stats.occurrences_of(5), 0);
    }
}
