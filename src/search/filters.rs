use std::collections::BTreeSet;

use itertools::Itertools;

use super::engine::{with_vertex, CliqueSearch};
use crate::{
    types::{Error, Result, Vertex},
    utils::binom,
};

/// The candidate-pruning strategies of the `-f` flag.
///
/// Filters refine the candidate set that descends into a child call; they
/// never add vertices, so any of them preserves the enumerated clique set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CandidateFilter {
    /// No pruning.
    #[default]
    None,
    /// Fingerprint superset counting; only safe up to 128 vertices.
    Bloom,
    /// Ordinary Bron-Kerbosch on the clique expansion.
    CliqueExpansion,
    /// Intersection with the branched vertex's neighbourhood.
    Neighbourhood,
    /// Rank-aware filter keyed on the current clique size.
    Incremental,
}

impl CandidateFilter {
    /// Maps the `-f<i>` flag value to a filter.
    pub fn from_flag(flag: u8) -> Result<Self> {
        match flag {
            0 => Ok(Self::None),
            1 => Ok(Self::Bloom),
            2 => Ok(Self::CliqueExpansion),
            3 => Ok(Self::Neighbourhood),
            4 => Ok(Self::Incremental),
            _ => Err(Error::IllegalArgument(format!("unknown filter {flag}"))),
        }
    }

    /// The display name used by the run summary.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "OFF",
            Self::Bloom => "Bloom",
            Self::CliqueExpansion => "Clique",
            Self::Neighbourhood => "Neighbourhood",
            Self::Incremental => "Incremental",
        }
    }
}

impl CliqueSearch<'_> {
    /// Applies the selected candidate filter to `suburbs` in place.
    ///
    /// Returns `true` when the refined set descends as-is into the child
    /// call; otherwise the caller still intersects it with the clique
    /// neighbourhood of R u {v}.
    pub(crate) fn refine_candidates(
        &mut self,
        clique: &[Vertex],
        next_clique: &[Vertex],
        branched: Vertex,
        suburbs: &mut Vec<Vertex>,
    ) -> bool {
        match self.filter {
            CandidateFilter::None => false,
            CandidateFilter::Bloom => {
                // Beyond 128 vertices distinct edges can collide on one
                // fingerprint and the bound may prune valid candidates, so
                // the filter silently stands down.
                if self.total_vertices <= 128 {
                    self.bloom_refine(next_clique, suburbs);
                    true
                } else {
                    false
                }
            }
            CandidateFilter::CliqueExpansion => {
                self.expansion_refine(next_clique, suburbs);
                false
            }
            CandidateFilter::Neighbourhood => {
                let neighbours = self.view.neighbors(branched);
                *suburbs = iter_set::intersection(
                    suburbs.iter().copied(),
                    neighbours.iter().copied(),
                )
                .collect();
                false
            }
            CandidateFilter::Incremental => {
                self.incremental_refine(clique, branched, suburbs);
                true
            }
        }
    }

    /// The clique neighbourhood of R within `suburbs`: the vertices u with
    /// `isNeighbour(R, u)` and `|edgesWithin(R u {u})| >= C(|R| + 1, k)`.
    pub(crate) fn clique_neighbourhood(&self, clique: &[Vertex], suburbs: &[Vertex]) -> Vec<Vertex> {
        let required = binom(clique.len() as u64 + 1, self.view.rank() as u64);
        suburbs
            .iter()
            .copied()
            .filter(|&u| {
                self.view.is_neighbour(clique, u) && {
                    let with_u = with_vertex(clique, u);
                    self.view.edges_within(&with_u).len() as u64 >= required
                }
            })
            .collect()
    }

    /// The non-uniform analogue of the clique neighbourhood.
    pub(crate) fn non_uniform_neighbourhood(
        &self,
        clique: &[Vertex],
        suburbs: &[Vertex],
    ) -> Vec<Vertex> {
        suburbs
            .iter()
            .copied()
            .filter(|&u| {
                self.view.is_neighbour(clique, u)
                    && self.view.is_non_uniform_clique(&with_vertex(clique, u))
            })
            .collect()
    }

    /// Keeps u when the Bloom summary still allows every k-subset of
    /// R u {v, u} to be an edge.
    fn bloom_refine(&self, next_clique: &[Vertex], suburbs: &mut Vec<Vertex>) {
        let rank = self.view.rank();
        let required = binom(next_clique.len() as u64 + 1, rank as u64);
        suburbs.retain(|&u| {
            self.view.is_neighbour(next_clique, u) && {
                let with_u = with_vertex(next_clique, u);
                self.bloom.count_supersets(&with_u, rank) as u64 >= required
            }
        });
    }

    /// Intersects `suburbs` with the vertices covered by the maximal cliques
    /// of the clique expansion of R u {v} u suburbs.
    fn expansion_refine(&mut self, next_clique: &[Vertex], suburbs: &mut Vec<Vertex>) {
        let all: Vec<Vertex> =
            iter_set::union(next_clique.iter().copied(), suburbs.iter().copied()).collect();
        let contained = self.view.edges_within(&all);

        let mut seed: BTreeSet<Vertex> = BTreeSet::new();
        for &id in &contained {
            seed.extend(self.view.edge_vertices(id).iter().copied());
        }

        // The sub-enumeration is scratch work: neither its cliques nor its
        // call count belong to the surrounding search.
        let saved_cliques = std::mem::take(&mut self.cliques);
        let saved_calls = self.calls;
        self.find_cliques(Vec::new(), seed.into_iter().collect(), Vec::new());

        let mut covered: BTreeSet<Vertex> = BTreeSet::new();
        for clique in &self.cliques {
            covered.extend(clique.iter().copied());
        }
        let covered: Vec<Vertex> = covered.into_iter().collect();
        *suburbs =
            iter_set::intersection(suburbs.iter().copied(), covered.iter().copied()).collect();

        self.cliques = saved_cliques;
        self.calls = saved_calls;
    }

    /// The rank-aware incremental filter, keyed on |R|.
    fn incremental_refine(&mut self, clique: &[Vertex], branched: Vertex, suburbs: &mut Vec<Vertex>) {
        let rank = self.view.rank();

        if clique.is_empty() {
            let neighbours = self.view.neighbors(branched);
            *suburbs =
                iter_set::intersection(suburbs.iter().copied(), neighbours.iter().copied())
                    .collect();
        } else if clique.len() < rank - 2 {
            let with_branched = with_vertex(clique, branched);
            *suburbs = self.clique_neighbourhood(&with_branched, suburbs);
        } else if clique.len() + suburbs.len() + 1 == rank {
            // Exactly one k-set is reachable: either it is an edge or the
            // branch is dead.
            let all: Vec<Vertex> = with_vertex(
                &iter_set::union(clique.iter().copied(), suburbs.iter().copied())
                    .collect::<Vec<_>>(),
                branched,
            );
            if self.view.edges_within(&all).is_empty() {
                suburbs.clear();
            }
        } else {
            let subsets: Vec<Vec<Vertex>> = clique
                .iter()
                .copied()
                .combinations(rank - 2)
                .collect();
            suburbs.retain(|&u| {
                subsets.iter().all(|t| {
                    let mut probe = t.clone();
                    probe.push(branched);
                    probe.push(u);
                    probe.sort_unstable();
                    !self.view.edges_within(&probe).is_empty()
                })
            });
        }
    }
}
