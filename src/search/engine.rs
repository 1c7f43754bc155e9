use std::collections::BTreeSet;

use log::{debug, trace};

use super::{CandidateFilter, Interrupt, Mode};
use crate::{
    graphs::{BloomSummary, RankView, VertexOrdering},
    types::{EdgeId, FxIndexSet, Vertex},
    utils::{binom, is_subset},
};

/// Inserts `v` into a sorted vertex set, as a merge pass.
pub(crate) fn with_vertex(set: &[Vertex], v: Vertex) -> Vec<Vertex> {
    iter_set::union(set.iter().copied(), std::iter::once(v)).collect()
}

/// One Bron-Kerbosch search over a rank view.
///
/// The triple (R = current clique, P = candidates, X = excluded) is kept as
/// id-sorted vectors; the branching order is applied per node through the
/// vertex ordering. The engine owns the per-rank accumulator, the best-clique
/// tracker of `findMax` mode and the recursion-call counter.
pub(crate) struct CliqueSearch<'a> {
    pub view: &'a mut RankView,
    pub bloom: &'a BloomSummary,
    /// Catalogue vertex count, gating the Bloom filter.
    pub total_vertices: usize,
    pub ordering: &'a VertexOrdering,
    pub filter: CandidateFilter,
    pub mode: Mode,
    pub interrupt: &'a Interrupt,
    pub cliques: BTreeSet<Vec<Vertex>>,
    pub best: Vec<Vertex>,
    pub calls: u64,
}

impl<'a> CliqueSearch<'a> {
    pub(crate) fn new(
        view: &'a mut RankView,
        bloom: &'a BloomSummary,
        total_vertices: usize,
        ordering: &'a VertexOrdering,
        filter: CandidateFilter,
        mode: Mode,
        interrupt: &'a Interrupt,
    ) -> Self {
        Self {
            view,
            bloom,
            total_vertices,
            ordering,
            filter,
            mode,
            interrupt,
            cliques: BTreeSet::new(),
            best: Vec::new(),
            calls: 0,
        }
    }

    fn trace_state(&self, clique: &[Vertex], candidates: &[Vertex], excluded: &[Vertex]) {
        trace!(
            "clique ({}) = {:?}, candidates ({}) = {:?}, excluded ({}) = {:?}",
            clique.len(),
            clique,
            candidates.len(),
            candidates,
            excluded.len(),
            excluded
        );
    }

    fn clique_found(&mut self, clique: &[Vertex]) {
        trace!("clique found: {:?}", clique);
        if self.mode == Mode::FindMax {
            if self.best.len() < clique.len() {
                self.best = clique.to_vec();
            }
            return;
        }
        self.cliques.insert(clique.to_vec());
    }

    /// Hyperclique Bron-Kerbosch (the `-a` engine).
    ///
    /// A branch only descends while the live vertices can still reach a
    /// clique of size k; a node emits R when both P and X are exhausted.
    pub(crate) fn find_hypercliques(
        &mut self,
        clique: Vec<Vertex>,
        mut candidates: Vec<Vertex>,
        mut excluded: Vec<Vertex>,
    ) {
        debug_assert!(clique.is_sorted() && candidates.is_sorted() && excluded.is_sorted());
        self.calls += 1;
        if self.interrupt.is_set() {
            return;
        }
        self.trace_state(&clique, &candidates, &excluded);
        if clique.len() + candidates.len() < self.view.rank() {
            return;
        }
        if candidates.is_empty() && excluded.is_empty() {
            self.clique_found(&clique);
        }

        let mut order = candidates.clone();
        self.ordering.sort(&mut order);

        for &v in &order {
            if self.interrupt.is_set() {
                return;
            }
            let next_clique = with_vertex(&clique, v);
            let mut suburbs: Vec<Vertex> = iter_set::union(
                candidates.iter().copied().filter(|&u| u != v),
                excluded.iter().copied(),
            )
            .collect();

            let passthrough = self.refine_candidates(&clique, &next_clique, v, &mut suburbs);
            let neighbourhood = if passthrough {
                suburbs
            } else {
                self.clique_neighbourhood(&next_clique, &suburbs)
            };

            let viable = match self.mode {
                Mode::FindMax => self.best.len() < next_clique.len() + neighbourhood.len(),
                Mode::FindAll => self.view.rank() <= next_clique.len() + neighbourhood.len(),
            };
            if viable {
                let next_candidates = iter_set::intersection(
                    candidates.iter().copied(),
                    neighbourhood.iter().copied(),
                )
                .collect();
                let next_excluded = iter_set::intersection(
                    excluded.iter().copied(),
                    neighbourhood.iter().copied(),
                )
                .collect();
                self.find_hypercliques(next_clique, next_candidates, next_excluded);
            }

            candidates.remove(candidates.binary_search(&v).unwrap());
            excluded.insert(excluded.binary_search(&v).unwrap_err(), v);
        }
    }

    /// Plain Bron-Kerbosch on the 2-section of the view.
    ///
    /// Used on the clique expansion: its results over-approximate the
    /// hyperclique set and are classified afterwards.
    pub(crate) fn find_cliques(
        &mut self,
        clique: Vec<Vertex>,
        mut candidates: Vec<Vertex>,
        mut excluded: Vec<Vertex>,
    ) {
        self.calls += 1;
        if self.interrupt.is_set() {
            return;
        }
        if clique.len() + candidates.len() < self.view.rank() {
            return;
        }
        if candidates.is_empty() && excluded.is_empty() {
            self.cliques.insert(clique.clone());
        }

        let mut order = candidates.clone();
        self.ordering.sort(&mut order);

        for &v in &order {
            if self.interrupt.is_set() {
                return;
            }
            let neighbours = self.view.neighbors(v);
            let next_candidates = iter_set::intersection(
                candidates.iter().copied(),
                neighbours.iter().copied(),
            )
            .collect();
            let next_excluded =
                iter_set::intersection(excluded.iter().copied(), neighbours.iter().copied())
                    .collect();
            self.find_cliques(with_vertex(&clique, v), next_candidates, next_excluded);

            candidates.remove(candidates.binary_search(&v).unwrap());
            excluded.insert(excluded.binary_search(&v).unwrap_err(), v);
        }
    }

    /// Hybrid Bron-Kerbosch (the `-b` engine).
    ///
    /// Descends into a branch only when R u {v} already is a hyperclique,
    /// and emits R once no excluded vertex extends it.
    pub(crate) fn find_cliques_hybrid(
        &mut self,
        clique: Vec<Vertex>,
        mut candidates: Vec<Vertex>,
        mut excluded: Vec<Vertex>,
    ) {
        self.calls += 1;
        self.trace_state(&clique, &candidates, &excluded);
        if clique.len() + candidates.len() < self.view.rank() {
            return;
        }

        if candidates.is_empty()
            && (excluded.is_empty() || self.clique_neighbourhood(&clique, &excluded).is_empty())
        {
            self.clique_found(&clique);
        } else if !self.interrupt.is_set() {
            let mut order = candidates.clone();
            self.ordering.sort(&mut order);

            for &v in &order {
                if self.interrupt.is_set() {
                    return;
                }
                let next_clique = with_vertex(&clique, v);
                if self.view.is_hyperclique(&next_clique) {
                    if self.mode == Mode::FindMax && self.best.len() < next_clique.len() {
                        self.best = next_clique.clone();
                    }

                    let neighbours = self.view.neighbors(v);
                    let viable = match self.mode {
                        Mode::FindMax => self.best.len() < next_clique.len() + neighbours.len(),
                        Mode::FindAll => self.view.rank() <= next_clique.len() + neighbours.len(),
                    };
                    if viable {
                        let next_candidates = iter_set::intersection(
                            candidates.iter().copied(),
                            neighbours.iter().copied(),
                        )
                        .collect();
                        let next_excluded = iter_set::intersection(
                            excluded.iter().copied(),
                            neighbours.iter().copied(),
                        )
                        .collect();
                        self.find_cliques_hybrid(next_clique, next_candidates, next_excluded);
                    }
                }

                candidates.remove(candidates.binary_search(&v).unwrap());
                excluded.insert(excluded.binary_search(&v).unwrap_err(), v);

                if candidates.is_empty()
                    && clique.len() >= self.view.rank()
                    && (excluded.is_empty()
                        || self.clique_neighbourhood(&clique, &excluded).is_empty())
                {
                    self.clique_found(&clique);
                }
            }
        }
    }

    /// Non-uniform hyperclique enumeration (the `-u` engine).
    pub(crate) fn find_non_uniform_cliques(
        &mut self,
        clique: Vec<Vertex>,
        mut candidates: Vec<Vertex>,
        mut excluded: Vec<Vertex>,
    ) {
        self.calls += 1;
        self.trace_state(&clique, &candidates, &excluded);

        if candidates.is_empty()
            && clique.len() > 1
            && (excluded.is_empty()
                || self.non_uniform_neighbourhood(&clique, &excluded).is_empty())
        {
            self.clique_found(&clique);
        } else {
            let mut order = candidates.clone();
            self.ordering.sort(&mut order);

            for &v in &order {
                if self.interrupt.is_set() {
                    return;
                }
                let next_clique = with_vertex(&clique, v);
                if self.view.is_non_uniform_clique(&next_clique) {
                    let neighbours = self.view.neighbors(v);
                    let next_candidates = iter_set::intersection(
                        candidates.iter().copied(),
                        neighbours.iter().copied(),
                    )
                    .collect();
                    let next_excluded = iter_set::intersection(
                        excluded.iter().copied(),
                        neighbours.iter().copied(),
                    )
                    .collect();
                    self.find_non_uniform_cliques(next_clique, next_candidates, next_excluded);
                }

                candidates.remove(candidates.binary_search(&v).unwrap());
                excluded.insert(excluded.binary_search(&v).unwrap_err(), v);

                if candidates.is_empty()
                    && clique.len() > 1
                    && (excluded.is_empty()
                        || self.non_uniform_neighbourhood(&clique, &excluded).is_empty())
                {
                    self.clique_found(&clique);
                }
            }
        }
    }

    /// Clique-expansion enumeration with HBK verification (the `-c` engine).
    ///
    /// Plain Bron-Kerbosch over the expansion yields an over-approximation;
    /// for k > 2 each result is classified by counting its contained edges.
    /// Every pseudo-clique is re-searched with the view restricted to its
    /// own edges, and the active edge set is restored on every exit path.
    pub(crate) fn run_ce_hbk(&mut self, candidates: Vec<Vertex>) {
        if self.view.edge_count() == 0 {
            return;
        }
        let prior = std::mem::take(&mut self.cliques);
        self.find_cliques(Vec::new(), candidates, Vec::new());

        let rank = self.view.rank();
        if rank <= 2 {
            // The expansion of a 2-uniform hypergraph is the hypergraph.
            self.cliques.extend(prior);
            return;
        }

        let mut accepted: BTreeSet<Vec<Vertex>> = prior;
        let mut pseudo: Vec<(Vec<Vertex>, Vec<EdgeId>)> = Vec::new();

        for clique in std::mem::take(&mut self.cliques) {
            if clique.len() < self.best.len() || clique.len() < rank {
                continue;
            }
            let edges = self.view.edges_within(&clique);
            if binom(clique.len() as u64, rank as u64) == edges.len() as u64 {
                if self.mode == Mode::FindMax && self.best.len() < clique.len() {
                    self.best = clique.clone();
                }
                accepted.insert(clique);
            } else {
                pseudo.push((clique, edges));
            }
        }

        if !pseudo.is_empty() {
            debug!("verifying {} pseudo-cliques", pseudo.len());
            for (_, edge_ids) in &pseudo {
                let restricted: FxIndexSet<EdgeId> = edge_ids.iter().copied().collect();
                let saved = self.view.replace_active(restricted);

                let mut seed: BTreeSet<Vertex> = BTreeSet::new();
                for &id in edge_ids {
                    seed.extend(self.view.edge_vertices(id).iter().copied());
                }
                if self.view.edge_count() > 0 {
                    self.find_hypercliques(Vec::new(), seed.into_iter().collect(), Vec::new());
                }

                // The restore must happen before the timeout is looked at.
                self.view.replace_active(saved);
                if self.interrupt.is_set() {
                    break;
                }
            }

            for clique in std::mem::take(&mut self.cliques) {
                if !accepted.iter().any(|c| is_subset(&clique, c)) {
                    if self.mode == Mode::FindMax && self.best.len() < clique.len() {
                        self.best = clique.clone();
                    }
                    accepted.insert(clique);
                }
            }
        }

        self.cliques = accepted;
    }
}
