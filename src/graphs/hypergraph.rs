use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::BloomSummary;
use crate::{
    types::{EdgeId, Error, FxIndexMap, FxIndexSet, Result, Vertex},
    utils::{binom, is_subset},
};

/// The immutable hyperedge catalogue built once at parse time.
///
/// Hyperedges are keyed by their external id and indexed by rank. Vertices
/// are the integers `1..=n`; every stored vertex list is sorted and
/// duplicate-free. Searches never mutate the catalogue: they operate on
/// per-rank [`RankView`]s layered on top of it.
#[derive(Clone, Debug)]
pub struct Hypergraph {
    edges: FxIndexMap<EdgeId, Vec<Vertex>>,
    by_rank: BTreeMap<usize, Vec<EdgeId>>,
    n_vertices: usize,
    max_rank: usize,
    bloom: BloomSummary,
}

impl Hypergraph {
    /// Builds a hypergraph over the vertices `1..=n_vertices` from a list of
    /// `(external id, vertex list)` pairs.
    ///
    /// Vertex lists are sorted and de-duplicated; empty hyperedges are
    /// discarded. Fails if two hyperedges share an external id or a vertex
    /// falls outside `[1, n_vertices]`.
    pub fn new<I>(n_vertices: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (EdgeId, Vec<Vertex>)>,
    {
        let mut catalogue: FxIndexMap<EdgeId, Vec<Vertex>> = FxIndexMap::default();
        let mut by_rank: BTreeMap<usize, Vec<EdgeId>> = BTreeMap::new();
        let mut bloom = BloomSummary::new();
        let mut max_rank = 0;

        for (id, mut vertices) in edges {
            vertices.sort_unstable();
            vertices.dedup();
            if vertices.is_empty() {
                continue;
            }
            if vertices[0] < 1 || vertices[vertices.len() - 1] > n_vertices {
                return Err(Error::IllegalArgument(format!(
                    "hyperedge {id} has a vertex outside [1, {n_vertices}]"
                )));
            }
            if catalogue.contains_key(&id) {
                return Err(Error::IllegalArgument(format!(
                    "duplicate hyperedge id {id}"
                )));
            }
            max_rank = max_rank.max(vertices.len());
            by_rank.entry(vertices.len()).or_default().push(id);
            bloom.add(&vertices);
            catalogue.insert(id, vertices);
        }

        debug!(
            "catalogue: {} vertices, {} hyperedges, max rank {}",
            n_vertices,
            catalogue.len(),
            max_rank
        );

        Ok(Self {
            edges: catalogue,
            by_rank,
            n_vertices,
            max_rank,
            bloom,
        })
    }

    /// The number of vertices, i.e. the `N` of the vertex range `[1, N]`.
    pub fn vertex_count(&self) -> usize {
        self.n_vertices
    }

    /// The number of hyperedges in the catalogue.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The largest hyperedge size, 0 for an empty catalogue.
    pub fn max_rank(&self) -> usize {
        self.max_rank
    }

    /// Iterates over all `(id, vertex list)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &[Vertex])> {
        self.edges.iter().map(|(&id, vs)| (id, vs.as_slice()))
    }

    /// The sorted vertex list of a hyperedge, if the id exists.
    pub fn edge(&self, id: EdgeId) -> Option<&[Vertex]> {
        self.edges.get(&id).map(Vec::as_slice)
    }

    /// The ids of all hyperedges of rank exactly `k`.
    pub fn edges_of_rank(&self, k: usize) -> &[EdgeId] {
        self.by_rank.get(&k).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The ids of the rank-`k` hyperedges whose vertex set is contained in
    /// the sorted slice `vertices`.
    pub fn edges_within(&self, vertices: &[Vertex], k: usize) -> Vec<EdgeId> {
        self.edges_of_rank(k)
            .iter()
            .copied()
            .filter(|id| is_subset(&self.edges[id], vertices))
            .collect()
    }

    /// The rank-1 hyperedges as `(id, literal)` pairs.
    pub fn unit_edges(&self) -> Vec<(EdgeId, Vertex)> {
        self.edges_of_rank(1)
            .iter()
            .map(|id| (*id, self.edges[id][0]))
            .collect()
    }

    /// The Bloom summary of the catalogue.
    pub fn bloom(&self) -> &BloomSummary {
        &self.bloom
    }

    /// Builds the view restricted to the hyperedges of rank exactly `k`.
    pub fn rank_view(&self, k: usize) -> RankView {
        let edges = self
            .edges_of_rank(k)
            .iter()
            .map(|id| (*id, self.edges[id].clone()))
            .collect();
        RankView::new(k, edges)
    }

    /// Builds the view over the whole catalogue, used by the non-uniform
    /// search with `k` set to the maximum rank.
    pub fn full_view(&self) -> RankView {
        let edges = self
            .edges
            .iter()
            .map(|(&id, vs)| (id, vs.clone()))
            .collect();
        RankView::new(self.max_rank, edges)
    }
}

/// A sub-hypergraph the search engines run on.
///
/// The view keeps its own slice of the edge catalogue plus an *active* id
/// set. Restriction (CE-HBK verification, node pre-filters) only touches the
/// active set, so restoring a previous edge set is a pointer swap and the
/// catalogue slice itself stays immutable.
#[derive(Clone, Debug)]
pub struct RankView {
    rank: usize,
    edges: FxIndexMap<EdgeId, Vec<Vertex>>,
    active: FxIndexSet<EdgeId>,
    incidence: FxIndexMap<Vertex, Vec<EdgeId>>,
    vertices: Vec<Vertex>,
}

impl RankView {
    fn new(rank: usize, edges: FxIndexMap<EdgeId, Vec<Vertex>>) -> Self {
        let mut incidence: FxIndexMap<Vertex, Vec<EdgeId>> = FxIndexMap::default();
        let mut vertex_set: BTreeSet<Vertex> = BTreeSet::new();
        for (&id, vs) in &edges {
            for &v in vs {
                incidence.entry(v).or_default().push(id);
                vertex_set.insert(v);
            }
        }
        let active = edges.keys().copied().collect();

        Self {
            rank,
            edges,
            active,
            incidence,
            vertices: vertex_set.into_iter().collect(),
        }
    }

    /// The rank `k` the uniform clique test uses.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// The sorted vertices incident to at least one edge of the view.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The number of vertices of the view.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The number of active hyperedges.
    pub fn edge_count(&self) -> usize {
        self.active.len()
    }

    /// Whether the hyperedge is currently active.
    pub fn is_active(&self, id: EdgeId) -> bool {
        self.active.contains(&id)
    }

    /// Iterates over the active hyperedge ids.
    pub fn active_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.active.iter().copied()
    }

    /// The sorted vertex list of a hyperedge of the view, active or not.
    ///
    /// # Panics
    ///
    /// * If the id does not belong to the view.
    pub fn edge_vertices(&self, id: EdgeId) -> &[Vertex] {
        &self.edges[&id]
    }

    /// The ids of the active hyperedges containing `v`.
    pub fn hyperedges_of(&self, v: Vertex) -> Vec<EdgeId> {
        self.incidence
            .get(&v)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|id| self.active.contains(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The number of active hyperedges containing `v`.
    pub fn degree(&self, v: Vertex) -> usize {
        self.incidence
            .get(&v)
            .map(|ids| ids.iter().filter(|id| self.active.contains(*id)).count())
            .unwrap_or(0)
    }

    /// The sorted vertices sharing at least one active hyperedge with `v`,
    /// excluding `v` itself.
    pub fn neighbors(&self, v: Vertex) -> Vec<Vertex> {
        let mut result: BTreeSet<Vertex> = BTreeSet::new();
        if let Some(ids) = self.incidence.get(&v) {
            for id in ids {
                if self.active.contains(id) {
                    result.extend(self.edges[id].iter().copied());
                }
            }
        }
        result.remove(&v);
        result.into_iter().collect()
    }

    /// Whether `u` and `v` share at least one active hyperedge.
    pub fn are_neighbours(&self, u: Vertex, v: Vertex) -> bool {
        if u == v {
            return false;
        }
        self.incidence
            .get(&v)
            .map(|ids| {
                ids.iter().any(|id| {
                    self.active.contains(id) && self.edges[id].binary_search(&u).is_ok()
                })
            })
            .unwrap_or(false)
    }

    /// Whether `v` shares at least one active hyperedge with *every* vertex
    /// of `clique`.
    pub fn is_neighbour(&self, clique: &[Vertex], v: Vertex) -> bool {
        clique.iter().all(|&u| self.are_neighbours(u, v))
    }

    /// The sorted ids of the active hyperedges whose vertex set is contained
    /// in the sorted slice `vertices`.
    pub fn edges_within(&self, vertices: &[Vertex]) -> Vec<EdgeId> {
        let mut seen: FxIndexSet<EdgeId> = FxIndexSet::default();
        let mut result = Vec::new();
        for &v in vertices {
            if let Some(ids) = self.incidence.get(&v) {
                for &id in ids {
                    if seen.insert(id)
                        && self.active.contains(&id)
                        && is_subset(&self.edges[&id], vertices)
                    {
                        result.push(id);
                    }
                }
            }
        }
        result.sort_unstable();
        result
    }

    /// Same as [`edges_within`](Self::edges_within), limited to the given
    /// ids.
    pub fn edges_within_restricted(&self, vertices: &[Vertex], ids: &[EdgeId]) -> Vec<EdgeId> {
        ids.iter()
            .copied()
            .filter(|id| {
                self.active.contains(id)
                    && self
                        .edges
                        .get(id)
                        .is_some_and(|e| is_subset(e, vertices))
            })
            .collect()
    }

    /// Whether every `rank`-subset of the sorted slice `vertices` is an
    /// active hyperedge, i.e. `|edgesWithin(S)| == C(|S|, rank)`.
    ///
    /// For `|S| < rank` both sides are zero and the test is vacuously true;
    /// the hybrid engine relies on this to extend partial cliques.
    pub fn is_hyperclique(&self, vertices: &[Vertex]) -> bool {
        binom(vertices.len() as u64, self.rank as u64) == self.edges_within(vertices).len() as u64
    }

    /// The non-uniform hyperclique test.
    ///
    /// The active hyperedges contained in `S` are reduced by dropping rank-1
    /// edges and any edge strictly contained in another kept edge (iterated
    /// to a fixed point). With `M` the largest kept size, `S` qualifies when
    /// at most one edge remains or
    /// `C(|S|, M) <= sum over kept e of C(|S| - |e|, M - |e|)`.
    pub fn is_non_uniform_clique(&self, vertices: &[Vertex]) -> bool {
        let ids = self.edges_within(vertices);
        let mut kept: Vec<&[Vertex]> = ids
            .iter()
            .map(|id| self.edges[id].as_slice())
            .filter(|e| e.len() > 1)
            .collect();

        loop {
            let reduced: Vec<&[Vertex]> = kept
                .iter()
                .copied()
                .filter(|e| !kept.iter().any(|f| f.len() > e.len() && is_subset(e, f)))
                .collect();
            if reduced.len() == kept.len() {
                break;
            }
            kept = reduced;
        }

        if kept.len() <= 1 {
            return true;
        }

        let s = vertices.len() as u64;
        let m = kept.iter().map(|e| e.len() as u64).max().unwrap();
        let nb: u64 = kept
            .iter()
            .map(|e| binom(s - e.len() as u64, m - e.len() as u64))
            .sum();

        binom(s, m) <= nb
    }

    /// Deactivates a hyperedge, returning whether it was active.
    pub fn deactivate_edge(&mut self, id: EdgeId) -> bool {
        self.active.swap_remove(&id)
    }

    /// Replaces the active edge set, returning the previous one.
    ///
    /// Restriction and restoration during CE-HBK verification are both this
    /// single swap, so the caller can restore the saved set on every exit
    /// path.
    pub fn replace_active(&mut self, active: FxIndexSet<EdgeId>) -> FxIndexSet<EdgeId> {
        std::mem::replace(&mut self.active, active)
    }

    /// A copy of the current active edge set.
    pub fn active_set(&self) -> FxIndexSet<EdgeId> {
        self.active.clone()
    }
}
