use std::collections::BTreeSet;
use std::time::Instant;

use log::debug;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;

use super::{Algorithm, CliqueSearch, Interrupt, Mode, NodeFilter, SearchOptions};
use crate::{
    graphs::{Hypergraph, RankView, VertexOrdering},
    types::{EdgeId, Vertex},
};

/// A discovered hyperclique, with the rank it was found at and the ids of
/// its constituent hyperedges.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CliqueResult {
    /// The sorted vertex set of the clique.
    pub vertices: Vec<Vertex>,
    /// The rank of the search that found it.
    pub rank: usize,
    /// The catalogue hyperedges contained in the clique.
    pub edges: Vec<EdgeId>,
}

/// Counters and results of one rank search.
#[derive(Clone, Debug, Serialize)]
pub struct RankSummary {
    /// Vertices of the rank view before pre-filtering.
    pub nbnodes: usize,
    /// Hyperedges of the rank view before pre-filtering.
    pub nbedges: usize,
    /// Cliques recorded at this rank.
    pub nbcliques: usize,
    /// The rank k.
    pub rank: usize,
    /// Wall-clock seconds spent on this rank.
    pub time: f64,
    /// Recursive calls of the engine at this rank.
    pub nbcalls: u64,
    /// The recorded cliques.
    #[serde(skip)]
    pub cliques: Vec<CliqueResult>,
}

/// The aggregate outcome of one enumeration run.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// Per-rank summaries, from the maximum rank down to 2.
    pub ranks: Vec<RankSummary>,
    /// Total recursive calls across all ranks.
    pub total_calls: u64,
    /// Whether the run was cancelled by the timeout.
    pub timed_out: bool,
    /// Wall-clock seconds of the whole run.
    pub total_time: f64,
}

impl RunReport {
    /// The number of cliques recorded across all ranks.
    pub fn total_cliques(&self) -> usize {
        self.ranks.iter().map(|r| r.cliques.len()).sum()
    }

    /// Iterates over every recorded clique.
    pub fn all_cliques(&self) -> impl Iterator<Item = &CliqueResult> {
        self.ranks.iter().flat_map(|r| r.cliques.iter())
    }
}

/// Runs one search per call: for each rank k from the maximum down to 2 it
/// restricts the hypergraph, pre-filters the vertex set, builds the ordering
/// and invokes the selected engine, honouring the interrupt token.
pub struct Driver<'a> {
    graph: &'a Hypergraph,
    options: SearchOptions,
    interrupt: Interrupt,
    rng: Xoshiro256PlusPlus,
}

impl<'a> Driver<'a> {
    /// Creates a driver for one run over `graph`.
    pub fn new(graph: &'a Hypergraph, options: SearchOptions, interrupt: Interrupt) -> Self {
        let rng = match options.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        Self {
            graph,
            options,
            interrupt,
            rng,
        }
    }

    /// Runs the selected engine and aggregates the per-rank results.
    pub fn enumerate(&mut self, algorithm: Algorithm) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport::default();

        match algorithm {
            Algorithm::NonUniform => self.enumerate_non_uniform(&mut report),
            _ => self.enumerate_uniform(algorithm, &mut report),
        }

        report.timed_out = self.interrupt.is_set();
        report.total_time = started.elapsed().as_secs_f64();
        report
    }

    fn enumerate_uniform(&mut self, algorithm: Algorithm, report: &mut RunReport) {
        for k in (2..=self.graph.max_rank()).rev() {
            if self.interrupt.is_set() {
                break;
            }

            let mut view = self.graph.rank_view(k);
            let nbnodes = view.vertex_count();
            let nbedges = view.edge_count();
            if nbedges == 0 {
                continue;
            }
            let rank_started = Instant::now();

            let mut survivors = view.vertices().to_vec();
            let mut cliques: BTreeSet<Vec<Vertex>> = BTreeSet::new();
            let mut best: Vec<Vertex> = Vec::new();
            let mut calls = 0;

            match self.options.node_filter {
                NodeFilter::None => {}
                NodeFilter::Degree => {
                    Self::filter_by_degree(&mut view, &mut survivors, &mut cliques);
                }
                NodeFilter::CoOccurrence => {
                    Self::filter_by_cooccurrence(&mut view, &mut survivors, &mut cliques);
                }
                NodeFilter::Both => {
                    Self::filter_by_degree(&mut view, &mut survivors, &mut cliques);
                    Self::filter_by_cooccurrence(&mut view, &mut survivors, &mut cliques);
                }
            }

            if view.edge_count() <= k {
                // Each remaining hyperedge is itself a hyperclique of order k.
                let remaining: Vec<EdgeId> = view.active_edges().collect();
                for id in remaining {
                    cliques.insert(view.edge_vertices(id).to_vec());
                }
            } else {
                let ordering = VertexOrdering::compute(
                    self.options.ordering,
                    &view,
                    &survivors,
                    &mut self.rng,
                );
                let mut search = CliqueSearch::new(
                    &mut view,
                    self.graph.bloom(),
                    self.graph.vertex_count(),
                    &ordering,
                    self.options.filter,
                    self.options.mode,
                    &self.interrupt,
                );
                search.cliques = std::mem::take(&mut cliques);

                match algorithm {
                    Algorithm::Hbk => {
                        search.find_hypercliques(Vec::new(), survivors.clone(), Vec::new());
                    }
                    Algorithm::Hybrid => {
                        search.find_cliques_hybrid(Vec::new(), survivors.clone(), Vec::new());
                    }
                    Algorithm::CeHbk => search.run_ce_hbk(survivors.clone()),
                    Algorithm::NonUniform => unreachable!("handled by enumerate_non_uniform"),
                }

                calls = search.calls;
                best = std::mem::take(&mut search.best);
                cliques = std::mem::take(&mut search.cliques);
            }

            let time = rank_started.elapsed().as_secs_f64();
            report.total_calls += calls;

            let graph = self.graph;
            let rank_cliques =
                self.record(cliques, &mut best, k, |vertices| graph.edges_within(vertices, k));
            debug!(
                "rank {k}: {nbnodes} vertices, {nbedges} edges, {} cliques, {calls} calls",
                rank_cliques.len()
            );
            report.ranks.push(RankSummary {
                nbnodes,
                nbedges,
                nbcliques: rank_cliques.len(),
                rank: k,
                time,
                nbcalls: calls,
                cliques: rank_cliques,
            });
        }
    }

    fn enumerate_non_uniform(&mut self, report: &mut RunReport) {
        let mut view = self.graph.full_view();
        let nbnodes = view.vertex_count();
        let nbedges = view.edge_count();
        if nbedges == 0 {
            return;
        }
        let rank = view.rank();
        let rank_started = Instant::now();

        let survivors = view.vertices().to_vec();
        let ordering =
            VertexOrdering::compute(self.options.ordering, &view, &survivors, &mut self.rng);

        let (calls, cliques, mut best) = {
            let mut search = CliqueSearch::new(
                &mut view,
                self.graph.bloom(),
                self.graph.vertex_count(),
                &ordering,
                self.options.filter,
                self.options.mode,
                &self.interrupt,
            );
            search.find_non_uniform_cliques(Vec::new(), survivors, Vec::new());
            (search.calls, search.cliques, search.best)
        };

        let time = rank_started.elapsed().as_secs_f64();
        report.total_calls += calls;

        let rank_cliques =
            self.record(cliques, &mut best, rank, |vertices| view.edges_within(vertices));
        report.ranks.push(RankSummary {
            nbnodes,
            nbedges,
            nbcliques: rank_cliques.len(),
            rank,
            time,
            nbcalls: calls,
            cliques: rank_cliques,
        });
    }

    /// Turns the accumulated clique set into the recorded results; in
    /// `findMax` mode only a size-maximum clique survives.
    fn record<F>(
        &self,
        cliques: BTreeSet<Vec<Vertex>>,
        best: &mut Vec<Vertex>,
        rank: usize,
        edges_of: F,
    ) -> Vec<CliqueResult>
    where
        F: Fn(&[Vertex]) -> Vec<EdgeId>,
    {
        match self.options.mode {
            Mode::FindAll => cliques
                .into_iter()
                .map(|vertices| {
                    let edges = edges_of(&vertices);
                    CliqueResult {
                        vertices,
                        rank,
                        edges,
                    }
                })
                .collect(),
            Mode::FindMax => {
                for clique in &cliques {
                    if clique.len() > best.len() {
                        *best = clique.clone();
                    }
                }
                if best.is_empty() {
                    Vec::new()
                } else {
                    let edges = edges_of(best);
                    vec![CliqueResult {
                        vertices: best.clone(),
                        rank,
                        edges,
                    }]
                }
            }
        }
    }

    /// Drops every vertex whose rank-k degree stays below k, recording the
    /// incident hyperedges as trivial cliques.
    fn filter_by_degree(
        view: &mut RankView,
        survivors: &mut Vec<Vertex>,
        cliques: &mut BTreeSet<Vec<Vertex>>,
    ) {
        let k = view.rank();
        let mut queue = survivors.clone();
        queue.sort_by_key(|&v| (view.degree(v), v));

        for v in queue {
            if view.degree(v) < k {
                Self::remove_vertex(view, survivors, v, cliques);
            }
        }
    }

    /// Drops every vertex lacking k neighbours that each share at least k-1
    /// hyperedges with it.
    fn filter_by_cooccurrence(
        view: &mut RankView,
        survivors: &mut Vec<Vertex>,
        cliques: &mut BTreeSet<Vec<Vertex>>,
    ) {
        let k = view.rank();
        let mut queue = survivors.clone();
        queue.sort_by_key(|&v| (view.degree(v), v));

        for v in queue {
            if view.degree(v) < k {
                Self::remove_vertex(view, survivors, v, cliques);
                continue;
            }

            let neighbours = view.neighbors(v);
            if neighbours.len() < k {
                Self::remove_vertex(view, survivors, v, cliques);
                continue;
            }

            let mut v_edges = view.hyperedges_of(v);
            v_edges.sort_unstable();
            let mut shared: Vec<usize> = neighbours
                .iter()
                .map(|&u| {
                    let mut u_edges = view.hyperedges_of(u);
                    u_edges.sort_unstable();
                    iter_set::intersection(v_edges.iter(), u_edges.iter()).count()
                })
                .collect();
            shared.sort_unstable();

            // The k-th largest co-occurrence count decides.
            if shared[shared.len() - k] < k - 1 {
                Self::remove_vertex(view, survivors, v, cliques);
            }
        }
    }

    fn remove_vertex(
        view: &mut RankView,
        survivors: &mut Vec<Vertex>,
        v: Vertex,
        cliques: &mut BTreeSet<Vec<Vertex>>,
    ) {
        for id in view.hyperedges_of(v) {
            cliques.insert(view.edge_vertices(id).to_vec());
            view.deactivate_edge(id);
        }
        if let Ok(i) = survivors.binary_search(&v) {
            survivors.remove(i);
        }
    }
}
