use std::cmp::Reverse;

use log::debug;
use rand::{seq::SliceRandom, Rng};

use super::RankView;
use crate::types::{Error, FxIndexMap, FxIndexSet, Result, Vertex};

/// The vertex-ordering strategies of the `-o` flag.
///
/// The ordering only drives the branching order of the search; correctness
/// never depends on the choice.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OrderingStrategy {
    /// A uniform shuffle.
    #[default]
    Random,
    /// By number of incident hyperedges, ascending.
    MinDegree,
    /// Greedy minimum-fill elimination order of the 2-section.
    MinFill,
    /// By vertex id.
    Natural,
    /// Iterative k-core peeling order.
    Degeneracy,
    /// By number of incident hyperedges, descending.
    MaxDegree,
}

impl OrderingStrategy {
    /// Maps the `-o<i>` flag value to a strategy.
    pub fn from_flag(flag: u8) -> Result<Self> {
        match flag {
            0 => Ok(Self::Random),
            1 => Ok(Self::MinDegree),
            2 => Ok(Self::MinFill),
            3 => Ok(Self::Natural),
            4 => Ok(Self::Degeneracy),
            5 => Ok(Self::MaxDegree),
            _ => Err(Error::IllegalArgument(format!("unknown ordering {flag}"))),
        }
    }

    /// The display name used by the run summary.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::MinDegree => "min-degree",
            Self::MinFill => "min-fill",
            Self::Natural => "natural",
            Self::Degeneracy => "degeneracy",
            Self::MaxDegree => "max-degree",
        }
    }
}

/// A total order on a vertex subset, stable within one rank search.
///
/// Comparisons go through a position table so that ordering candidate sets
/// is a plain `sort_by_key`.
#[derive(Clone, Debug)]
pub struct VertexOrdering {
    position: FxIndexMap<Vertex, usize>,
}

impl VertexOrdering {
    /// Computes the ordering of `vertices` (sorted by id) for the given
    /// sub-hypergraph.
    pub fn compute<R: Rng>(
        strategy: OrderingStrategy,
        view: &RankView,
        vertices: &[Vertex],
        rng: &mut R,
    ) -> Self {
        let sequence = match strategy {
            OrderingStrategy::Random => {
                let mut seq = vertices.to_vec();
                seq.shuffle(rng);
                seq
            }
            OrderingStrategy::Natural => vertices.to_vec(),
            OrderingStrategy::MinDegree => {
                let mut seq = vertices.to_vec();
                seq.sort_by_key(|&v| (view.degree(v), v));
                seq
            }
            OrderingStrategy::MaxDegree => {
                let mut seq = vertices.to_vec();
                seq.sort_by_key(|&v| (Reverse(view.degree(v)), v));
                seq
            }
            OrderingStrategy::MinFill => min_fill_order(view, vertices),
            OrderingStrategy::Degeneracy => degeneracy_order(view, vertices),
        };

        Self::from_sequence(&sequence)
    }

    /// Builds the position table of an explicit sequence.
    pub fn from_sequence(sequence: &[Vertex]) -> Self {
        let position = sequence.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        Self { position }
    }

    /// The rank of `v` in the sequence; vertices outside the ordering sort
    /// last.
    pub fn position_of(&self, v: Vertex) -> usize {
        self.position.get(&v).copied().unwrap_or(usize::MAX)
    }

    /// Sorts a candidate set into the branching order.
    pub fn sort(&self, vertices: &mut [Vertex]) {
        vertices.sort_by_key(|&v| self.position_of(v));
    }

    /// The number of ordered vertices.
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// Whether the ordering is empty.
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }
}

/// 2-section adjacency of `vertices`, restricted to `vertices`.
fn adjacency(view: &RankView, vertices: &[Vertex]) -> Vec<Vec<usize>> {
    let index: FxIndexMap<Vertex, usize> =
        vertices.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); vertices.len()];
    for (i, &v) in vertices.iter().enumerate() {
        for u in view.neighbors(v) {
            if let Some(&j) = index.get(&u) {
                adj[i].push(j);
            }
        }
    }
    adj
}

/// Iterative k-core peeling with a degree-bucket queue.
///
/// For k = 1, 2, ... every vertex whose remaining degree drops below k is
/// appended to the sequence, decrementing its neighbours. Stale bucket
/// entries are skipped on pop, so the whole peel is O(V + E).
fn degeneracy_order(view: &RankView, vertices: &[Vertex]) -> Vec<Vertex> {
    let n = vertices.len();
    let adj = adjacency(view, vertices);
    let mut degree: Vec<usize> = adj.iter().map(Vec::len).collect();

    let max_degree = degree.iter().copied().max().unwrap_or(0);
    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); max_degree + 1];
    for (i, &d) in degree.iter().enumerate() {
        buckets[d].push(i);
    }

    let mut placed = vec![false; n];
    let mut sequence = Vec::with_capacity(n);
    let mut remaining = n;
    let mut degeneracy = 0;
    let mut k = 1;

    while remaining > 0 {
        let mut removed_at_k = false;
        loop {
            let mut removed = false;
            for d in 0..k.min(buckets.len()) {
                while let Some(i) = buckets[d].pop() {
                    if placed[i] || degree[i] != d {
                        continue;
                    }
                    placed[i] = true;
                    remaining -= 1;
                    removed = true;
                    sequence.push(vertices[i]);
                    for &j in &adj[i] {
                        if !placed[j] {
                            degree[j] -= 1;
                            buckets[degree[j]].push(j);
                        }
                    }
                }
            }
            removed_at_k |= removed;
            if !removed {
                break;
            }
        }
        if removed_at_k {
            degeneracy = k - 1;
        }
        k += 1;
    }

    debug!("degeneracy order computed, degeneracy {}", degeneracy);
    sequence
}

/// Greedy minimum-fill elimination order of the 2-section.
///
/// Repeatedly eliminates the vertex whose remaining neighbourhood misses the
/// fewest edges (ties by vertex id), adding the fill-in before moving on.
fn min_fill_order(view: &RankView, vertices: &[Vertex]) -> Vec<Vertex> {
    let n = vertices.len();
    let adj = adjacency(view, vertices);
    let mut adj: Vec<FxIndexSet<usize>> = adj
        .into_iter()
        .map(|row| row.into_iter().collect())
        .collect();

    let mut eliminated = vec![false; n];
    let mut sequence = Vec::with_capacity(n);

    for _ in 0..n {
        let mut best: Option<(usize, usize)> = None;
        for i in 0..n {
            if eliminated[i] {
                continue;
            }
            let nbrs: Vec<usize> = adj[i]
                .iter()
                .copied()
                .filter(|&j| !eliminated[j])
                .collect();
            let mut fill = 0;
            for a in 0..nbrs.len() {
                for b in (a + 1)..nbrs.len() {
                    if !adj[nbrs[a]].contains(&nbrs[b]) {
                        fill += 1;
                    }
                }
            }
            // `vertices` is id-sorted, so the first minimum is the id tie-break.
            if best.map_or(true, |(f, _)| fill < f) {
                best = Some((fill, i));
            }
        }

        let (_, i) = best.unwrap();
        let nbrs: Vec<usize> = adj[i]
            .iter()
            .copied()
            .filter(|&j| !eliminated[j])
            .collect();
        for a in 0..nbrs.len() {
            for b in (a + 1)..nbrs.len() {
                adj[nbrs[a]].insert(nbrs[b]);
                adj[nbrs[b]].insert(nbrs[a]);
            }
        }
        eliminated[i] = true;
        sequence.push(vertices[i]);
    }

    sequence
}
