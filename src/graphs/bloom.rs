use std::collections::BTreeMap;

use crate::types::{FxIndexMap, Vertex};

/// A 128-bit vertex-set fingerprint.
///
/// Bit `(v - 1) % 128` is set for every vertex `v` of the set, so two
/// vertices congruent modulo 128 share a bit. Fingerprints therefore only
/// support *superset* reasoning: `fp(A) ⊆ fp(B)` whenever `A ⊆ B`, while the
/// converse may fail once vertex ids exceed 128.
pub type Fingerprint = u128;

/// Computes the fingerprint of a vertex set.
pub fn fingerprint(vertices: &[Vertex]) -> Fingerprint {
    vertices
        .iter()
        .fold(0, |f, &v| f | 1u128 << ((v - 1) % 128))
}

/// Compact per-rank summary of the hyperedge set.
///
/// Stores one fingerprint per hyperedge, bucketed by rank, with
/// multiplicities so that [`count_supersets`](Self::count_supersets) stays an
/// upper bound on the number of contained hyperedges even when distinct
/// edges collide on the same fingerprint.
#[derive(Clone, Debug, Default)]
pub struct BloomSummary {
    buckets: BTreeMap<usize, FxIndexMap<Fingerprint, usize>>,
}

impl BloomSummary {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hyperedge under the bucket of its rank.
    pub fn add(&mut self, edge: &[Vertex]) {
        *self
            .buckets
            .entry(edge.len())
            .or_default()
            .entry(fingerprint(edge))
            .or_insert(0) += 1;
    }

    /// Removes every recorded fingerprint.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Counts the rank-`k` fingerprints contained in the fingerprint of
    /// `vertices`.
    ///
    /// This is an upper bound on the number of rank-`k` hyperedges whose
    /// vertex set is a subset of `vertices`; it is never used to confirm
    /// containment, only to reject or bound.
    pub fn count_supersets(&self, vertices: &[Vertex], k: usize) -> usize {
        let label = fingerprint(vertices);
        self.buckets
            .get(&k)
            .map(|bucket| {
                bucket
                    .iter()
                    .filter(|(&f, _)| f & label == f)
                    .map(|(_, &n)| n)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Checks whether any bucket holds a fingerprint contained in the
    /// fingerprint of `vertices`.
    pub fn contains_subset_of(&self, vertices: &[Vertex]) -> bool {
        let label = fingerprint(vertices);
        self.buckets
            .values()
            .any(|bucket| bucket.keys().any(|&f| f & label == f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::is_subset;

    #[test]
    fn fingerprints_wrap_modulo_128() {
        assert_eq!(fingerprint(&[1]), 1);
        assert_eq!(fingerprint(&[129]), 1);
        assert_eq!(fingerprint(&[128]), 1 << 127);
        assert_eq!(fingerprint(&[1, 2, 3]), 0b111);
    }

    #[test]
    fn superset_count_bounds_contained_edges() {
        let edges: Vec<Vec<Vertex>> = vec![
            vec![1, 2, 3],
            vec![1, 2, 4],
            vec![2, 3, 4],
            vec![1, 2],
            vec![5, 130], // 130 collides with 2
        ];
        let mut summary = BloomSummary::new();
        for e in &edges {
            summary.add(e);
        }

        let queries: Vec<Vec<Vertex>> = vec![
            vec![1, 2, 3],
            vec![1, 2, 3, 4],
            vec![2, 3, 4, 5],
            vec![1, 2],
            vec![2, 5],
        ];
        for q in &queries {
            for k in 1..=4 {
                let exact = edges
                    .iter()
                    .filter(|e| e.len() == k && is_subset(e, q))
                    .count();
                assert!(summary.count_supersets(q, k) >= exact);
            }
        }
    }

    #[test]
    fn subset_query_spans_all_ranks() {
        let mut summary = BloomSummary::new();
        summary.add(&[1, 2, 3]);
        summary.add(&[7, 8]);

        assert!(summary.contains_subset_of(&[1, 2, 3, 4]));
        assert!(summary.contains_subset_of(&[7, 8]));
        assert!(!summary.contains_subset_of(&[4, 5, 6]));
    }
}
