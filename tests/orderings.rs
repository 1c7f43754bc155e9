use hyperclique::graphs::{Hypergraph, OrderingStrategy, VertexOrdering};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn path_graph() -> Hypergraph {
    // 1 - 2 - 3 - 4 as rank-2 edges.
    Hypergraph::new(
        4,
        vec![(1, vec![1, 2]), (2, vec![2, 3]), (3, vec![3, 4])],
    )
    .unwrap()
}

fn star_graph() -> Hypergraph {
    Hypergraph::new(
        5,
        vec![
            (1, vec![1, 2]),
            (2, vec![1, 3]),
            (3, vec![1, 4]),
            (4, vec![1, 5]),
        ],
    )
    .unwrap()
}

fn is_permutation(ordering: &VertexOrdering, vertices: &[usize]) -> bool {
    let mut positions: Vec<usize> = vertices.iter().map(|&v| ordering.position_of(v)).collect();
    positions.sort_unstable();
    positions == (0..vertices.len()).collect::<Vec<_>>()
}

#[test]
fn every_strategy_produces_a_permutation() {
    let graph = path_graph();
    let view = graph.rank_view(2);
    let vertices = view.vertices().to_vec();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);

    for strategy in [
        OrderingStrategy::Random,
        OrderingStrategy::MinDegree,
        OrderingStrategy::MinFill,
        OrderingStrategy::Natural,
        OrderingStrategy::Degeneracy,
        OrderingStrategy::MaxDegree,
    ] {
        let ordering = VertexOrdering::compute(strategy, &view, &vertices, &mut rng);
        assert_eq!(ordering.len(), vertices.len());
        assert!(is_permutation(&ordering, &vertices), "{strategy:?}");
    }
}

#[test]
fn natural_ordering_is_the_identity() {
    let graph = path_graph();
    let view = graph.rank_view(2);
    let vertices = view.vertices().to_vec();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);

    let ordering =
        VertexOrdering::compute(OrderingStrategy::Natural, &view, &vertices, &mut rng);
    for (i, &v) in vertices.iter().enumerate() {
        assert_eq!(ordering.position_of(v), i);
    }
}

#[test]
fn degree_orderings_sort_by_incident_edges() {
    let graph = star_graph();
    let view = graph.rank_view(2);
    let vertices = view.vertices().to_vec();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);

    let min = VertexOrdering::compute(OrderingStrategy::MinDegree, &view, &vertices, &mut rng);
    // The centre has degree 4 and comes last; leaves tie-break by id.
    assert_eq!(min.position_of(1), 4);
    assert_eq!(min.position_of(2), 0);
    assert_eq!(min.position_of(5), 3);

    let max = VertexOrdering::compute(OrderingStrategy::MaxDegree, &view, &vertices, &mut rng);
    assert_eq!(max.position_of(1), 0);
    assert_eq!(max.position_of(2), 1);
}

#[test]
fn degeneracy_ordering_peels_low_degree_vertices_first() {
    let graph = star_graph();
    let view = graph.rank_view(2);
    let vertices = view.vertices().to_vec();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);

    let ordering =
        VertexOrdering::compute(OrderingStrategy::Degeneracy, &view, &vertices, &mut rng);
    assert!(is_permutation(&ordering, &vertices));
    // Every leaf peels before the centre.
    for leaf in 2..=5 {
        assert!(ordering.position_of(leaf) < ordering.position_of(1));
    }
}

#[test]
fn random_ordering_is_reproducible_for_a_seed() {
    let graph = path_graph();
    let view = graph.rank_view(2);
    let vertices = view.vertices().to_vec();

    let mut rng_a = Xoshiro256PlusPlus::seed_from_u64(11);
    let mut rng_b = Xoshiro256PlusPlus::seed_from_u64(11);
    let a = VertexOrdering::compute(OrderingStrategy::Random, &view, &vertices, &mut rng_a);
    let b = VertexOrdering::compute(OrderingStrategy::Random, &view, &vertices, &mut rng_b);

    for &v in &vertices {
        assert_eq!(a.position_of(v), b.position_of(v));
    }
}

#[test]
fn sorting_follows_the_sequence_and_unknown_vertices_sink() {
    let ordering = VertexOrdering::from_sequence(&[3, 1, 2]);
    let mut vertices = vec![1, 2, 3, 9];
    ordering.sort(&mut vertices);
    assert_eq!(vertices, vec![3, 1, 2, 9]);
    assert_eq!(ordering.position_of(9), usize::MAX);
}
