use std::collections::BTreeSet;

use hyperclique::{
    graphs::OrderingStrategy,
    io::PaceParser,
    search::{
        Algorithm, CandidateFilter, Driver, Interrupt, Mode, NodeFilter, SearchOptions,
    },
    utils::binom,
};
use itertools::Itertools;
use rand::{seq::SliceRandom, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

const S1_TRIVIAL: &str = "p hg 3 1\n1 1 2 3\n";
const S2_K4: &str = "p hg 4 4\n1 1 2 3\n2 1 2 4\n3 1 3 4\n4 2 3 4\n";
const S3_MIXED: &str = "p hg 5 5\n1 1 2 3\n2 1 2 4\n3 1 3 4\n4 2 3 4\n5 1 5\n";
const S4_DISJOINT: &str = "p hg 6 2\n1 1 2 3\n2 4 5 6\n";
const S6_NEAR_MISS: &str = "p hg 4 3\n1 1 2 3\n2 1 2 4\n3 1 3 4\n";

fn options(filter: CandidateFilter, ordering: OrderingStrategy) -> SearchOptions {
    SearchOptions {
        filter,
        ordering,
        node_filter: NodeFilter::None,
        mode: Mode::FindAll,
        seed: Some(7),
    }
}

fn enumerate(
    input: &str,
    algorithm: Algorithm,
    options: SearchOptions,
) -> BTreeSet<(usize, Vec<usize>)> {
    let graph = PaceParser::parse_str(input).unwrap();
    let mut driver = Driver::new(&graph, options, Interrupt::new());
    let report = driver.enumerate(algorithm);
    assert!(!report.timed_out);
    report
        .all_cliques()
        .map(|c| (c.rank, c.vertices.clone()))
        .collect()
}

fn expected(pairs: &[(usize, &[usize])]) -> BTreeSet<(usize, Vec<usize>)> {
    pairs.iter().map(|&(k, c)| (k, c.to_vec())).collect()
}

#[test]
fn scenarios_for_every_uniform_engine() {
    let scenarios: Vec<(&str, Vec<(usize, &[usize])>)> = vec![
        (S1_TRIVIAL, vec![(3, &[1, 2, 3])]),
        (S2_K4, vec![(3, &[1, 2, 3, 4])]),
        (S3_MIXED, vec![(3, &[1, 2, 3, 4]), (2, &[1, 5])]),
        (S4_DISJOINT, vec![(3, &[1, 2, 3]), (3, &[4, 5, 6])]),
        (
            S6_NEAR_MISS,
            vec![(3, &[1, 2, 3]), (3, &[1, 2, 4]), (3, &[1, 3, 4])],
        ),
    ];

    for algorithm in [Algorithm::Hbk, Algorithm::Hybrid, Algorithm::CeHbk] {
        for (input, cliques) in &scenarios {
            let found = enumerate(
                input,
                algorithm,
                options(CandidateFilter::None, OrderingStrategy::Natural),
            );
            assert_eq!(found, expected(cliques), "{algorithm:?} on {input:?}");
        }
    }
}

#[test]
fn find_max_reports_one_maximum_clique() {
    let graph = PaceParser::parse_str(S2_K4).unwrap();
    let mut search_options = options(CandidateFilter::None, OrderingStrategy::Natural);
    search_options.mode = Mode::FindMax;

    for algorithm in [Algorithm::Hbk, Algorithm::Hybrid, Algorithm::CeHbk] {
        let mut driver = Driver::new(&graph, search_options, Interrupt::new());
        let report = driver.enumerate(algorithm);
        let cliques: Vec<_> = report.all_cliques().collect();
        assert_eq!(cliques.len(), 1, "{algorithm:?}");
        assert_eq!(cliques[0].vertices, vec![1, 2, 3, 4]);
    }
}

#[test]
fn every_filter_yields_the_same_clique_set() {
    let filters = [
        CandidateFilter::Bloom,
        CandidateFilter::CliqueExpansion,
        CandidateFilter::Neighbourhood,
        CandidateFilter::Incremental,
    ];
    for input in [S1_TRIVIAL, S2_K4, S3_MIXED, S6_NEAR_MISS] {
        let baseline = enumerate(
            input,
            Algorithm::Hbk,
            options(CandidateFilter::None, OrderingStrategy::Natural),
        );
        for filter in filters {
            let found =
                enumerate(input, Algorithm::Hbk, options(filter, OrderingStrategy::Natural));
            assert_eq!(found, baseline, "filter {filter:?} on {input:?}");
        }
    }
}

#[test]
fn the_clique_set_is_ordering_independent() {
    let orderings = [
        OrderingStrategy::Random,
        OrderingStrategy::MinDegree,
        OrderingStrategy::MinFill,
        OrderingStrategy::Natural,
        OrderingStrategy::Degeneracy,
        OrderingStrategy::MaxDegree,
    ];
    let baseline = enumerate(
        S3_MIXED,
        Algorithm::Hbk,
        options(CandidateFilter::None, OrderingStrategy::Natural),
    );
    for ordering in orderings {
        for seed in [1, 99] {
            let mut search_options = options(CandidateFilter::None, ordering);
            search_options.seed = Some(seed);
            let found = enumerate(S3_MIXED, Algorithm::Hbk, search_options);
            assert_eq!(found, baseline, "ordering {ordering:?}");
        }
    }
}

/// Reference enumeration of the maximal rank-k hypercliques by exhaustion.
fn brute_force(n: usize, edges: &[Vec<usize>], k: usize) -> BTreeSet<Vec<usize>> {
    let hypercliques: Vec<Vec<usize>> = (1..=n)
        .combinations(k)
        .chain((1..=n).powerset().filter(|s| s.len() > k))
        .filter(|s| {
            let contained = edges.iter().filter(|e| e.iter().all(|v| s.contains(v))).count();
            contained as u64 == binom(s.len() as u64, k as u64)
        })
        .collect();

    hypercliques
        .iter()
        .filter(|s| {
            !hypercliques
                .iter()
                .any(|t| t.len() > s.len() && s.iter().all(|v| t.contains(v)))
        })
        .cloned()
        .collect()
}

#[test]
fn random_instances_match_brute_force() {
    let n = 7;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    let all_triples: Vec<Vec<usize>> = (1..=n).combinations(3).collect();

    for round in 0..6 {
        let mut triples = all_triples.clone();
        triples.shuffle(&mut rng);
        let edges: Vec<Vec<usize>> = triples.into_iter().take(12 + round).collect();

        let mut input = format!("p hg {n} {}\n", edges.len());
        for (i, e) in edges.iter().enumerate() {
            input.push_str(&format!("{} {} {} {}\n", i + 1, e[0], e[1], e[2]));
        }

        let reference = brute_force(n, &edges, 3);
        for algorithm in [Algorithm::Hbk, Algorithm::Hybrid, Algorithm::CeHbk] {
            for filter in [
                CandidateFilter::None,
                CandidateFilter::Bloom,
                CandidateFilter::Incremental,
            ] {
                let found: BTreeSet<Vec<usize>> =
                    enumerate(&input, algorithm, options(filter, OrderingStrategy::Natural))
                        .into_iter()
                        .filter(|(rank, _)| *rank == 3)
                        .map(|(_, c)| c)
                        .collect();
                assert_eq!(found, reference, "{algorithm:?}/{filter:?} round {round}");
            }
        }
    }
}

#[test]
fn node_prefilters_record_trivial_cliques() {
    // Vertex 5 and 6 cannot reach rank-3 degree 3: their edge survives as a
    // trivial clique while the K4 is still searched.
    let input = "p hg 6 5\n1 1 2 3\n2 1 2 4\n3 1 3 4\n4 2 3 4\n5 1 5 6\n";
    let expected_cliques = expected(&[(3, &[1, 2, 3, 4]), (3, &[1, 5, 6])]);

    for node_filter in [NodeFilter::Degree, NodeFilter::CoOccurrence, NodeFilter::Both] {
        let mut search_options = options(CandidateFilter::None, OrderingStrategy::Natural);
        search_options.node_filter = node_filter;
        let found = enumerate(input, Algorithm::Hbk, search_options);
        assert_eq!(found, expected_cliques, "{node_filter:?}");
    }
}

#[test]
fn non_uniform_search_finds_mixed_rank_cliques() {
    // A single triple: only the full edge is a maximal non-uniform clique.
    let found = enumerate(
        S1_TRIVIAL,
        Algorithm::NonUniform,
        options(CandidateFilter::None, OrderingStrategy::Natural),
    );
    assert_eq!(found, expected(&[(3, &[1, 2, 3])]));

    // A 2-uniform triangle qualifies as a non-uniform clique.
    let triangle = "p hg 3 3\n1 1 2\n2 2 3\n3 1 3\n";
    let found = enumerate(
        triangle,
        Algorithm::NonUniform,
        options(CandidateFilter::None, OrderingStrategy::Natural),
    );
    assert_eq!(found, expected(&[(2, &[1, 2, 3])]));
}

#[test]
fn cli_flag_values_map_to_strategies() {
    for flag in 0..=4 {
        assert!(CandidateFilter::from_flag(flag).is_ok());
    }
    assert!(CandidateFilter::from_flag(5).is_err());
    for flag in 0..=5 {
        assert!(OrderingStrategy::from_flag(flag).is_ok());
    }
    assert!(OrderingStrategy::from_flag(6).is_err());
    for flag in 0..=3 {
        assert!(NodeFilter::from_flag(flag).is_ok());
    }
    assert!(NodeFilter::from_flag(4).is_err());
}

#[test]
fn cancellation_keeps_partial_results_and_reports_timeout() {
    let graph = PaceParser::parse_str(S2_K4).unwrap();
    let interrupt = Interrupt::new();
    interrupt.set();
    let mut driver = Driver::new(
        &graph,
        options(CandidateFilter::None, OrderingStrategy::Natural),
        interrupt,
    );
    let report = driver.enumerate(Algorithm::Hbk);
    assert!(report.timed_out);
    assert_eq!(report.total_cliques(), 0);
}

#[test]
fn reports_carry_rank_level_counters() {
    let graph = PaceParser::parse_str(S3_MIXED).unwrap();
    let mut driver = Driver::new(
        &graph,
        options(CandidateFilter::None, OrderingStrategy::Natural),
        Interrupt::new(),
    );
    let report = driver.enumerate(Algorithm::Hbk);

    assert_eq!(report.ranks.len(), 2);
    let rank3 = &report.ranks[0];
    assert_eq!(rank3.rank, 3);
    assert_eq!(rank3.nbnodes, 4);
    assert_eq!(rank3.nbedges, 4);
    assert_eq!(rank3.nbcliques, 1);
    assert!(rank3.nbcalls > 0);
    let rank2 = &report.ranks[1];
    assert_eq!(rank2.rank, 2);
    assert_eq!(rank2.nbcliques, 1);

    // The clique's constituent hyperedges are reported by external id.
    let clique = &rank3.cliques[0];
    assert_eq!(clique.edges, vec![1, 2, 3, 4]);
}
