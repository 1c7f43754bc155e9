use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::LevelFilter;
use serde_json::json;

use hyperclique::{
    constraints::CardinalityConstraint,
    graphs::{Hypergraph, OrderingStrategy},
    io::PaceParser,
    search::{
        Algorithm, CandidateFilter, Driver, Interrupt, Mode, NodeFilter, RunReport, SearchOptions,
    },
    stats::{CliqueStats, HypergraphStats},
    types::{FxIndexMap, Result},
};

#[derive(Parser, Debug)]
#[command(
    name = "hyperclique",
    about = "Enumerates maximal hypercliques of PACE hypergraphs"
)]
struct Cli {
    /// Prints the cliques found.
    #[arg(short = 'd')]
    debug: bool,
    /// Prints the cliques found and the corresponding hyperedges.
    #[arg(short = 'l')]
    print_edges: bool,
    /// Disables the per-rank summary of the cliques found.
    #[arg(short = 'p')]
    quiet: bool,
    /// Very verbose mode.
    #[arg(short = 'v')]
    verbose: bool,
    /// Prints the output in JSON format.
    #[arg(short = 'j')]
    json: bool,
    /// Uses the Hyper Bron-Kerbosch algorithm.
    #[arg(short = 'a')]
    hbk: bool,
    /// Uses the hybrid Bron-Kerbosch algorithm.
    #[arg(short = 'b')]
    hybrid: bool,
    /// Uses the hybrid CE-HBK algorithm.
    #[arg(short = 'c')]
    ce_hbk: bool,
    /// Searches hypercliques of the non-uniform hypergraph.
    #[arg(short = 'u')]
    non_uniform: bool,
    /// Prints statistics: `-sh` on the hypergraph (skips the search), `-sc`
    /// on the cliques found.
    #[arg(short = 's', value_parser = ["h", "c"], action = clap::ArgAction::Append)]
    stats: Vec<String>,
    /// Timeout in seconds for each algorithm.
    #[arg(short = 't')]
    timeout: Option<f64>,
    /// Searches a size-maximum hyperclique instead of enumerating.
    #[arg(short = 'x')]
    find_max: bool,
    /// Transforms the cliques into cardinality constraints.
    #[arg(short = 'm')]
    cardinality: bool,
    /// Candidate filter: 0 none, 1 Bloom, 2 clique, 3 neighbourhood,
    /// 4 incremental.
    #[arg(short = 'f', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=4))]
    filter: u8,
    /// Vertex ordering: 0 random, 1 min-degree, 2 min-fill, 3 natural,
    /// 4 degeneracy, 5 max-degree.
    #[arg(short = 'o', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=5))]
    ordering: u8,
    /// Node pre-filter: 0 none, 1 degree, 2 co-occurrences, 3 both.
    #[arg(short = 'n', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    node_filter: u8,
    /// Input file, or directory of input files; stdin when absent.
    #[arg(short = 'i')]
    input: Option<PathBuf>,
}

impl Cli {
    fn stats_hypergraph(&self) -> bool {
        self.stats.iter().any(|s| s == "h")
    }

    fn stats_cliques(&self) -> bool {
        self.stats.iter().any(|s| s == "c")
    }

    fn algorithms(&self) -> Vec<Algorithm> {
        let selected = [
            (self.hbk, Algorithm::Hbk),
            (self.hybrid, Algorithm::Hybrid),
            (self.ce_hbk, Algorithm::CeHbk),
            (self.non_uniform, Algorithm::NonUniform),
        ];
        selected
            .into_iter()
            .filter_map(|(on, alg)| on.then_some(alg))
            .collect()
    }

    fn options(&self) -> Result<SearchOptions> {
        Ok(SearchOptions {
            filter: CandidateFilter::from_flag(self.filter)?,
            ordering: OrderingStrategy::from_flag(self.ordering)?,
            node_filter: NodeFilter::from_flag(self.node_filter)?,
            mode: if self.find_max {
                Mode::FindMax
            } else {
                Mode::FindAll
            },
            seed: None,
        })
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let options = match cli.options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    print_banner(&cli);

    match cli.input.clone() {
        Some(path) if path.is_dir() => {
            let mut files: Vec<PathBuf> = match fs::read_dir(&path) {
                Ok(entries) => entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.is_file())
                    .collect(),
                Err(e) => {
                    eprintln!("cannot read directory {}: {e}", path.display());
                    return;
                }
            };
            files.sort();
            for file in files {
                run_file(&cli, options, &file);
            }
        }
        Some(path) => run_file(&cli, options, &path),
        None => {
            let mut content = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut content) {
                eprintln!("cannot read stdin: {e}");
                return;
            }
            run_input(&cli, options, None, &content);
        }
    }
}

fn run_file(cli: &Cli, options: SearchOptions, path: &Path) {
    if !cli.json && !cli.stats_hypergraph() {
        println!("c | * {}", path.display());
    }
    match fs::read_to_string(path) {
        Ok(content) => run_input(cli, options, Some(path), &content),
        Err(e) => {
            if cli.json {
                println!(
                    "{}",
                    json!({"bench": path.display().to_string(), "err": "fileNotFound"})
                );
            } else {
                eprintln!("c | * {}: {e}", path.display());
            }
        }
    }
}

/// Parses one input and runs every selected algorithm over it. A malformed
/// input aborts this run only; batch processing continues.
fn run_input(cli: &Cli, options: SearchOptions, bench: Option<&Path>, content: &str) {
    let parse_started = Instant::now();
    let graph = match PaceParser::parse_str(content) {
        Ok(graph) => graph,
        Err(e) => {
            if cli.json {
                println!("{}", json!({"err": e.to_string()}));
            } else {
                eprintln!("c | {e}");
            }
            return;
        }
    };
    let parsing_time = parse_started.elapsed().as_secs_f64();

    if cli.stats_hypergraph() {
        let stats = HypergraphStats::collect(&graph);
        if cli.json {
            let mut value = serde_json::to_value(&stats).expect("stats serialize");
            if let Some(b) = bench {
                value["bench"] = json!(b.display().to_string());
            }
            println!("{value}");
        } else {
            match bench {
                Some(b) => println!("{},{stats}", b.display()),
                None => println!("{stats}"),
            }
        }
        return;
    }

    if !cli.json {
        println!("c | parsing time: {parsing_time:.9} seconds");
        println!("c | *  {:>8} hyperedges", graph.edge_count());
        println!("c | *  {:>8} nodes", graph.vertex_count());
        println!("c | *  {:>8} max rank", graph.max_rank());
    }

    for algorithm in cli.algorithms() {
        if !cli.json {
            println!("c +{:=<74}+", "");
            println!("c | {} enumeration:", algorithm.name());
        }

        let interrupt = Interrupt::new();
        if let Some(timeout) = cli.timeout.filter(|&t| t > 0.0) {
            let handle = interrupt.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_secs_f64(timeout));
                handle.set();
            });
        }

        let mut driver = Driver::new(&graph, options, interrupt);
        let report = driver.enumerate(algorithm);

        if cli.json {
            println!(
                "{}",
                report_json(cli, bench, &graph, parsing_time, algorithm, &report)
            );
        } else {
            print_report(cli, parsing_time, &report);
        }

        if cli.stats_cliques() && !cli.json {
            println!("{}", CliqueStats::new(report.all_cliques()));
        }

        if cli.cardinality {
            print_constraints(&graph, &report);
        }
    }
}

fn print_banner(cli: &Cli) {
    if cli.json || cli.stats_hypergraph() {
        return;
    }
    let onoff = |b: bool| if b { "ON" } else { "OFF" };
    println!("c +{:=<74}+", "");
    println!("c | Hyperclique enumerations");
    println!("c |{:->74}|", "");
    println!("c | Debug: {:>37}", onoff(cli.debug));
    println!("c | Display: {:>35}", onoff(!cli.quiet));
    println!("c | Hyper-Bron & Kerbosch enumeration: {:>9}", onoff(cli.hbk));
    println!(
        "c | Hybrid-Bron & Kerbosch enumeration: {:>8}",
        onoff(cli.hybrid)
    );
    println!("c | Clique-CE_HBK enumeration: {:>17}", onoff(cli.ce_hbk));
    println!(
        "c | Non-uniform clique enumeration: {:>12}",
        onoff(cli.non_uniform)
    );
    if let Some(t) = cli.timeout {
        println!("c | Timeout: {t:>33}s");
    }
    let filter = CandidateFilter::from_flag(cli.filter)
        .map(|f| f.name())
        .unwrap_or("?");
    let ordering = OrderingStrategy::from_flag(cli.ordering)
        .map(|o| o.name())
        .unwrap_or("?");
    let node_filter = NodeFilter::from_flag(cli.node_filter)
        .map(|n| n.name())
        .unwrap_or("?");
    println!("c | Filter: {filter:>35}");
    println!("c | Ordering: {ordering:>33}");
    println!("c | Node filter: {node_filter:>30}");
    println!("c +{:=<74}+", "");
}

fn print_report(cli: &Cli, parsing_time: f64, report: &RunReport) {
    if !cli.quiet {
        for rank in &report.ranks {
            println!(
                "c | {:>9} | {:>9} | {:>9} | {:>9} | {:.9} seconds",
                rank.nbnodes, rank.nbedges, rank.nbcliques, rank.rank, rank.time
            );
            println!("c | nb calls to BK: {:>10}", rank.nbcalls);
        }
    }

    for rank in &report.ranks {
        if cli.find_max {
            for clique in &rank.cliques {
                print!("c | Biggest: {{");
                for v in &clique.vertices {
                    print!(" {v}");
                }
                println!(" }}");
            }
        } else if cli.debug || cli.print_edges {
            for clique in &rank.cliques {
                print!("c | {{");
                for v in &clique.vertices {
                    print!(" {v}");
                }
                println!(" }}");
                if cli.print_edges {
                    for id in &clique.edges {
                        println!("c | {id}");
                    }
                }
            }
        }
    }

    println!("c | total cliques found: {:>11}", report.total_cliques());
    println!("c | total nb calls to BK: {:>10}", report.total_calls);
    println!("c | timedout: {:>22}", report.timed_out);
    println!("c | BK total time: {:.9} seconds", report.total_time);
    println!(
        "c | total time: {:.9} seconds",
        parsing_time + report.total_time
    );
}

fn report_json(
    cli: &Cli,
    bench: Option<&Path>,
    graph: &Hypergraph,
    parsing_time: f64,
    algorithm: Algorithm,
    report: &RunReport,
) -> serde_json::Value {
    let ranks: Vec<serde_json::Value> = report
        .ranks
        .iter()
        .map(|rank| {
            let mut value = json!({
                "nbnodes": rank.nbnodes,
                "nbedges": rank.nbedges,
                "nbcliques": rank.nbcliques,
                "rank": rank.rank,
                "time": rank.time,
                "nbcalls": rank.nbcalls,
            });
            if cli.debug {
                let cliques: Vec<_> = rank.cliques.iter().map(|c| c.vertices.clone()).collect();
                value["cl"] = json!(cliques);
            }
            value
        })
        .collect();

    let mut value = json!({
        "o": cli.ordering,
        "f": cli.filter,
        "n": cli.node_filter,
        "parsingtime": parsing_time,
        "hyperedges": graph.edge_count(),
        "nodes": graph.vertex_count(),
        "maxrank": graph.max_rank(),
        "m": algorithm.label(),
        "cliques": ranks,
        "totalcliques": report.total_cliques(),
        "totalcalls": report.total_calls,
        "timedout": report.timed_out,
        "bktotaltime": report.total_time,
        "totaltime": parsing_time + report.total_time,
    });
    if let Some(b) = bench {
        value["bench"] = json!(b.display().to_string());
    }
    if let Some(t) = cli.timeout {
        value["Timeout"] = json!(t);
    }
    value
}

fn print_constraints(graph: &Hypergraph, report: &RunReport) {
    let units = graph.unit_edges();
    let fixed: FxIndexMap<usize, bool> = units
        .iter()
        .map(|&(_, literal)| {
            (
                hyperclique::constraints::variable_of(literal),
                hyperclique::constraints::is_positive(literal),
            )
        })
        .collect();

    let clique_constraints: Vec<_> = report
        .all_cliques()
        .filter_map(CardinalityConstraint::from_clique)
        .collect();
    let simplified = CardinalityConstraint::simplify(clique_constraints, &fixed);
    let merged = CardinalityConstraint::merge(simplified);

    let unit_constraints: Vec<_> = units
        .iter()
        .map(|&(id, literal)| CardinalityConstraint::from_unit(literal, id))
        .collect();

    println!(
        "c | {:>5} constraint(s)",
        merged.len() + unit_constraints.len()
    );
    for constraint in unit_constraints.iter().chain(&merged) {
        println!("c |{constraint}");
        if !constraint.inferred_by.is_empty() {
            print!("c | c");
            for id in &constraint.inferred_by {
                print!(" {id}");
            }
            println!();
        }
    }
}
