use std::path::Path;

use pest::{iterators::Pair, Parser};
use pest_derive::Parser;

use crate::{
    graphs::Hypergraph,
    types::{EdgeId, Error, Result, Vertex},
};

/// Parser for the PACE hypergraph format.
///
/// The format is line-oriented: `c` lines are comments, one
/// `p <name> <nVertices> <nEdges>` header precedes the hyperedges, and each
/// hyperedge line is its external id followed by its vertices. Non-positive
/// vertices are skipped, vertex lists are sorted and empty hyperedges are
/// discarded.
#[derive(Parser)]
#[grammar = "io/pace/pace.pest"]
pub struct PaceParser;

impl PaceParser {
    /// Parses a PACE document into a [`Hypergraph`].
    pub fn parse_str(input: &str) -> Result<Hypergraph> {
        let mut pairs = <Self as Parser<Rule>>::parse(Rule::file, input)
            .map_err(|e| Error::Parsing(format!("malformed PACE input: {e}")))?;
        let file = pairs
            .next()
            .ok_or_else(|| Error::Parsing("empty PACE input".into()))?;

        let mut header: Option<(usize, usize)> = None;
        let mut edges: Vec<(EdgeId, Vec<Vertex>)> = Vec::new();

        for record in file.into_inner() {
            match record.as_rule() {
                Rule::header => {
                    let line = line_of(&record);
                    if header.is_some() {
                        return Err(Error::Parsing(format!("line {line}: duplicate header")));
                    }
                    let mut ints = record.into_inner().filter(|p| p.as_rule() == Rule::int);
                    let n = parse_count(ints.next(), line)?;
                    let m = parse_count(ints.next(), line)?;
                    header = Some((n, m));
                }
                Rule::edge => {
                    let line = line_of(&record);
                    let Some((n, _)) = header else {
                        return Err(Error::Parsing(format!(
                            "line {line}: hyperedge before the `p` header"
                        )));
                    };

                    let mut ints = record.into_inner().map(|p| {
                        p.as_str().parse::<i64>().map_err(|_| {
                            Error::Parsing(format!("line {line}: invalid integer `{}`", p.as_str()))
                        })
                    });
                    let id = ints.next().expect("edge rule matches at least one int")?;
                    if id < 0 {
                        return Err(Error::Parsing(format!(
                            "line {line}: negative hyperedge id {id}"
                        )));
                    }

                    let mut vertices = Vec::new();
                    for v in ints {
                        let v = v?;
                        if v <= 0 {
                            continue;
                        }
                        if v as usize > n {
                            return Err(Error::Parsing(format!(
                                "line {line}: vertex {v} outside [1, {n}]"
                            )));
                        }
                        vertices.push(v as Vertex);
                    }
                    edges.push((id as EdgeId, vertices));
                }
                Rule::EOI => {}
                _ => unreachable!("silent rules expose only headers and edges"),
            }
        }

        let (n, _) = header.ok_or_else(|| Error::Parsing("missing `p` header".into()))?;
        Hypergraph::new(n, edges)
    }

    /// Reads and parses a PACE file.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Hypergraph> {
        let input = std::fs::read_to_string(path)?;
        Self::parse_str(&input)
    }
}

fn line_of(pair: &Pair<Rule>) -> usize {
    pair.as_span().start_pos().line_col().0
}

fn parse_count(pair: Option<Pair<Rule>>, line: usize) -> Result<usize> {
    pair.and_then(|p| p.as_str().parse().ok())
        .ok_or_else(|| Error::Parsing(format!("line {line}: malformed header")))
}
