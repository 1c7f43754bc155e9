use std::io::Write;

use hyperclique::{io::PaceParser, types::Error};

#[test]
fn parses_a_wellformed_document() {
    let input = "c a comment\np htd 5 3\n1 1 2 3\nc another comment\n2 4 5\n3 2 1\n";
    let graph = PaceParser::parse_str(input).unwrap();

    assert_eq!(graph.vertex_count(), 5);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.max_rank(), 3);
    // Edge lines are sorted on ingestion.
    assert_eq!(graph.edge(3), Some(&[1, 2][..]));
}

#[test]
fn skips_non_positive_vertices_and_empty_edges() {
    let input = "p htd 3 2\n1 2 0 -1 3\n2 0 -5\n";
    let graph = PaceParser::parse_str(input).unwrap();

    // Edge 2 lost all its vertices and is discarded.
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.edge(1), Some(&[2, 3][..]));
}

#[test]
fn tolerates_blank_lines_and_missing_trailing_newline() {
    let input = "\nc leading comment\n\np htd 2 1\n\n1 1 2";
    let graph = PaceParser::parse_str(input).unwrap();
    assert_eq!(graph.edge_count(), 1);
}

fn parse_error(input: &str) -> String {
    match PaceParser::parse_str(input) {
        Err(Error::Parsing(message)) => message,
        other => panic!("expected a parsing error, got {other:?}"),
    }
}

#[test]
fn diagnostics_name_the_offending_line() {
    assert!(parse_error("p htd 3 1\np htd 3 1\n1 1 2\n").contains("line 2"));
    assert!(parse_error("1 1 2\np htd 3 1\n").contains("line 1"));
    assert!(parse_error("p htd 3 2\n1 1 2\n2 1 4\n").contains("line 3"));
}

#[test]
fn rejects_structural_errors() {
    assert!(parse_error("").contains("header"));
    assert!(parse_error("c only comments\n").contains("header"));
    assert!(PaceParser::parse_str("p htd 3 1\nnot an edge\n").is_err());
    // Duplicate external ids violate the catalogue invariant.
    assert!(PaceParser::parse_str("p htd 3 2\n1 1 2\n1 2 3\n").is_err());
}

#[test]
fn reads_files_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "p htd 3 1\n1 1 2 3\n").unwrap();

    let graph = PaceParser::read_file(file.path()).unwrap();
    assert_eq!(graph.edge_count(), 1);

    assert!(matches!(
        PaceParser::read_file("/nonexistent/instance.hgr"),
        Err(Error::Io(_))
    ));
}
