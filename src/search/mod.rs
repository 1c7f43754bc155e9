use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

mod driver;
pub use driver::{CliqueResult, Driver, RankSummary, RunReport};

mod engine;
pub(crate) use engine::CliqueSearch;

mod filters;
pub use filters::CandidateFilter;

use crate::{
    graphs::OrderingStrategy,
    types::{Error, Result},
};

/// The search-engine variants selectable from the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Algorithm {
    /// Hyperclique Bron-Kerbosch (`-a`).
    Hbk,
    /// Hybrid Bron-Kerbosch with per-branch hyperclique checks (`-b`).
    Hybrid,
    /// Clique-expansion enumeration with HBK verification (`-c`).
    CeHbk,
    /// Non-uniform hyperclique enumeration (`-u`).
    NonUniform,
}

impl Algorithm {
    /// The one-letter label of the flag selecting the algorithm.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hbk => "a",
            Self::Hybrid => "b",
            Self::CeHbk => "c",
            Self::NonUniform => "u",
        }
    }

    /// The display name used by the run summary.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hbk => "Hyper-Bron & Kerbosch",
            Self::Hybrid => "Hybrid-Bron & Kerbosch",
            Self::CeHbk => "Clique-CE_HBK",
            Self::NonUniform => "Non-uniform clique",
        }
    }
}

/// What the driver reports per rank.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// Every maximal hyperclique of size >= k.
    #[default]
    FindAll,
    /// Only a size-maximum hyperclique.
    FindMax,
}

/// The node-level pre-filters of the `-n` flag.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NodeFilter {
    /// No pre-filtering.
    #[default]
    None,
    /// Drop vertices of rank-k degree below k.
    Degree,
    /// Drop vertices lacking k neighbours sharing at least k-1 hyperedges.
    CoOccurrence,
    /// Both filters, degree first.
    Both,
}

impl NodeFilter {
    /// Maps the `-n<i>` flag value to a pre-filter.
    pub fn from_flag(flag: u8) -> Result<Self> {
        match flag {
            0 => Ok(Self::None),
            1 => Ok(Self::Degree),
            2 => Ok(Self::CoOccurrence),
            3 => Ok(Self::Both),
            _ => Err(Error::IllegalArgument(format!("unknown node filter {flag}"))),
        }
    }

    /// The display name used by the run summary.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "OFF",
            Self::Degree => "Degree",
            Self::CoOccurrence => "Co-occurrences",
            Self::Both => "Both",
        }
    }
}

/// The configuration of one enumeration run.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchOptions {
    /// Candidate filter applied at each recursion node.
    pub filter: CandidateFilter,
    /// Vertex-ordering strategy, recomputed per rank.
    pub ordering: OrderingStrategy,
    /// Node-level pre-filter applied before each rank search.
    pub node_filter: NodeFilter,
    /// Enumeration versus size-maximum search.
    pub mode: Mode,
    /// Seed of the ordering shuffle; entropy-seeded when absent.
    pub seed: Option<u64>,
}

/// The cooperative cancellation token of a search.
///
/// The engine polls the flag at the head of every recursive call and loop
/// iteration; the flag is flipped by an external watchdog when the deadline
/// elapses. Relaxed ordering suffices, no other state crosses threads.
#[derive(Clone, Debug, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// Creates an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
