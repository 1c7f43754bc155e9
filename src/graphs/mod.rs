mod bloom;
pub use bloom::{fingerprint, BloomSummary, Fingerprint};

mod hypergraph;
pub use hypergraph::{Hypergraph, RankView};

mod orderings;
pub use orderings::{OrderingStrategy, VertexOrdering};
