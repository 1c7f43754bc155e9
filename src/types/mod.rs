mod error;
pub use error::{Error, Result};

use fxhash::FxBuildHasher;
use indexmap::{IndexMap, IndexSet};

/// A type alias for a hash map with a fast hash function.
pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;
/// A type alias for a hash set with a fast hash function.
pub type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

/// A vertex identifier, 1-based as in the PACE format.
pub type Vertex = usize;
/// The external identifier of a hyperedge.
pub type EdgeId = usize;
