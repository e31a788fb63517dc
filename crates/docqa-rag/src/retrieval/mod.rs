//! Vector index and nearest-neighbor retrieval

mod flat_index;
mod index_manager;

pub use flat_index::FlatL2Index;
pub use index_manager::{AddOutcome, IndexManager, IndexSnapshot, IndexStats};
