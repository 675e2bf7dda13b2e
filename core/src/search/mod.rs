pub mod traits;
pub mod types;

pub use traits::{EmbeddingStore, SimilarityScorer, SymbolSearch};
pub use types::{SymbolEmbedding, SymbolPath};
