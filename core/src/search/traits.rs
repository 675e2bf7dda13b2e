//! Search collaborators consumed by the search-backed tools.

use anyhow::Result;
use async_trait::async_trait;

use super::types::{SymbolEmbedding, SymbolPath};

/// Scores indexed documents against a free-text query.
#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    /// Every match with its score, highest first.
    async fn query_similarity(&self, query: &str) -> Result<Vec<(SymbolPath, f64)>>;
}

/// Ranks symbols by relevance to a query.
#[async_trait]
pub trait SymbolSearch: Send + Sync {
    /// Ranked symbols, most relevant first.
    async fn rank_search(&self, query: &str) -> Result<Vec<(SymbolPath, f64)>>;
}

#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    async fn get_embedding(&self, symbol: &SymbolPath) -> Result<SymbolEmbedding>;
}
