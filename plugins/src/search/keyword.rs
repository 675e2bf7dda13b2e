//! In-process symbol index scored with bag-of-words cosine similarity.
//!
//! Small enough to load from a JSON file at startup. It stands in for a vector
//! store wherever the search-backed toolkits need all three collaborators.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use taskweave_core::api::{
    EmbeddingStore, SimilarityScorer, SymbolEmbedding, SymbolPath, SymbolSearch,
};

type TermVector = HashMap<String, f64>;

pub struct KeywordIndex {
    docs: Vec<SymbolEmbedding>,
    vectors: Vec<TermVector>,
    by_symbol: HashMap<SymbolPath, usize>,
}

impl KeywordIndex {
    pub fn new(docs: Vec<SymbolEmbedding>) -> Self {
        let vectors = docs
            .iter()
            .map(|d| {
                term_vector(&format!(
                    "{} {} {}",
                    d.symbol, d.summary, d.embedding_source
                ))
            })
            .collect();
        let by_symbol = docs
            .iter()
            .enumerate()
            .map(|(i, d)| (d.symbol.clone(), i))
            .collect();
        Self {
            docs,
            vectors,
            by_symbol,
        }
    }

    /// Load a JSON array of symbol documents.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read symbol index {}", path.display()))?;
        let docs: Vec<SymbolEmbedding> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse symbol index {}", path.display()))?;
        tracing::info!(path = %path.display(), symbols = docs.len(), "symbol index loaded");
        Ok(Self::new(docs))
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Every document scored against `query`, highest first; ties keep index order.
    fn score_all(&self, query: &str) -> Vec<(SymbolPath, f64)> {
        let q = term_vector(query);
        let mut scored: Vec<(SymbolPath, f64)> = self
            .docs
            .iter()
            .zip(&self.vectors)
            .map(|(doc, v)| (doc.symbol.clone(), cosine(&q, v)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn term_vector(text: &str) -> TermVector {
    let mut v = TermVector::new();
    for token in tokenize(text) {
        *v.entry(token).or_insert(0.0) += 1.0;
    }
    v
}

fn cosine(a: &TermVector, b: &TermVector) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(t, x)| b.get(t).map(|y| x * y))
        .sum();
    if dot == 0.0 {
        return 0.0;
    }
    let norm = |v: &TermVector| v.values().map(|x| x * x).sum::<f64>().sqrt();
    dot / (norm(a) * norm(b))
}

#[async_trait]
impl SimilarityScorer for KeywordIndex {
    async fn query_similarity(&self, query: &str) -> Result<Vec<(SymbolPath, f64)>> {
        Ok(self.score_all(query))
    }
}

#[async_trait]
impl SymbolSearch for KeywordIndex {
    /// Only symbols sharing at least one term with the query.
    async fn rank_search(&self, query: &str) -> Result<Vec<(SymbolPath, f64)>> {
        Ok(self
            .score_all(query)
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .collect())
    }
}

#[async_trait]
impl EmbeddingStore for KeywordIndex {
    async fn get_embedding(&self, symbol: &SymbolPath) -> Result<SymbolEmbedding> {
        self.by_symbol
            .get(symbol)
            .map(|&i| self.docs[i].clone())
            .with_context(|| format!("symbol not indexed: {symbol}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn doc(path: &str, summary: &str) -> SymbolEmbedding {
        SymbolEmbedding {
            symbol: SymbolPath::from(path),
            source_code: String::new(),
            embedding_source: String::new(),
            summary: summary.to_string(),
        }
    }

    #[tokio::test]
    async fn ranks_by_shared_terms() {
        let index = KeywordIndex::new(vec![
            doc("net.http.Client", "sends http requests"),
            doc("retry.Backoff", "exponential retry backoff"),
            doc("retry.Linear", "linear retry"),
        ]);

        let ranked = index.rank_search("retry backoff").await.unwrap();
        let order: Vec<&str> = ranked.iter().map(|(s, _)| s.dotpath()).collect();
        assert_eq!(order, vec!["retry.Backoff", "retry.Linear"]);

        let all = index.query_similarity("retry backoff").await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].1, 0.0);
    }

    #[tokio::test]
    async fn unknown_symbol_is_an_error() {
        let index = KeywordIndex::new(vec![doc("a.B", "")]);
        assert!(index.get_embedding(&SymbolPath::from("a.C")).await.is_err());
        assert_eq!(
            index.get_embedding(&SymbolPath::from("a.B")).await.unwrap().symbol,
            SymbolPath::from("a.B")
        );
    }

    #[test]
    fn loads_json_documents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"symbol":"pkg.mod.Func","source_code":"def func(): pass","summary":"does things"}}]"#
        )
        .unwrap();
        let index = KeywordIndex::load(file.path()).unwrap();
        assert_eq!(index.len(), 1);
    }
}
