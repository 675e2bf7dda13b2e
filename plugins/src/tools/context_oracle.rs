//! Composite context retrieval over the similarity scorer and the symbol ranker.

use std::sync::Arc;

use async_trait::async_trait;

use taskweave_core::api::{
    EmbeddingStore, ParamKind, ParameterSchema, ParameterSpec, RegistryError, SimilarityScorer,
    SymbolSearch, Tool, ToolArgs, ToolBuilder, ToolCategory, ToolDependencies, ToolError,
    ToolHandler,
};

pub const CONTEXT_ORACLE_TOOL: &str = "context-oracle";
pub const DEFAULT_MAX_RELATED_SYMBOLS: usize = 5;

const DESCRIPTION: &str = "Builds a context for a query. The most similar indexed document \
is returned in full, followed by the summaries of the most relevant related symbols.";

pub struct ContextOracleToolBuilder {
    similarity: Arc<dyn SimilarityScorer>,
    search: Arc<dyn SymbolSearch>,
    embeddings: Arc<dyn EmbeddingStore>,
}

impl ContextOracleToolBuilder {
    pub fn new(
        similarity: Arc<dyn SimilarityScorer>,
        search: Arc<dyn SymbolSearch>,
        embeddings: Arc<dyn EmbeddingStore>,
    ) -> Self {
        Self {
            similarity,
            search,
            embeddings,
        }
    }

    pub fn from_deps(deps: &ToolDependencies) -> Result<Box<dyn ToolBuilder>, RegistryError> {
        let category = ToolCategory::ContextOracle;
        Ok(Box::new(Self::new(
            deps.require_similarity(category)?,
            deps.require_symbol_search(category)?,
            deps.require_embeddings(category)?,
        )))
    }
}

impl ToolBuilder for ContextOracleToolBuilder {
    fn category(&self) -> ToolCategory {
        ToolCategory::ContextOracle
    }

    fn build(&self) -> Vec<Tool> {
        vec![Tool::new(
            CONTEXT_ORACLE_TOOL,
            DESCRIPTION,
            ParameterSchema::new(vec![
                ParameterSpec::required(
                    "query",
                    ParamKind::String,
                    "The query string to search for.",
                ),
                ParameterSpec::optional(
                    "max_related_symbols",
                    ParamKind::Integer,
                    "The maximum number of related symbols to return.",
                ),
            ]),
            Arc::new(ContextOracle {
                similarity: self.similarity.clone(),
                search: self.search.clone(),
                embeddings: self.embeddings.clone(),
            }),
        )]
    }
}

struct ContextOracle {
    similarity: Arc<dyn SimilarityScorer>,
    search: Arc<dyn SymbolSearch>,
    embeddings: Arc<dyn EmbeddingStore>,
}

#[async_trait]
impl ToolHandler for ContextOracle {
    async fn invoke(&self, args: &ToolArgs) -> Result<String, ToolError> {
        let query = args.require_str(CONTEXT_ORACLE_TOOL, "query")?;
        let max_related = args
            .get_u64(CONTEXT_ORACLE_TOOL, "max_related_symbols")?
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_RELATED_SYMBOLS);
        let fail = |e: anyhow::Error| ToolError::execution(CONTEXT_ORACLE_TOOL, format!("{e:#}"));

        let (similar, ranked) = futures::future::try_join(
            self.similarity.query_similarity(query),
            self.search.rank_search(query),
        )
        .await
        .map_err(fail)?;

        let primary = similar
            .into_iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(symbol, _)| symbol)
            .ok_or_else(|| {
                ToolError::execution(CONTEXT_ORACLE_TOOL, "no indexed document matches the query")
            })?;
        let primary = self.embeddings.get_embedding(&primary).await.map_err(fail)?;

        let mut result = primary.source_code;
        result.push_str(&primary.embedding_source);

        let mut added = 0;
        for (symbol, _) in ranked {
            if added >= max_related {
                break;
            }
            match self.embeddings.get_embedding(&symbol).await {
                Ok(embedding) => {
                    if !result.is_empty() && !result.ends_with('\n') {
                        result.push('\n');
                    }
                    result.push_str(symbol.dotpath());
                    result.push('\n');
                    result.push_str(&embedding.summary);
                    added += 1;
                }
                Err(e) => {
                    tracing::error!(
                        symbol = %symbol,
                        error = %e,
                        "failed to get embedding for related symbol"
                    );
                }
            }
        }

        tracing::debug!(primary = %primary.symbol, related = added, "context assembled");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::KeywordIndex;
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use taskweave_core::api::{SymbolEmbedding, SymbolPath};

    /// Fixed scores and a store where some lookups fail.
    struct Fixture {
        similar: Vec<(SymbolPath, f64)>,
        ranked: Vec<(SymbolPath, f64)>,
        docs: HashMap<String, SymbolEmbedding>,
    }

    #[async_trait]
    impl SimilarityScorer for Fixture {
        async fn query_similarity(&self, _query: &str) -> anyhow::Result<Vec<(SymbolPath, f64)>> {
            Ok(self.similar.clone())
        }
    }

    #[async_trait]
    impl SymbolSearch for Fixture {
        async fn rank_search(&self, _query: &str) -> anyhow::Result<Vec<(SymbolPath, f64)>> {
            Ok(self.ranked.clone())
        }
    }

    #[async_trait]
    impl EmbeddingStore for Fixture {
        async fn get_embedding(&self, symbol: &SymbolPath) -> anyhow::Result<SymbolEmbedding> {
            self.docs
                .get(symbol.dotpath())
                .cloned()
                .ok_or_else(|| anyhow!("no embedding for {symbol}"))
        }
    }

    fn doc(path: &str, summary: &str) -> (String, SymbolEmbedding) {
        (
            path.to_string(),
            SymbolEmbedding {
                symbol: SymbolPath::from(path),
                source_code: format!("src:{path}\n"),
                embedding_source: format!("doc:{path}\n"),
                summary: summary.to_string(),
            },
        )
    }

    fn fixture() -> Arc<Fixture> {
        let ranked = (1..=8)
            .map(|i| (SymbolPath::new(format!("pkg.S{i}")), 1.0 / i as f64))
            .collect();
        let mut docs: HashMap<String, SymbolEmbedding> = (1..=8)
            .filter(|i| *i != 2)
            .map(|i| doc(&format!("pkg.S{i}"), &format!("summary {i}")))
            .collect();
        docs.extend([doc("pkg.D", "primary summary")]);
        Arc::new(Fixture {
            similar: vec![
                (SymbolPath::from("pkg.Other"), 0.2),
                (SymbolPath::from("pkg.D"), 0.9),
            ],
            ranked,
            docs,
        })
    }

    fn oracle(f: Arc<Fixture>) -> Tool {
        ContextOracleToolBuilder::new(f.clone(), f.clone(), f)
            .build()
            .remove(0)
    }

    #[tokio::test]
    async fn primary_then_capped_related_skipping_failures() {
        let tool = oracle(fixture());
        let out = tool
            .invoke(&ToolArgs::new().with("query", "how").with("max_related_symbols", 3))
            .await
            .unwrap();

        assert_eq!(
            out,
            "src:pkg.D\ndoc:pkg.D\npkg.S1\nsummary 1\npkg.S3\nsummary 3\npkg.S4\nsummary 4"
        );
    }

    #[tokio::test]
    async fn default_cap_is_five() {
        let out = oracle(fixture())
            .invoke(&ToolArgs::new().with("query", "how"))
            .await
            .unwrap();
        let related = out.lines().filter(|l| l.starts_with("summary")).count();
        assert_eq!(related, DEFAULT_MAX_RELATED_SYMBOLS);
        assert!(!out.contains("pkg.S2"));
    }

    #[tokio::test]
    async fn empty_similarity_is_an_error() {
        let f = Arc::new(Fixture {
            similar: vec![],
            ranked: vec![],
            docs: HashMap::new(),
        });
        let err = oracle(f)
            .invoke(&ToolArgs::new().with("query", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Execution { .. }));
    }

    #[tokio::test]
    async fn missing_query_is_rejected() {
        let err = oracle(fixture()).invoke(&ToolArgs::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn builder_requires_all_collaborators() {
        let index = Arc::new(KeywordIndex::new(vec![]));
        let partial = ToolDependencies::new().with_similarity(index.clone());
        let err = ContextOracleToolBuilder::from_deps(&partial).err().unwrap();
        assert!(matches!(err, RegistryError::MissingDependency { .. }));

        let full = partial
            .with_symbol_search(index.clone())
            .with_embeddings(index);
        assert!(ContextOracleToolBuilder::from_deps(&full).is_ok());
    }
}
