use std::sync::Arc;

use async_trait::async_trait;

use taskweave_core::api::{
    EmbeddingStore, ParamKind, ParameterSchema, ParameterSpec, RegistryError, SymbolPath,
    SymbolSearch, Tool, ToolArgs, ToolBuilder, ToolCategory, ToolDependencies, ToolError,
    ToolHandler,
};

pub const RANK_SEARCH_TOOL: &str = "symbol-rank-search";
pub const RETRIEVE_SOURCE_TOOL: &str = "retrieve-source-code-by-symbol";
const DEFAULT_TOP_N: usize = 10;

pub struct SymbolSearchToolBuilder {
    search: Arc<dyn SymbolSearch>,
    embeddings: Arc<dyn EmbeddingStore>,
}

impl SymbolSearchToolBuilder {
    pub fn new(search: Arc<dyn SymbolSearch>, embeddings: Arc<dyn EmbeddingStore>) -> Self {
        Self { search, embeddings }
    }

    pub fn from_deps(deps: &ToolDependencies) -> Result<Box<dyn ToolBuilder>, RegistryError> {
        let category = ToolCategory::SymbolSearch;
        Ok(Box::new(Self::new(
            deps.require_symbol_search(category)?,
            deps.require_embeddings(category)?,
        )))
    }
}

impl ToolBuilder for SymbolSearchToolBuilder {
    fn category(&self) -> ToolCategory {
        ToolCategory::SymbolSearch
    }

    fn build(&self) -> Vec<Tool> {
        vec![
            Tool::new(
                RANK_SEARCH_TOOL,
                "Ranks indexed symbols by relevance to a query and returns the best matches.",
                ParameterSchema::new(vec![
                    ParameterSpec::required(
                        "query",
                        ParamKind::String,
                        "The query to rank symbols against.",
                    ),
                    ParameterSpec::optional(
                        "top_n",
                        ParamKind::Integer,
                        "How many symbols to return.",
                    ),
                ]),
                Arc::new(RankSearch {
                    search: self.search.clone(),
                }),
            ),
            Tool::new(
                RETRIEVE_SOURCE_TOOL,
                "Returns the source code of a symbol given its dotted path.",
                ParameterSchema::new(vec![ParameterSpec::required(
                    "symbol",
                    ParamKind::String,
                    "Dotted path of the symbol, e.g. pkg.module.Class.",
                )]),
                Arc::new(RetrieveSource {
                    embeddings: self.embeddings.clone(),
                }),
            ),
        ]
    }
}

struct RankSearch {
    search: Arc<dyn SymbolSearch>,
}

#[async_trait]
impl ToolHandler for RankSearch {
    async fn invoke(&self, args: &ToolArgs) -> Result<String, ToolError> {
        let query = args.require_str(RANK_SEARCH_TOOL, "query")?;
        let top_n = args
            .get_u64(RANK_SEARCH_TOOL, "top_n")?
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_TOP_N);

        let ranked = self
            .search
            .rank_search(query)
            .await
            .map_err(|e| ToolError::execution(RANK_SEARCH_TOOL, format!("{e:#}")))?;
        if ranked.is_empty() {
            return Ok("No matching symbols.".to_string());
        }
        Ok(ranked
            .iter()
            .take(top_n)
            .map(|(symbol, score)| format!("{symbol} ({score:.3})"))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

struct RetrieveSource {
    embeddings: Arc<dyn EmbeddingStore>,
}

#[async_trait]
impl ToolHandler for RetrieveSource {
    async fn invoke(&self, args: &ToolArgs) -> Result<String, ToolError> {
        let symbol = SymbolPath::from(args.require_str(RETRIEVE_SOURCE_TOOL, "symbol")?);
        let embedding = self
            .embeddings
            .get_embedding(&symbol)
            .await
            .map_err(|e| ToolError::execution(RETRIEVE_SOURCE_TOOL, format!("{e:#}")))?;
        Ok(embedding.source_code)
    }
}
