use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::types::{Platform, PlatformTool, Tool, ToolCategory};
use crate::error::RegistryError;
use crate::search::{EmbeddingStore, SimilarityScorer, SymbolSearch};

/// Produces the tools of one capability category.
pub trait ToolBuilder: Send + Sync {
    fn category(&self) -> ToolCategory;

    fn build(&self) -> Vec<Tool>;

    /// Adapt the generic tools to `platform`. Handlers are shared, not rebuilt.
    fn build_for_platform(&self, platform: Platform) -> Vec<PlatformTool> {
        self.build()
            .into_iter()
            .map(|tool| PlatformTool::adapt(tool, platform))
            .collect()
    }
}

/// Runtime collaborators a builder constructor may ask for.
#[derive(Clone, Default)]
pub struct ToolDependencies {
    pub symbol_search: Option<Arc<dyn SymbolSearch>>,
    pub similarity: Option<Arc<dyn SimilarityScorer>>,
    pub embeddings: Option<Arc<dyn EmbeddingStore>>,
    pub workspace_root: Option<PathBuf>,
}

impl ToolDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol_search(mut self, search: Arc<dyn SymbolSearch>) -> Self {
        self.symbol_search = Some(search);
        self
    }

    pub fn with_similarity(mut self, similarity: Arc<dyn SimilarityScorer>) -> Self {
        self.similarity = Some(similarity);
        self
    }

    pub fn with_embeddings(mut self, embeddings: Arc<dyn EmbeddingStore>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn require_symbol_search(
        &self,
        category: ToolCategory,
    ) -> Result<Arc<dyn SymbolSearch>, RegistryError> {
        self.symbol_search
            .clone()
            .ok_or(RegistryError::MissingDependency {
                category,
                dependency: "symbol search",
            })
    }

    pub fn require_similarity(
        &self,
        category: ToolCategory,
    ) -> Result<Arc<dyn SimilarityScorer>, RegistryError> {
        self.similarity
            .clone()
            .ok_or(RegistryError::MissingDependency {
                category,
                dependency: "similarity scorer",
            })
    }

    pub fn require_embeddings(
        &self,
        category: ToolCategory,
    ) -> Result<Arc<dyn EmbeddingStore>, RegistryError> {
        self.embeddings
            .clone()
            .ok_or(RegistryError::MissingDependency {
                category,
                dependency: "embedding store",
            })
    }

    pub fn require_workspace_root(&self, category: ToolCategory) -> Result<&Path, RegistryError> {
        self.workspace_root
            .as_deref()
            .ok_or(RegistryError::MissingDependency {
                category,
                dependency: "workspace root",
            })
    }
}
