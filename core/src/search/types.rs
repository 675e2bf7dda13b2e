use std::fmt;

use serde::{Deserialize, Serialize};

/// Dotted path identifying an indexed symbol, e.g. `pkg.module.Class.method`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolPath(String);

impl SymbolPath {
    pub fn new(dotpath: impl Into<String>) -> Self {
        Self(dotpath.into())
    }

    pub fn dotpath(&self) -> &str {
        &self.0
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for SymbolPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SymbolPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SymbolPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Stored content for one indexed symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEmbedding {
    pub symbol: SymbolPath,
    pub source_code: String,
    #[serde(default)]
    pub embedding_source: String,
    #[serde(default)]
    pub summary: String,
}
