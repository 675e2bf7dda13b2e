use std::collections::HashMap;

use super::types::{Platform, PlatformTool, ToolArgs, ToolSpec};
use crate::agent::TERMINATION_TOOL;
use crate::error::{RegistryError, ToolError};

/// The tools bound to one agent, addressable by name.
#[derive(Debug, Clone)]
pub struct ToolSet {
    platform: Platform,
    tools: Vec<PlatformTool>,
    by_name: HashMap<String, usize>,
}

impl ToolSet {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            tools: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn insert(&mut self, tool: PlatformTool) -> Result<(), RegistryError> {
        if tool.tool.name == TERMINATION_TOOL {
            return Err(RegistryError::ReservedToolName(tool.tool.name));
        }
        if self.by_name.contains_key(&tool.tool.name) {
            return Err(RegistryError::DuplicateToolName(tool.tool.name));
        }
        self.by_name.insert(tool.tool.name.clone(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PlatformTool> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.tool.name.as_str()).collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn invoke(&self, name: &str, args: &ToolArgs) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tracing::debug!(tool = name, "invoking tool");
        tool.tool.invoke(args).await
    }
}
