//! (category, platform) → builder constructor registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::builder::{ToolBuilder, ToolDependencies};
use super::toolset::ToolSet;
use super::types::{Platform, ToolCategory};
use crate::error::RegistryError;

pub type BuilderConstructor =
    Arc<dyn Fn(&ToolDependencies) -> Result<Box<dyn ToolBuilder>, RegistryError> + Send + Sync>;

/// Explicitly constructed builder registry.
///
/// Populate it once at startup, then share it behind an `Arc`; lookups take
/// `&self` only.
#[derive(Clone, Default)]
pub struct ToolBuilderRegistry {
    builders: BTreeMap<(ToolCategory, Platform), BuilderConstructor>,
}

impl ToolBuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor. A second registration for the same key is an error.
    pub fn register<F>(
        &mut self,
        category: ToolCategory,
        platform: Platform,
        constructor: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&ToolDependencies) -> Result<Box<dyn ToolBuilder>, RegistryError>
            + Send
            + Sync
            + 'static,
    {
        let key = (category, platform);
        if self.builders.contains_key(&key) {
            return Err(RegistryError::DuplicateBuilder { category, platform });
        }
        self.builders.insert(key, Arc::new(constructor));
        tracing::trace!(%category, %platform, "tool builder registered");
        Ok(())
    }

    /// Register the same constructor for every platform.
    pub fn register_all_platforms<F>(
        &mut self,
        category: ToolCategory,
        constructor: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&ToolDependencies) -> Result<Box<dyn ToolBuilder>, RegistryError>
            + Send
            + Sync
            + 'static,
    {
        let constructor: BuilderConstructor = Arc::new(constructor);
        for platform in Platform::ALL {
            let shared = constructor.clone();
            self.register(category, platform, move |deps| shared(deps))?;
        }
        Ok(())
    }

    pub fn contains(&self, category: ToolCategory, platform: Platform) -> bool {
        self.builders.contains_key(&(category, platform))
    }

    /// Registered keys in (category, platform) order.
    pub fn keys(&self) -> Vec<(ToolCategory, Platform)> {
        self.builders.keys().copied().collect()
    }

    pub fn resolve(
        &self,
        category: ToolCategory,
        platform: Platform,
        deps: &ToolDependencies,
    ) -> Result<Box<dyn ToolBuilder>, RegistryError> {
        let constructor = self
            .builders
            .get(&(category, platform))
            .ok_or(RegistryError::UnknownBuilder { category, platform })?;
        constructor(deps)
    }

    /// Resolve every category for `platform` and merge the results.
    pub fn build_toolset(
        &self,
        categories: &[ToolCategory],
        platform: Platform,
        deps: &ToolDependencies,
    ) -> Result<ToolSet, RegistryError> {
        let mut toolset = ToolSet::new(platform);
        for &category in categories {
            let builder = self.resolve(category, platform, deps)?;
            for tool in builder.build_for_platform(platform) {
                toolset.insert(tool)?;
            }
        }
        tracing::debug!(
            %platform,
            tools = ?toolset.names(),
            "tool set built"
        );
        Ok(toolset)
    }
}
