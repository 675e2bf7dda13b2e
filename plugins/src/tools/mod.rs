pub mod context_oracle;
pub mod file_io;
pub mod symbol_search;

use taskweave_core::api::{RegistryError, ToolBuilderRegistry, ToolCategory};

pub use context_oracle::{ContextOracleToolBuilder, CONTEXT_ORACLE_TOOL};
pub use file_io::{FileReaderToolBuilder, FileWriterToolBuilder, READ_FILE_TOOL, WRITE_FILE_TOOL};
pub use symbol_search::{SymbolSearchToolBuilder, RANK_SEARCH_TOOL, RETRIEVE_SOURCE_TOOL};

/// Register every built-in toolkit for every platform.
pub fn register_builtin_tools(registry: &mut ToolBuilderRegistry) -> Result<(), RegistryError> {
    registry.register_all_platforms(ToolCategory::FileReader, FileReaderToolBuilder::from_deps)?;
    registry.register_all_platforms(ToolCategory::FileWriter, FileWriterToolBuilder::from_deps)?;
    registry.register_all_platforms(
        ToolCategory::SymbolSearch,
        SymbolSearchToolBuilder::from_deps,
    )?;
    registry.register_all_platforms(
        ToolCategory::ContextOracle,
        ContextOracleToolBuilder::from_deps,
    )?;
    Ok(())
}
