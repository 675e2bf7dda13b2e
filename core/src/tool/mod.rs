pub mod builder;
pub mod registry;
pub mod toolset;
pub mod types;

pub use builder::{ToolBuilder, ToolDependencies};
pub use registry::{BuilderConstructor, ToolBuilderRegistry};
pub use toolset::ToolSet;
pub use types::{
    ParamKind, ParameterSchema, ParameterSpec, Platform, PlatformTool, Tool, ToolArgs,
    ToolCategory, ToolHandler, ToolSpec,
};
