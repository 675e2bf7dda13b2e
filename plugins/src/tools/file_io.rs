//! Workspace-confined file reader and writer toolkits.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use taskweave_core::api::{
    ParamKind, ParameterSchema, ParameterSpec, RegistryError, Tool, ToolArgs, ToolBuilder,
    ToolCategory, ToolDependencies, ToolError, ToolHandler,
};

pub const READ_FILE_TOOL: &str = "read-file";
pub const WRITE_FILE_TOOL: &str = "write-file";

/// Resolve `relative` under `root`, refusing anything that could leave it.
fn resolve(tool: &str, root: &Path, relative: &str) -> Result<PathBuf, ToolError> {
    let rel = Path::new(relative);
    if relative.trim().is_empty() {
        return Err(ToolError::invalid(tool, "path must not be empty"));
    }
    for component in rel.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ToolError::invalid(
                    tool,
                    format!("path '{relative}' must be relative to the workspace and stay inside it"),
                ));
            }
        }
    }
    Ok(root.join(rel))
}

pub struct FileReaderToolBuilder {
    root: PathBuf,
}

impl FileReaderToolBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_deps(deps: &ToolDependencies) -> Result<Box<dyn ToolBuilder>, RegistryError> {
        Ok(Box::new(Self::new(
            deps.require_workspace_root(ToolCategory::FileReader)?,
        )))
    }
}

impl ToolBuilder for FileReaderToolBuilder {
    fn category(&self) -> ToolCategory {
        ToolCategory::FileReader
    }

    fn build(&self) -> Vec<Tool> {
        vec![Tool::new(
            READ_FILE_TOOL,
            "Reads a file from the workspace, optionally limited to a 1-based inclusive line range.",
            ParameterSchema::new(vec![
                ParameterSpec::required(
                    "path",
                    ParamKind::String,
                    "Path relative to the workspace root.",
                ),
                ParameterSpec::optional(
                    "start_line",
                    ParamKind::Integer,
                    "First line to return (1-based).",
                ),
                ParameterSpec::optional(
                    "end_line",
                    ParamKind::Integer,
                    "Last line to return (inclusive).",
                ),
            ]),
            Arc::new(ReadFile {
                root: self.root.clone(),
            }),
        )]
    }
}

struct ReadFile {
    root: PathBuf,
}

#[async_trait]
impl ToolHandler for ReadFile {
    async fn invoke(&self, args: &ToolArgs) -> Result<String, ToolError> {
        let relative = args.require_str(READ_FILE_TOOL, "path")?;
        let path = resolve(READ_FILE_TOOL, &self.root, relative)?;
        let start = args.get_u64(READ_FILE_TOOL, "start_line")?;
        let end = args.get_u64(READ_FILE_TOOL, "end_line")?;

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ToolError::execution(READ_FILE_TOOL, format!("failed to read {relative}: {e}"))
        })?;

        if start.is_none() && end.is_none() {
            return Ok(content);
        }

        let start = start.unwrap_or(1).max(1) as usize;
        let end = end.map(|e| e as usize).unwrap_or(usize::MAX);
        if end < start {
            return Err(ToolError::invalid(
                READ_FILE_TOOL,
                format!("end_line {end} is before start_line {start}"),
            ));
        }
        Ok(content
            .lines()
            .skip(start - 1)
            .take(end - start + 1)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

pub struct FileWriterToolBuilder {
    root: PathBuf,
}

impl FileWriterToolBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_deps(deps: &ToolDependencies) -> Result<Box<dyn ToolBuilder>, RegistryError> {
        Ok(Box::new(Self::new(
            deps.require_workspace_root(ToolCategory::FileWriter)?,
        )))
    }
}

impl ToolBuilder for FileWriterToolBuilder {
    fn category(&self) -> ToolCategory {
        ToolCategory::FileWriter
    }

    fn build(&self) -> Vec<Tool> {
        vec![Tool::new(
            WRITE_FILE_TOOL,
            "Writes content to a file in the workspace, creating parent directories as needed.",
            ParameterSchema::new(vec![
                ParameterSpec::required(
                    "path",
                    ParamKind::String,
                    "Path relative to the workspace root.",
                ),
                ParameterSpec::required(
                    "content",
                    ParamKind::String,
                    "Full file content to write.",
                ),
            ]),
            Arc::new(WriteFile {
                root: self.root.clone(),
            }),
        )]
    }
}

struct WriteFile {
    root: PathBuf,
}

#[async_trait]
impl ToolHandler for WriteFile {
    async fn invoke(&self, args: &ToolArgs) -> Result<String, ToolError> {
        let relative = args.require_str(WRITE_FILE_TOOL, "path")?;
        let content = args.require_str(WRITE_FILE_TOOL, "content")?;
        let path = resolve(WRITE_FILE_TOOL, &self.root, relative)?;
        let io_err = |e: std::io::Error| {
            ToolError::execution(WRITE_FILE_TOOL, format!("failed to write {relative}: {e}"))
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&path, content).await.map_err(io_err)?;
        tracing::info!(path = %path.display(), bytes = content.len(), "file written");
        Ok(format!("Wrote {} bytes to {relative}", content.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_tool(root: &Path) -> Tool {
        FileReaderToolBuilder::new(root).build().remove(0)
    }

    fn write_tool(root: &Path) -> Tool {
        FileWriterToolBuilder::new(root).build().remove(0)
    }

    #[tokio::test]
    async fn write_then_read_with_line_range() {
        let dir = tempfile::tempdir().unwrap();
        let out = write_tool(dir.path())
            .invoke(
                &ToolArgs::new()
                    .with("path", "nested/dir/notes.txt")
                    .with("content", "one\ntwo\nthree\nfour"),
            )
            .await
            .unwrap();
        assert!(out.starts_with("Wrote 18 bytes"));

        let read = read_tool(dir.path());
        let whole = read
            .invoke(&ToolArgs::new().with("path", "nested/dir/notes.txt"))
            .await
            .unwrap();
        assert_eq!(whole, "one\ntwo\nthree\nfour");

        let slice = read
            .invoke(
                &ToolArgs::new()
                    .with("path", "nested/dir/notes.txt")
                    .with("start_line", 2)
                    .with("end_line", "3"),
            )
            .await
            .unwrap();
        assert_eq!(slice, "two\nthree");
    }

    #[tokio::test]
    async fn escaping_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for path in ["../outside.txt", "/etc/passwd", "a/../../b"] {
            let err = read_tool(dir.path())
                .invoke(&ToolArgs::new().with("path", path))
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments { .. }), "{path}");
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_execution_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_tool(dir.path())
            .invoke(&ToolArgs::new().with("path", "nope.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Execution { .. }));
    }

    #[tokio::test]
    async fn inverted_range_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("f.txt"), "a\nb").await.unwrap();
        let err = read_tool(dir.path())
            .invoke(
                &ToolArgs::new()
                    .with("path", "f.txt")
                    .with("start_line", 3)
                    .with("end_line", 1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn builders_need_a_workspace_root() {
        let err = FileReaderToolBuilder::from_deps(&ToolDependencies::new())
            .err()
            .unwrap();
        assert_eq!(
            err,
            RegistryError::MissingDependency {
                category: ToolCategory::FileReader,
                dependency: "workspace root",
            }
        );
    }
}
