use thiserror::Error;

use super::task::TaskError;
use super::tool::RegistryError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("tool registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("task failed: {0}")]
    Task(#[from] TaskError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this failure.
    ///
    /// 11 config, 12 registry, 20 io, 30 state/general task errors,
    /// 40 execution failures that exhausted their retries.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 11,
            CliError::Registry(_) => 12,
            CliError::Io(_) => 20,
            CliError::Task(err) => match err {
                TaskError::State(_) | TaskError::General(_) => 30,
                TaskError::Execution(_) | TaskError::ResourceExhausted(_) => 40,
            },
        }
    }
}
