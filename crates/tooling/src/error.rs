use assistant_core::ConfigError;
use thiserror::Error;

use crate::connery::ConneryError;

/// Failures raised while resolving or constructing tools.
///
/// These happen before a tool is handed to the agent; failures during a tool
/// invocation are reported as [`crate::ToolError`] instead.
#[derive(Error, Debug)]
pub enum ToolboxError {
    #[error("Unknown tool identifier '{0}'")]
    UnknownTool(String),

    #[error(transparent)]
    MissingEnv(#[from] ConfigError),

    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Missing required parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("Action runner error: {0}")]
    ActionRunner(#[from] ConneryError),

    #[error("Vector store error: {0}")]
    VectorStore(#[source] anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolboxError {
    /// Configuration problems are fixed by the operator, never by retrying.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ToolboxError::UnknownTool(_)
                | ToolboxError::DuplicateTool(_)
                | ToolboxError::MissingEnv(_)
                | ToolboxError::MissingParameter(_)
        )
    }
}
