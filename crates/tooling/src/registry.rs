use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::ToolboxError;
use crate::tool::{Tool, ToolError, ToolInput, ToolOutput};

/// Every tool the assistant can be configured with.
///
/// The string form is the user-facing label; it is also what clients send to
/// select a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumIter, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum AvailableTool {
    #[strum(serialize = "\"AI Action Runner\" by Connery")]
    #[serde(rename = "\"AI Action Runner\" by Connery")]
    Connery,
    #[strum(serialize = "Retrieval")]
    #[serde(rename = "Retrieval")]
    Retrieval,
    #[strum(serialize = "Create CSV")]
    #[serde(rename = "Create CSV")]
    CreateCsv,
    #[strum(serialize = "Upload CSV")]
    #[serde(rename = "Upload CSV")]
    UploadCsv,
    #[strum(serialize = "Get all files in data folder")]
    #[serde(rename = "Get all files in data folder")]
    GetAllFiles,
}

impl AvailableTool {
    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Resolves a label. Anything outside the closed set is rejected here,
    /// before a factory is touched.
    pub fn from_label(label: &str) -> Result<Self, ToolboxError> {
        Self::from_str(label).map_err(|_| ToolboxError::UnknownTool(label.to_string()))
    }
}

/// Labels of every tool, in declaration order.
pub fn tool_options() -> Vec<&'static str> {
    AvailableTool::iter().map(AvailableTool::label).collect()
}

/// The tools built for one agent session, addressable by tool name.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Result<Self, ToolboxError> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolboxError> {
        let name = tool.name().to_string();

        if self.tools.contains_key(&name) {
            return Err(ToolboxError::DuplicateTool(name));
        }

        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list_tools(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn get_all_schemas(&self) -> Vec<serde_json::Value> {
        self.tools.values().map(|tool| tool.schema()).collect()
    }

    pub async fn execute_tool(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        let tool = self.get_tool(&input.name).ok_or_else(|| {
            ToolError::new(
                input.name.clone(),
                format!("Tool '{}' not found in registry", input.name),
                false,
            )
        })?;

        tool.execute(input).await
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
