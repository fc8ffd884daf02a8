use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One invocation request as issued by the agent: the tool name plus its
/// JSON arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolInput {
    pub name: String,
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_argument<T: Serialize>(mut self, key: &str, value: T) -> Result<Self> {
        let json_value = serde_json::to_value(value)?;
        self.arguments.insert(key.to_string(), json_value);
        Ok(self)
    }

    pub fn get_argument<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let value = self
            .arguments
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("Argument '{}' not found", key))?;

        Ok(serde_json::from_value(value.clone())?)
    }

    /// Deserializes the whole argument map into a typed request.
    pub fn parse_arguments<T: DeserializeOwned>(&self) -> Result<T> {
        let object: serde_json::Map<String, serde_json::Value> = self
            .arguments
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(serde_json::from_value(serde_json::Value::Object(object))?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolOutput {
    pub success: bool,
    pub result: serde_json::Value,
    pub error_message: Option<String>,
}

impl ToolOutput {
    pub fn success<T: Serialize>(result: T) -> Result<Self> {
        Ok(Self {
            success: true,
            result: serde_json::to_value(result)?,
            error_message: None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    pub tool_name: String,
    pub message: String,
    pub recoverable: bool,
}

impl ToolError {
    pub fn new(tool_name: impl Into<String>, message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            tool_name: tool_name.into(),
            message: message.into(),
            recoverable,
        }
    }

    /// Bad or missing arguments; the agent can retry with corrected input.
    pub fn invalid_arguments(tool_name: &str, error: impl std::fmt::Display) -> Self {
        Self::new(tool_name, format!("Invalid arguments: {error}"), true)
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tool '{}' error: {}", self.tool_name, self.message)
    }
}

impl std::error::Error for ToolError {}

/// A named, schema-typed action the agent may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the arguments object.
    fn parameters(&self) -> serde_json::Value;

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError>;

    fn validate_input(&self, input: &ToolInput) -> Result<(), ToolError> {
        if input.name != self.name() {
            return Err(ToolError::new(
                self.name(),
                format!("Expected tool '{}', got '{}'", self.name(), input.name),
                false,
            ));
        }
        Ok(())
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name(),
            "description": self.description(),
            "parameters": self.parameters()
        })
    }
}
