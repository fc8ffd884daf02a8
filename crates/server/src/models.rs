use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeToolRequest {
    /// Tool label, e.g. `"Create CSV"`.
    pub tool: String,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Which of the built tools to run; may be omitted when the label builds
    /// exactly one.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOptionsResponse {
    pub options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_deserialize_minimal_invoke_request() {
        let request: InvokeToolRequest =
            serde_json::from_value(json!({"tool": "Get all files in data folder"})).unwrap();

        assert_eq!(request.tool, "Get all files in data folder");
        assert!(request.assistant_id.is_none());
        assert!(request.name.is_none());
        assert!(request.arguments.is_empty());
    }

    #[test]
    fn should_deserialize_full_invoke_request() {
        let request: InvokeToolRequest = serde_json::from_value(json!({
            "tool": "Retrieval",
            "assistant_id": "a-1",
            "description": "Look up schedules",
            "name": "Retriever",
            "arguments": {"query": "aspirin"}
        }))
        .unwrap();

        assert_eq!(request.assistant_id.as_deref(), Some("a-1"));
        assert_eq!(request.arguments["query"], "aspirin");
    }
}
