use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use vector_store::{NamespaceFilter, Retriever, VectorStore};

use crate::tool::{Tool, ToolError, ToolInput, ToolOutput};

pub const RETRIEVAL_TOOL_NAME: &str = "Retriever";

pub const RETRIEVAL_DESCRIPTION: &str = "Can be used to look up information that was uploaded to this assistant.
If the user is referencing particular files, that is often a good hint that information may be here.
If the user asks a vague question, they are likely meaning to look up info from this retriever, and you should call it!";

/// Searches the documents uploaded to one assistant.
#[derive(Debug)]
pub struct RetrievalTool {
    assistant_id: String,
    description: String,
    retriever: Retriever,
}

impl RetrievalTool {
    pub fn new(store: &VectorStore, assistant_id: &str, description: &str, limit: usize) -> Self {
        Self {
            assistant_id: assistant_id.to_string(),
            description: description.to_string(),
            retriever: store.as_retriever(NamespaceFilter::tag(assistant_id), limit),
        }
    }

    pub fn filter(&self) -> &NamespaceFilter {
        self.retriever.filter()
    }
}

#[async_trait]
impl Tool for RetrievalTool {
    fn name(&self) -> &str {
        RETRIEVAL_TOOL_NAME
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "query to look up in retriever"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;

        let query: String = input
            .get_argument("query")
            .map_err(|e| ToolError::invalid_arguments(self.name(), e))?;

        let documents = self
            .retriever
            .retrieve(&query)
            .await
            .map_err(|e| ToolError::new(self.name(), format!("Retrieval failed: {e}"), true))?;

        tracing::debug!(
            assistant_id = %self.assistant_id,
            "Retrieved {} documents",
            documents.len()
        );

        let text = documents
            .iter()
            .map(|document| document.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        ToolOutput::success(text).map_err(|e| ToolError::new(self.name(), e.to_string(), false))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    assistant_id: String,
    description: String,
}

/// Bounded memo of retrieval tools keyed by `(assistant_id, description)`.
///
/// Entries are kept in recency order; the least recently used one is evicted
/// once `capacity` is exceeded. A capacity of zero disables memoization.
#[derive(Debug)]
pub struct RetrieverCache {
    capacity: usize,
    entries: Mutex<IndexMap<CacheKey, Arc<RetrievalTool>>>,
}

impl RetrieverCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(IndexMap::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // `build` runs under the lock.
    pub fn get_or_insert_with<F>(&self, assistant_id: &str, description: &str, build: F) -> Arc<RetrievalTool>
    where
        F: FnOnce() -> RetrievalTool,
    {
        if self.capacity == 0 {
            return Arc::new(build());
        }

        let key = CacheKey {
            assistant_id: assistant_id.to_string(),
            description: description.to_string(),
        };
        let mut entries = self.entries.lock();

        if let Some(tool) = entries.shift_remove(&key) {
            tracing::debug!(assistant_id, "Retriever cache hit");
            entries.insert(key, Arc::clone(&tool));
            return tool;
        }

        tracing::debug!(assistant_id, "Retriever cache miss");
        let tool = Arc::new(build());
        entries.insert(key, Arc::clone(&tool));
        while entries.len() > self.capacity {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                tracing::debug!(assistant_id = %evicted.assistant_id, "Evicted retriever");
            }
        }
        tool
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains(&self, assistant_id: &str, description: &str) -> bool {
        self.entries.lock().contains_key(&CacheKey {
            assistant_id: assistant_id.to_string(),
            description: description.to_string(),
        })
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
