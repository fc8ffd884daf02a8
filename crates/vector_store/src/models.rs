use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored chunk of an uploaded file, tagged with the namespace (assistant
/// id) it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub namespace: String,
    pub file_name: String,
    pub chunk_id: usize,
    pub content: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(chunk: DocumentChunk) -> Self {
        Self {
            id: Uuid::new_v4(),
            namespace: chunk.namespace,
            file_name: chunk.file_name,
            chunk_id: chunk.chunk_id,
            content: chunk.content,
            embedding: chunk.embedding,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub namespace: String,
    pub file_name: String,
    pub chunk_id: usize,
    pub content: String,
    pub embedding: Vec<f32>,
}

impl DocumentChunk {
    pub fn into_document(self) -> Document {
        Document::new(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub document: Document,
    pub similarity: f32,
}

impl SearchResult {
    pub fn new(document: Document, similarity: f32) -> Self {
        Self {
            document,
            similarity,
        }
    }
}

/// Query-time restriction to the documents of a single namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceFilter {
    namespace: String,
}

impl NamespaceFilter {
    pub fn tag(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn matches(&self, document: &Document) -> bool {
        document.namespace == self.namespace
    }
}
