use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Document, DocumentChunk, NamespaceFilter, SearchResult};

/// Storage backend holding embedded documents for similarity search.
///
/// Every search takes a [`NamespaceFilter`]; there is no unfiltered query, so
/// one shared index can serve many assistants without leaking documents
/// between them.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn insert(&self, chunk: DocumentChunk) -> Result<Document>;

    /// Most similar documents first, at most `limit` of them.
    async fn search(
        &self,
        query_embedding: &[f32],
        filter: &NamespaceFilter,
        limit: usize,
    ) -> Result<Vec<SearchResult>>;

    async fn document_count(&self, filter: &NamespaceFilter) -> Result<usize>;
}
