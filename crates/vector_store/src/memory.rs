use anyhow::Result;
use async_trait::async_trait;
use std::cmp::Ordering;
use tokio::sync::RwLock;

use crate::index::VectorIndex;
use crate::models::{Document, DocumentChunk, NamespaceFilter, SearchResult};

/// Process-local index used in development (`memory://`) and tests.
#[derive(Default)]
pub struct InMemoryVectorIndex {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn insert(&self, chunk: DocumentChunk) -> Result<Document> {
        let document = chunk.into_document();
        self.documents.write().await.push(document.clone());
        Ok(document)
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        filter: &NamespaceFilter,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let documents = self.documents.read().await;
        let mut results: Vec<SearchResult> = documents
            .iter()
            .filter(|doc| filter.matches(doc))
            .map(|doc| {
                let similarity = cosine_similarity(query_embedding, &doc.embedding);
                SearchResult::new(doc.clone(), similarity)
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        results.truncate(limit);
        Ok(results)
    }

    async fn document_count(&self, filter: &NamespaceFilter) -> Result<usize> {
        let documents = self.documents.read().await;
        Ok(documents.iter().filter(|doc| filter.matches(doc)).count())
    }
}
