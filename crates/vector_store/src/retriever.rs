use anyhow::{Context, Result};
use assistant_core::PgVectorConfig;
use embeddings::{EmbedKind, EmbeddingProvider};
use std::sync::Arc;

use crate::index::VectorIndex;
use crate::memory::InMemoryVectorIndex;
use crate::models::{Document, DocumentChunk, NamespaceFilter};
use crate::store::PgVectorIndex;

/// Shared handle pairing an index with the embedder used to fill and query it.
/// Cheap to clone; every clone sees the same documents.
#[derive(Clone)]
pub struct VectorStore {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("index", &"VectorIndex<...>")
            .field("dimension", &self.embedder.dimension())
            .finish()
    }
}

impl VectorStore {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { index, embedder }
    }

    pub fn in_memory(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self::new(Arc::new(InMemoryVectorIndex::new()), embedder)
    }

    /// `memory://` selects the in-process index, `postgres://` or
    /// `postgresql://` the pgvector one.
    pub async fn connect(cfg: &PgVectorConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let url = cfg.url.as_str();
        if url.starts_with("memory://") {
            tracing::info!("Using in-memory vector index");
            Ok(Self::in_memory(embedder))
        } else if url.starts_with("postgresql://") || url.starts_with("postgres://") {
            let index = PgVectorIndex::connect(url, embedder.dimension())
                .await
                .context("Failed to connect to pgvector index")?;
            Ok(Self::new(Arc::new(index), embedder))
        } else {
            anyhow::bail!(
                "Invalid vector store URL: {}, must start with 'memory://' or 'postgresql://'",
                url
            )
        }
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Embeds `texts` and stores them as consecutive chunks of `file_name`
    /// under `namespace`.
    pub async fn add_texts(
        &self,
        namespace: &str,
        file_name: &str,
        texts: Vec<String>,
    ) -> Result<Vec<Document>> {
        let embeddings = self
            .embedder
            .embed(texts.clone(), EmbedKind::Document)
            .await
            .context("Failed to embed documents")?;

        let mut documents = Vec::with_capacity(texts.len());
        for (chunk_id, (content, embedding)) in texts.into_iter().zip(embeddings).enumerate() {
            let chunk = DocumentChunk {
                namespace: namespace.to_string(),
                file_name: file_name.to_string(),
                chunk_id,
                content,
                embedding,
            };
            documents.push(self.index.insert(chunk).await?);
        }
        Ok(documents)
    }

    pub fn as_retriever(&self, filter: NamespaceFilter, limit: usize) -> Retriever {
        Retriever {
            store: self.clone(),
            filter,
            limit,
        }
    }
}

/// A view of the store that only ever sees one namespace.
#[derive(Debug, Clone)]
pub struct Retriever {
    store: VectorStore,
    filter: NamespaceFilter,
    limit: usize,
}

impl Retriever {
    pub fn filter(&self) -> &NamespaceFilter {
        &self.filter
    }

    pub async fn retrieve(&self, query: &str) -> Result<Vec<Document>> {
        let embedding = self
            .store
            .embedder
            .embed(vec![query.to_string()], EmbedKind::Query)
            .await
            .context("Failed to embed query")?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No embedding generated for query"))?;

        let results = self
            .store
            .index
            .search(&embedding, &self.filter, self.limit)
            .await?;

        Ok(results.into_iter().map(|result| result.document).collect())
    }
}
