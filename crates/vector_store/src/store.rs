use anyhow::{Context, Result};
use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::index::VectorIndex;
use crate::migrations::run_migrations;
use crate::models::{Document, DocumentChunk, NamespaceFilter, SearchResult};

/// pgvector-backed index. Namespaces live in an indexed `namespace` column and
/// every query carries a `WHERE namespace = $n` clause.
pub struct PgVectorIndex {
    pool: PgPool,
    embedding_dimensions: usize,
}

impl PgVectorIndex {
    pub async fn connect(database_url: &str, embedding_dimensions: usize) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        run_migrations(database_url)
            .await
            .context("Failed to run vector store migrations")?;

        tracing::info!(
            "pgvector index ready ({} dimensions)",
            embedding_dimensions
        );

        Ok(Self {
            pool,
            embedding_dimensions,
        })
    }

    fn check_dimensions(&self, what: &str, len: usize) -> Result<()> {
        if len != self.embedding_dimensions {
            anyhow::bail!(
                "{} embedding dimension mismatch: expected {}, got {}",
                what,
                self.embedding_dimensions,
                len
            );
        }
        Ok(())
    }
}

fn document_from_row(row: &PgRow) -> Document {
    let embedding: Vector = row.get("embedding");
    Document {
        id: row.get("id"),
        namespace: row.get("namespace"),
        file_name: row.get("file_name"),
        chunk_id: row.get::<i32, _>("chunk_id") as usize,
        content: row.get("content"),
        embedding: embedding.into(),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl VectorIndex for PgVectorIndex {
    async fn insert(&self, chunk: DocumentChunk) -> Result<Document> {
        self.check_dimensions("Document", chunk.embedding.len())?;
        let document = chunk.into_document();

        sqlx::query(
            r#"
            INSERT INTO documents (id, namespace, file_name, chunk_id, content, embedding, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(document.id)
        .bind(&document.namespace)
        .bind(&document.file_name)
        .bind(document.chunk_id as i32)
        .bind(&document.content)
        .bind(Vector::from(document.embedding.clone()))
        .bind(document.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert document")?;

        Ok(document)
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        filter: &NamespaceFilter,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        self.check_dimensions("Query", query_embedding.len())?;

        let rows = sqlx::query(
            r#"
            SELECT id, namespace, file_name, chunk_id, content, embedding, created_at,
                   1 - (embedding <=> $1) AS similarity
            FROM documents
            WHERE namespace = $2
            ORDER BY embedding <=> $1
            LIMIT $3
            "#,
        )
        .bind(Vector::from(query_embedding.to_vec()))
        .bind(filter.namespace())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to execute similarity search")?;

        tracing::debug!(
            "Similarity search in namespace '{}' returned {} rows",
            filter.namespace(),
            rows.len()
        );

        Ok(rows
            .iter()
            .map(|row| {
                let similarity: f64 = row.get("similarity");
                SearchResult::new(document_from_row(row), similarity as f32)
            })
            .collect())
    }

    async fn document_count(&self, filter: &NamespaceFilter) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM documents WHERE namespace = $1")
            .bind(filter.namespace())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count documents")?;

        Ok(row.get::<i64, _>("count") as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_fail_to_connect_with_invalid_url() {
        let result = PgVectorIndex::connect("postgresql://invalid", 1024).await;
        assert!(result.is_err());
    }
}
