pub mod cohere;
pub mod fallback;

pub use assistant_core::EmbeddingConfig;
pub use cohere::{CohereClient, CohereConfig};
pub use fallback::FallbackEmbeddingProvider;

use anyhow::Result;

type EmbedFuture<'a> =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<Vec<f32>>>> + Send + 'a>>;

/// Whether texts are being embedded for storage or for lookup. Providers
/// with asymmetric models (Cohere v3) embed the two differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    Document,
    Query,
}

impl EmbedKind {
    fn cohere_input_type(self) -> &'static str {
        match self {
            EmbedKind::Document => "search_document",
            EmbedKind::Query => "search_query",
        }
    }
}

pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, texts: Vec<String>, kind: EmbedKind) -> EmbedFuture<'_>;
    fn dimension(&self) -> usize;
}

impl EmbeddingProvider for CohereClient {
    fn embed(&self, texts: Vec<String>, kind: EmbedKind) -> EmbedFuture<'_> {
        Box::pin(self.embed(texts, kind))
    }
    fn dimension(&self) -> usize {
        cohere::COHERE_DIMENSION
    }
}

impl EmbeddingProvider for FallbackEmbeddingProvider {
    fn embed(&self, texts: Vec<String>, _kind: EmbedKind) -> EmbedFuture<'_> {
        Box::pin(self.embed(texts))
    }
    fn dimension(&self) -> usize {
        self.embedding_dimension()
    }
}

pub fn create_embedding_provider(cfg: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match cfg.provider.as_str() {
        "cohere" => {
            let cohere_cfg = CohereConfig::from_env(cfg.model.clone());
            Ok(Box::new(CohereClient::new(cohere_cfg)?))
        }
        other => {
            if other != "fallback" {
                tracing::warn!(
                    "Unknown embedding provider '{}', using offline fallback embeddings",
                    other
                );
            }
            let provider = match cfg.dimensions {
                Some(dim) => FallbackEmbeddingProvider::new(dim),
                None => FallbackEmbeddingProvider::with_standard_dimension(),
            };
            Ok(Box::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str, dimensions: Option<usize>) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: provider.to_string(),
            model: None,
            dimensions,
        }
    }

    #[test]
    fn should_create_cohere_provider() {
        let provider = create_embedding_provider(&config("cohere", None)).unwrap();
        assert_eq!(provider.dimension(), 1024);
    }

    #[tokio::test]
    async fn should_create_fallback_provider_with_configured_dimension() {
        let provider = create_embedding_provider(&config("fallback", Some(32))).unwrap();
        assert_eq!(provider.dimension(), 32);

        let vectors = provider
            .embed(vec!["hello".to_string()], EmbedKind::Query)
            .await
            .unwrap();
        assert_eq!(vectors[0].len(), 32);
    }

    #[test]
    fn should_fall_back_for_unknown_provider() {
        let provider = create_embedding_provider(&config("bedrock-titan", None)).unwrap();
        assert_eq!(provider.dimension(), 1024);
    }
}
