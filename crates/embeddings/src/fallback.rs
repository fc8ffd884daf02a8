use anyhow::Result;

/// Offline embeddings provider for development and tests.
///
/// Each lowercase alphanumeric token is hashed into one of `embedding_dim`
/// buckets and the resulting bag-of-words vector is L2-normalized, so texts
/// sharing vocabulary land close together under cosine similarity.
pub struct FallbackEmbeddingProvider {
    embedding_dim: usize,
}

impl FallbackEmbeddingProvider {
    pub fn new(embedding_dim: usize) -> Self {
        Self {
            embedding_dim: embedding_dim.max(1),
        }
    }

    pub fn with_standard_dimension() -> Self {
        Self::new(crate::cohere::COHERE_DIMENSION)
    }

    pub async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    pub fn embedding_dimension(&self) -> usize {
        self.embedding_dim
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.embedding_dim];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
        {
            let bucket = fnv1a(&token.to_lowercase()) as usize % self.embedding_dim;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(0xcbf29ce484222325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x100000001b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn should_create_fallback_provider_with_standard_dimension() {
        let provider = FallbackEmbeddingProvider::with_standard_dimension();
        assert_eq!(provider.embedding_dimension(), 1024);
    }

    #[test]
    fn should_clamp_zero_dimension() {
        assert_eq!(FallbackEmbeddingProvider::new(0).embedding_dimension(), 1);
    }

    #[tokio::test]
    async fn should_return_empty_embeddings_for_empty_input() {
        let provider = FallbackEmbeddingProvider::new(64);
        assert!(provider.embed(vec![]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_be_deterministic() {
        let provider = FallbackEmbeddingProvider::new(64);
        let first = provider.embed(vec!["same text".to_string()]).await.unwrap();
        let second = provider.embed(vec!["same text".to_string()]).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn should_produce_unit_vectors() {
        let provider = FallbackEmbeddingProvider::new(64);
        let result = provider
            .embed(vec!["morning medication schedule".to_string()])
            .await
            .unwrap();

        let norm = result[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn should_leave_empty_text_as_zero_vector() {
        let provider = FallbackEmbeddingProvider::new(8);
        let result = provider.embed(vec!["  ,, ".to_string()]).await.unwrap();

        assert!(result[0].iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn should_rank_shared_vocabulary_higher() {
        let provider = FallbackEmbeddingProvider::new(256);
        let result = provider
            .embed(vec![
                "aspirin dosage in the morning".to_string(),
                "Morning ASPIRIN dosage".to_string(),
                "quarterly revenue report".to_string(),
            ])
            .await
            .unwrap();

        assert!(cosine(&result[0], &result[1]) > cosine(&result[0], &result[2]));
    }
}
