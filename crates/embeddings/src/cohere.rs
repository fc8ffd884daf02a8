use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::EmbedKind;

pub const COHERE_DIMENSION: usize = 1024;

#[derive(Debug, Clone)]
pub struct CohereConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl CohereConfig {
    /// Reads the API key from `COHERE_API_KEY`; an unset key is left empty and
    /// surfaces as a 401 from the API on first use.
    pub fn from_env(model: Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("COHERE_API_KEY").unwrap_or_default(),
            model: model.unwrap_or(defaults.model),
            ..defaults
        }
    }
}

impl Default for CohereConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "embed-english-v3.0".to_string(),
            base_url: "https://api.cohere.ai".to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct CohereClient {
    config: CohereConfig,
    client: Client,
}

impl CohereClient {
    pub fn new(config: CohereConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    pub async fn embed(&self, texts: Vec<String>, kind: EmbedKind) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut attempt = 0;
        loop {
            match self.request_embeddings(&texts, kind).await {
                Ok(embeddings) => return Ok(embeddings),
                Err(e) if attempt < self.config.max_retries => {
                    tracing::warn!("Cohere embed attempt {} failed: {:#}", attempt + 1, e);
                    tokio::time::sleep(Duration::from_millis(250 * 2_u64.pow(attempt))).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request_embeddings(&self, texts: &[String], kind: EmbedKind) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            texts,
            model: &self.config.model,
            input_type: kind.cohere_input_type(),
        };

        let response = self
            .client
            .post(format!("{}/v1/embed", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Cohere API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Cohere API returned error {}: {}", status, error_text);
        }

        let body: EmbedResponse = response
            .json()
            .await
            .context("Failed to parse Cohere API response")?;

        if body.embeddings.len() != texts.len() {
            anyhow::bail!(
                "Cohere API returned {} embeddings for {} texts",
                body.embeddings.len(),
                texts.len()
            );
        }

        Ok(body.embeddings)
    }
}
