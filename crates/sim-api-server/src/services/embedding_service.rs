use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::services::rag::retriever::EmbeddingProvider;
use crate::utils::error::ApiError;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI-compatible embeddings client.
///
/// Works against any provider exposing `POST {base}/embeddings`; the
/// `dimensions` parameter is only sent where the provider accepts it.
#[derive(Clone)]
pub struct EmbeddingService {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
    send_dimensions: bool,
    provider_name: &'static str,
}

impl EmbeddingService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        dimension: usize,
        send_dimensions: bool,
        timeout_seconds: u64,
        provider_name: &'static str,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
            api_key,
            model,
            dimension,
            send_dimensions,
            provider_name,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.send_dimensions.then_some(self.dimension),
        };

        let url = format!("{}/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ApiError::LlmUnavailable(format!(
                    "{} embedding request failed: {e}",
                    self.provider_name
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::LlmUnavailable(format!(
                "{} embedding API error ({status}): {body}",
                self.provider_name
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            ApiError::LlmUnavailable(format!(
                "{} embedding response parse failed: {e}",
                self.provider_name
            ))
        })?;

        if parsed.data.len() != texts.len() {
            return Err(ApiError::LlmUnavailable(format!(
                "{} returned {} embeddings for {} inputs",
                self.provider_name,
                parsed.data.len(),
                texts.len()
            )));
        }

        // The API reports an index per item; restore input order explicitly
        // instead of trusting response ordering.
        let mut embeddings: Vec<Vec<f32>> = vec![Vec::new(); texts.len()];
        for item in parsed.data {
            if item.index >= embeddings.len() {
                return Err(ApiError::LlmUnavailable(format!(
                    "{} returned out-of-range embedding index {}",
                    self.provider_name, item.index
                )));
            }
            embeddings[item.index] = item.embedding;
        }

        debug!(
            provider = self.provider_name,
            count = texts.len(),
            "Embeddings generated"
        );
        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        self.embed_batch(texts).await
    }

    async fn embed_single(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results.pop().ok_or_else(|| {
            ApiError::LlmUnavailable(format!("{} returned no embedding", self.provider_name))
        })
    }
}
