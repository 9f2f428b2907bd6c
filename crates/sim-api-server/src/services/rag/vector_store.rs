use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

use super::retriever::{ScoredPoint, VectorIndex};
use crate::config::QdrantConfig;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    score: f32,
    #[serde(default)]
    payload: Option<Map<String, Value>>,
}

/// Qdrant adapter for vector storage and similarity search, over the REST
/// API.
///
/// Owns the collection lifecycle: the collection is created lazily on first
/// use with cosine distance and the embedding dimensionality, and the check
/// is idempotent.
pub struct QdrantVectorStore {
    client: Client,
    base_url: String,
    collection_name: String,
    vector_size: usize,
    collection_ready: OnceCell<()>,
}

impl QdrantVectorStore {
    pub fn new(config: &QdrantConfig, vector_size: usize) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            collection_name: config.collection_name.clone(),
            vector_size,
            collection_ready: OnceCell::new(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection_name)
    }

    async fn ensure_collection(&self) -> Result<(), ApiError> {
        self.collection_ready
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .get(self.collection_url())
                    .send()
                    .await
                    .map_err(|e| {
                        ApiError::VectorStoreUnavailable(format!(
                            "Failed to reach Qdrant: {e}"
                        ))
                    })?;

                if response.status().is_success() {
                    return Ok(());
                }
                if response.status() != reqwest::StatusCode::NOT_FOUND {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(ApiError::VectorStoreUnavailable(format!(
                        "Qdrant collection check failed ({status}): {body}"
                    )));
                }

                let create = self
                    .client
                    .put(self.collection_url())
                    .json(&json!({
                        "vectors": {
                            "size": self.vector_size,
                            "distance": "Cosine",
                        }
                    }))
                    .send()
                    .await
                    .map_err(|e| {
                        ApiError::VectorStoreUnavailable(format!(
                            "Failed to create Qdrant collection: {e}"
                        ))
                    })?;

                if !create.status().is_success() {
                    let status = create.status();
                    let body = create.text().await.unwrap_or_default();
                    return Err(ApiError::VectorStoreUnavailable(format!(
                        "Qdrant collection create failed ({status}): {body}"
                    )));
                }

                info!(collection = %self.collection_name, "Created Qdrant collection");
                Ok(())
            })
            .await
            .map(|_| ())
    }

    fn build_filter(filters: &Map<String, Value>) -> Value {
        let conditions: Vec<Value> = filters
            .iter()
            .map(|(key, value)| json!({ "key": key, "match": { "value": value } }))
            .collect();
        json!({ "must": conditions })
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorStore {
    async fn upsert(
        &self,
        vectors: Vec<Vec<f32>>,
        payloads: Vec<Map<String, Value>>,
    ) -> Result<usize, ApiError> {
        if vectors.is_empty() {
            return Ok(0);
        }
        self.ensure_collection().await?;

        let points: Vec<Value> = vectors
            .into_iter()
            .zip(payloads)
            .map(|(vector, payload)| {
                json!({
                    "id": Uuid::new_v4().to_string(),
                    "vector": vector,
                    "payload": payload,
                })
            })
            .collect();
        let count = points.len();

        let response = self
            .client
            .put(format!("{}/points?wait=true", self.collection_url()))
            .json(&json!({ "points": points }))
            .send()
            .await
            .map_err(|e| {
                ApiError::VectorStoreUnavailable(format!("Failed to upsert vectors: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::VectorStoreUnavailable(format!(
                "Qdrant upsert failed ({status}): {body}"
            )));
        }

        info!(count, collection = %self.collection_name, "Upserted vectors");
        Ok(count)
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        score_threshold: f32,
        filters: Option<&Map<String, Value>>,
    ) -> Result<Vec<ScoredPoint>, ApiError> {
        self.ensure_collection().await?;

        let mut body = json!({
            "vector": vector,
            "limit": top_k,
            "score_threshold": score_threshold,
            "with_payload": true,
        });
        if let Some(filters) = filters {
            if !filters.is_empty() {
                body["filter"] = Self::build_filter(filters);
            }
        }

        let response = self
            .client
            .post(format!("{}/points/search", self.collection_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ApiError::VectorStoreUnavailable(format!("Vector search failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::VectorStoreUnavailable(format!(
                "Qdrant search failed ({status}): {body}"
            )));
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| {
            ApiError::VectorStoreUnavailable(format!("Failed to parse search response: {e}"))
        })?;

        debug!(hits = parsed.result.len(), "Vector search complete");
        Ok(parsed
            .result
            .into_iter()
            .map(|hit| ScoredPoint {
                score: hit.score,
                payload: hit.payload.unwrap_or_default(),
            })
            .collect())
    }
}
