use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::services::chat_service::{ContextRetriever, DocumentChunk, RetrievedChunk};
use crate::utils::error::ApiError;

/// Text → vector capability.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Batch embedding; embedding `i` corresponds to input `i`.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;

    async fn embed_single(&self, text: &str) -> Result<Vec<f32>, ApiError>;
}

/// One similarity-search hit as the index returns it.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub score: f32,
    pub payload: Map<String, Value>,
}

/// Similarity-search collection capability.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Store vector/payload pairs as new points. All-or-nothing per batch;
    /// returns the stored count.
    async fn upsert(
        &self,
        vectors: Vec<Vec<f32>>,
        payloads: Vec<Map<String, Value>>,
    ) -> Result<usize, ApiError>;

    /// Nearest points at or above `score_threshold`, best first, restricted
    /// to points whose payload matches all `filters` entries.
    async fn search(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        score_threshold: f32,
        filters: Option<&Map<String, Value>>,
    ) -> Result<Vec<ScoredPoint>, ApiError>;
}

/// The reserved payload key carrying the chunk text.
const CONTENT_KEY: &str = "content";

/// Hides the embed-then-search and embed-then-upsert pipelines behind one
/// contract.
pub struct Retriever {
    embedding: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    pub fn new(embedding: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedding, index }
    }
}

#[async_trait]
impl ContextRetriever for Retriever {
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        score_threshold: f32,
        filters: Option<Map<String, Value>>,
    ) -> Result<Vec<RetrievedChunk>, ApiError> {
        // Empty queries are embedded like any other text; an empty index
        // simply returns no hits.
        let query_vector = self.embedding.embed_single(query).await?;

        let hits = self
            .index
            .search(query_vector, top_k, score_threshold, filters.as_ref())
            .await?;

        let results: Vec<RetrievedChunk> = hits
            .into_iter()
            .map(|hit| {
                let mut metadata = hit.payload;
                let content = match metadata.remove(CONTENT_KEY) {
                    Some(Value::String(text)) => text,
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                RetrievedChunk {
                    content,
                    score: hit.score,
                    metadata,
                }
            })
            .collect();

        debug!(query_len = query.len(), results = results.len(), "Retrieval complete");
        Ok(results)
    }

    async fn add_documents(&self, chunks: Vec<DocumentChunk>) -> Result<usize, ApiError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedding.embed(&texts).await?;

        let payloads: Vec<Map<String, Value>> = chunks
            .into_iter()
            .map(|chunk| {
                let mut payload = chunk.metadata;
                payload.insert(CONTENT_KEY.to_string(), Value::String(chunk.content));
                payload
            })
            .collect();

        let stored = self.index.upsert(embeddings, payloads).await?;

        info!(stored, "Added documents to knowledge base");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// Deterministic embedder: maps text to a 4-dim vector keyed on the
    /// first byte, and counts calls.
    #[derive(Default)]
    struct StubEmbedder {
        calls: AtomicUsize,
    }

    impl StubEmbedder {
        fn vector_for(text: &str) -> Vec<f32> {
            let seed = text.bytes().next().unwrap_or(0) as f32;
            vec![seed, 1.0, 0.0, 0.0]
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
        }

        async fn embed_single(&self, text: &str) -> Result<Vec<f32>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::vector_for(text))
        }
    }

    /// In-memory index honoring the VectorIndex contract: cosine scoring,
    /// threshold, top-k truncation, descending order, exact-match filters.
    #[derive(Default)]
    struct StubIndex {
        points: Mutex<Vec<(Vec<f32>, Map<String, Value>)>>,
        upsert_calls: AtomicUsize,
        search_calls: AtomicUsize,
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if na == 0.0 || nb == 0.0 {
            0.0
        } else {
            dot / (na * nb)
        }
    }

    #[async_trait]
    impl VectorIndex for StubIndex {
        async fn upsert(
            &self,
            vectors: Vec<Vec<f32>>,
            payloads: Vec<Map<String, Value>>,
        ) -> Result<usize, ApiError> {
            self.upsert_calls.fetch_add(1, Ordering::SeqCst);
            let mut points = self.points.lock().unwrap();
            let count = vectors.len();
            points.extend(vectors.into_iter().zip(payloads));
            Ok(count)
        }

        async fn search(
            &self,
            vector: Vec<f32>,
            top_k: usize,
            score_threshold: f32,
            filters: Option<&Map<String, Value>>,
        ) -> Result<Vec<ScoredPoint>, ApiError> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            let points = self.points.lock().unwrap();
            let mut hits: Vec<ScoredPoint> = points
                .iter()
                .filter(|(_, payload)| {
                    filters
                        .map(|f| f.iter().all(|(k, v)| payload.get(k) == Some(v)))
                        .unwrap_or(true)
                })
                .map(|(v, payload)| ScoredPoint {
                    score: cosine(&vector, v),
                    payload: payload.clone(),
                })
                .filter(|hit| hit.score >= score_threshold)
                .collect();
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
            hits.truncate(top_k);
            Ok(hits)
        }
    }

    fn chunk(content: &str, source: &str) -> DocumentChunk {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), json!(source));
        DocumentChunk {
            content: content.to_string(),
            metadata,
        }
    }

    fn retriever(embedder: Arc<StubEmbedder>, index: Arc<StubIndex>) -> Retriever {
        Retriever::new(embedder, index)
    }

    #[tokio::test]
    async fn test_add_documents_empty_input_is_free() {
        let embedder = Arc::new(StubEmbedder::default());
        let index = Arc::new(StubIndex::default());
        let retriever = retriever(embedder.clone(), index.clone());

        let stored = retriever.add_documents(vec![]).await.unwrap();

        assert_eq!(stored, 0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(index.upsert_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_documents_returns_input_length_with_one_embed_call() {
        let embedder = Arc::new(StubEmbedder::default());
        let index = Arc::new(StubIndex::default());
        let retriever = retriever(embedder.clone(), index.clone());

        let chunks = vec![chunk("alpha", "a"), chunk("beta", "a"), chunk("gamma", "b")];
        let stored = retriever.add_documents(chunks).await.unwrap();

        assert_eq!(stored, 3);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);

        let points = index.points.lock().unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].1["content"], "alpha");
        assert_eq!(points[0].1["source"], "a");
    }

    #[tokio::test]
    async fn test_retrieve_respects_top_k_threshold_and_order() {
        let embedder = Arc::new(StubEmbedder::default());
        let index = Arc::new(StubIndex::default());
        let retriever = retriever(embedder, index);

        let chunks: Vec<DocumentChunk> = ["alpha", "beta", "gamma", "delta", "epsilon"]
            .iter()
            .map(|c| chunk(c, "docs"))
            .collect();
        retriever.add_documents(chunks).await.unwrap();

        let results = retriever.retrieve("alpha", 3, 0.1, None).await.unwrap();

        assert!(results.len() <= 3);
        assert!(!results.is_empty());
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for result in &results {
            assert!(result.score >= 0.1);
            // The reserved content key must not leak into metadata.
            assert!(!result.metadata.contains_key("content"));
        }
        assert!(results[0].content.contains("alpha"));
    }

    #[tokio::test]
    async fn test_retrieve_applies_exact_match_filters() {
        let embedder = Arc::new(StubEmbedder::default());
        let index = Arc::new(StubIndex::default());
        let retriever = retriever(embedder, index);

        retriever
            .add_documents(vec![chunk("alpha one", "first"), chunk("alpha two", "second")])
            .await
            .unwrap();

        let mut filters = Map::new();
        filters.insert("source".to_string(), json!("second"));
        let results = retriever.retrieve("alpha", 5, 0.0, Some(filters)).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata["source"], "second");
    }

    #[tokio::test]
    async fn test_retrieve_empty_query_still_embeds() {
        let embedder = Arc::new(StubEmbedder::default());
        let index = Arc::new(StubIndex::default());
        let retriever = retriever(embedder.clone(), index);

        let results = retriever.retrieve("", 5, 0.0, None).await.unwrap();

        assert!(results.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_end_to_end_tiny_document_ingest_and_retrieve() {
        use crate::document::TextChunker;

        let embedder = Arc::new(StubEmbedder::default());
        let index = Arc::new(StubIndex::default());
        let retriever = retriever(embedder, index);

        let chunker = TextChunker::new(4, 1);
        let pieces = chunker.chunk("A. B. C.");
        assert!(pieces.len() > 1);
        for piece in &pieces {
            assert!(piece.content.contains('.'));
        }

        let total = pieces.len();
        let chunks: Vec<DocumentChunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(i, piece)| {
                let mut metadata = Map::new();
                metadata.insert("chunk_index".to_string(), json!(i));
                metadata.insert("total_chunks".to_string(), json!(total));
                DocumentChunk {
                    content: piece.content,
                    metadata,
                }
            })
            .collect();

        let stored = retriever.add_documents(chunks).await.unwrap();
        assert_eq!(stored, total);

        let results = retriever.retrieve("A", 5, 0.0, None).await.unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().any(|r| r.content.contains('A')));
        assert!(results[0].score > 0.0);
    }
}
