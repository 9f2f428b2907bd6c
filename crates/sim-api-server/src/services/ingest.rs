use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::document::TextChunker;
use crate::nlp;
use crate::services::chat_service::{ContextRetriever, DocumentChunk};
use crate::utils::error::ApiError;

/// A raw document handed to the ingestion pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub total_documents: usize,
    pub total_chunks: usize,
    pub status: String,
}

/// Knowledge-base builder: clean → chunk → embed → store.
///
/// Repeated ingestion of identical text creates duplicate points; dedup is
/// the caller's responsibility.
pub struct IngestService {
    retriever: Arc<dyn ContextRetriever>,
    chunker: TextChunker,
}

impl IngestService {
    pub fn new(retriever: Arc<dyn ContextRetriever>, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            retriever,
            chunker: TextChunker::new(chunk_size, chunk_overlap),
        }
    }

    pub async fn ingest(&self, documents: Vec<RawDocument>) -> Result<IngestReport, ApiError> {
        let total_documents = documents.len();
        let mut all_chunks: Vec<DocumentChunk> = Vec::new();

        for document in documents {
            if document.content.trim().is_empty() {
                warn!("Skipping empty document");
                continue;
            }

            let cleaned = nlp::clean_text(&document.content);
            let pieces = self.chunker.chunk(&cleaned);
            let total_chunks = pieces.len();

            for (index, piece) in pieces.into_iter().enumerate() {
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), json!(index));
                metadata.insert("total_chunks".to_string(), json!(total_chunks));
                all_chunks.push(DocumentChunk {
                    content: piece.content,
                    metadata,
                });
            }
        }

        if all_chunks.is_empty() {
            return Ok(IngestReport {
                total_documents,
                total_chunks: 0,
                status: "no_content".to_string(),
            });
        }

        let stored = self.retriever.add_documents(all_chunks).await?;

        info!(total_documents, total_chunks = stored, "Documents ingested");
        Ok(IngestReport {
            total_documents,
            total_chunks: stored,
            status: "success".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::services::chat_service::RetrievedChunk;

    #[derive(Default)]
    struct RecordingRetriever {
        received: Mutex<Vec<DocumentChunk>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContextRetriever for RecordingRetriever {
        async fn retrieve(
            &self,
            _query: &str,
            _top_k: usize,
            _score_threshold: f32,
            _filters: Option<Map<String, Value>>,
        ) -> Result<Vec<RetrievedChunk>, ApiError> {
            Ok(vec![])
        }

        async fn add_documents(&self, chunks: Vec<DocumentChunk>) -> Result<usize, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let count = chunks.len();
            self.received.lock().unwrap().extend(chunks);
            Ok(count)
        }
    }

    fn document(content: &str) -> RawDocument {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), json!("handbook"));
        metadata.insert("document_id".to_string(), json!("doc-1"));
        RawDocument {
            content: content.to_string(),
            metadata,
        }
    }

    #[tokio::test]
    async fn test_blank_documents_are_skipped_entirely() {
        let retriever = Arc::new(RecordingRetriever::default());
        let service = IngestService::new(retriever.clone(), 512, 50);

        let report = service
            .ingest(vec![document("   "), document("\n\n")])
            .await
            .unwrap();

        assert_eq!(report.total_chunks, 0);
        assert_eq!(report.status, "no_content");
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chunks_carry_index_and_total() {
        let retriever = Arc::new(RecordingRetriever::default());
        let service = IngestService::new(retriever.clone(), 40, 5);

        let text = "Sentence one is here. Sentence two follows it. Sentence three closes out the document.";
        let report = service.ingest(vec![document(text)]).await.unwrap();

        assert_eq!(report.status, "success");
        assert!(report.total_chunks > 1);

        let received = retriever.received.lock().unwrap();
        assert_eq!(received.len(), report.total_chunks);
        for (i, chunk) in received.iter().enumerate() {
            assert_eq!(chunk.metadata["chunk_index"], json!(i));
            assert_eq!(chunk.metadata["total_chunks"], json!(received.len()));
            assert_eq!(chunk.metadata["source"], json!("handbook"));
        }
    }

    #[tokio::test]
    async fn test_mixed_blank_and_real_documents() {
        let retriever = Arc::new(RecordingRetriever::default());
        let service = IngestService::new(retriever.clone(), 512, 50);

        let report = service
            .ingest(vec![document(""), document("A real document body.")])
            .await
            .unwrap();

        assert_eq!(report.total_documents, 2);
        assert_eq!(report.total_chunks, 1);
        assert_eq!(report.status, "success");
    }
}
