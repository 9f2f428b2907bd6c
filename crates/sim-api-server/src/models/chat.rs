use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::services::ingest::RawDocument;

// ===== CHAT (frontend wire contract, camelCase) =====

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    #[serde(default = "default_true")]
    pub use_rag: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub npc_id: String,
    pub assistant_message: String,
    pub turn_number: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub npc_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MessageChunk {
    pub delta: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionInfo {
    pub session_id: String,
    pub turn_number: u32,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

// ===== SESSIONS =====

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: String,
    pub npc_id: String,
    #[serde(default)]
    pub scenario_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: String,
    pub user_id: String,
    pub npc_id: String,
    pub started_at: DateTime<Utc>,
}

// ===== INGESTION / RETRIEVAL =====

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub documents: Vec<RawDocument>,
}

#[derive(Debug, Deserialize)]
pub struct RetrieveRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub score_threshold: Option<f32>,
    #[serde(default)]
    pub filters: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct RetrievedChunkDto {
    pub content: String,
    pub score: f32,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct RetrieveResponse {
    pub results: Vec<RetrievedChunkDto>,
}
