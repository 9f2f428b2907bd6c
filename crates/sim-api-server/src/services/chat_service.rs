use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::Stream;
use futures::StreamExt;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::domain::{Conversation, Speaker};
use crate::nlp::IntentDetector;
use crate::personas;
use crate::services::session::SessionManager;
use crate::utils::error::ApiError;
use crate::utils::token_estimator;

/// Opaque text-generation capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: &str,
        temperature: Option<f32>,
        max_tokens: Option<usize>,
    ) -> Result<String, ApiError>;

    async fn generate_stream(
        &self,
        prompt: &str,
        system_prompt: &str,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String, ApiError>> + Send>>, ApiError>;
}

/// One ranked retrieval hit.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub content: String,
    pub score: f32,
    pub metadata: Map<String, Value>,
}

/// A chunk headed for the vector index. Transient: once embedded and
/// upserted, the index payload is the only persistent copy.
#[derive(Debug, Clone)]
pub struct DocumentChunk {
    pub content: String,
    pub metadata: Map<String, Value>,
}

/// Retrieval-augmented-generation capability: ranked retrieval plus
/// ingestion into the backing index.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        score_threshold: f32,
        filters: Option<Map<String, Value>>,
    ) -> Result<Vec<RetrievedChunk>, ApiError>;

    async fn add_documents(&self, chunks: Vec<DocumentChunk>) -> Result<usize, ApiError>;
}

/// Result of one processed turn.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub response: String,
    pub turn_number: u32,
    pub session_id: String,
}

/// Streaming variant events.
#[derive(Debug, Clone)]
pub enum ChatStreamEvent {
    Delta(String),
    Completed { turn_number: u32 },
}

const RETRIEVE_TOP_K: usize = 3;
const HISTORY_WINDOW: usize = 10;

/// Build the generation prompt from conversation state and retrieved
/// context. The ordering — context block, then truncated history, then the
/// current user line — is a hard contract: generation behavior must be
/// reproducible from equal state.
pub fn build_prompt(conversation: &Conversation, rag_context: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !rag_context.is_empty() {
        parts.push("## Relevant Context".to_string());
        parts.push(rag_context.to_string());
        parts.push(String::new());
    }

    let turns = &conversation.turns;
    let window_start = turns.len().saturating_sub(HISTORY_WINDOW);
    let history = &turns[window_start..];

    if history.len() > 1 {
        parts.push("## Conversation History".to_string());
        for turn in &history[..history.len() - 1] {
            parts.push(format!("{}: {}", turn.speaker.label(), turn.content));
        }
        parts.push(String::new());
    }

    if let Some(current) = turns.last() {
        parts.push(format!("User: {}", current.content));
    }

    parts.join("\n")
}

/// The conversation turn pipeline:
/// load → append user turn → retrieve → build prompt → generate → append NPC
/// turn → persist.
///
/// A missing session is the only expected failure and surfaces typed;
/// whether to auto-create on first message is the caller's policy at the
/// transport boundary. Any upstream failure aborts the turn before
/// persistence, and no layer here retries.
pub struct ChatService {
    sessions: Arc<SessionManager>,
    llm: Arc<dyn LlmProvider>,
    retriever: Option<Arc<dyn ContextRetriever>>,
    max_context_tokens: usize,
}

impl ChatService {
    pub fn new(
        sessions: Arc<SessionManager>,
        llm: Arc<dyn LlmProvider>,
        retriever: Option<Arc<dyn ContextRetriever>>,
        max_context_tokens: usize,
    ) -> Self {
        Self {
            sessions,
            llm,
            retriever,
            max_context_tokens,
        }
    }

    pub async fn process_message(
        &self,
        session_id: &str,
        user_message: &str,
        use_rag: bool,
    ) -> Result<ChatOutcome, ApiError> {
        let (mut conversation, prompt, system_prompt, rag_used) =
            self.prepare_turn(session_id, user_message, use_rag).await?;

        info!(
            session_id,
            turn = conversation.turn_count(),
            "Calling LLM"
        );
        let npc_response = self.llm.generate(&prompt, &system_prompt, None, None).await?;

        let turn_number = self.record_npc_turn(&mut conversation, &npc_response, rag_used).await?;

        Ok(ChatOutcome {
            response: npc_response,
            turn_number,
            session_id: session_id.to_string(),
        })
    }

    /// Same pipeline, but generation deltas are yielded as they arrive and
    /// the NPC turn is persisted once the stream is drained.
    pub async fn process_message_stream(
        self: Arc<Self>,
        session_id: String,
        user_message: String,
        use_rag: bool,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<ChatStreamEvent, ApiError>> + Send>>, ApiError>
    {
        let (mut conversation, prompt, system_prompt, rag_used) =
            self.prepare_turn(&session_id, &user_message, use_rag).await?;

        let mut deltas = self.llm.generate_stream(&prompt, &system_prompt).await?;
        let service = self.clone();

        let stream = async_stream::try_stream! {
            let mut full_response = String::new();

            while let Some(delta) = deltas.next().await {
                let delta = delta?;
                full_response.push_str(&delta);
                yield ChatStreamEvent::Delta(delta);
            }

            let turn_number = service
                .record_npc_turn(&mut conversation, &full_response, rag_used)
                .await?;
            yield ChatStreamEvent::Completed { turn_number };
        };

        Ok(Box::pin(stream))
    }

    /// Shared front half of the pipeline: validate, load, append the user
    /// turn, retrieve context, assemble the prompt, enforce the context
    /// budget.
    async fn prepare_turn(
        &self,
        session_id: &str,
        user_message: &str,
        use_rag: bool,
    ) -> Result<(Conversation, String, String, bool), ApiError> {
        if user_message.trim().is_empty() {
            return Err(ApiError::InvalidTurn("Message must not be empty".to_string()));
        }

        let mut conversation = self.sessions.load_session(session_id).await?;

        let (intent, confidence) = IntentDetector::detect_with_confidence(user_message);
        let mut metadata = Map::new();
        metadata.insert("intent".to_string(), json!(intent.as_str()));
        metadata.insert("intent_confidence".to_string(), json!(confidence));
        conversation.add_turn(Speaker::User, user_message, Some(metadata));

        let rag_context = if use_rag && self.retriever.is_some() {
            self.retrieve_context(user_message).await?
        } else {
            String::new()
        };
        let rag_used = !rag_context.is_empty();

        let prompt = build_prompt(&conversation, &rag_context);
        let system_prompt = personas::system_prompt(&conversation.npc.name)?.to_string();

        let estimated = token_estimator::estimate_payload_tokens(&system_prompt, &prompt);
        if estimated > self.max_context_tokens {
            return Err(ApiError::ContextWindowExceeded(format!(
                "Estimated {estimated} tokens exceeds the {} token budget",
                self.max_context_tokens
            )));
        }

        Ok((conversation, prompt, system_prompt, rag_used))
    }

    async fn record_npc_turn(
        &self,
        conversation: &mut Conversation,
        npc_response: &str,
        rag_used: bool,
    ) -> Result<u32, ApiError> {
        let mut metadata = Map::new();
        metadata.insert("rag_used".to_string(), json!(rag_used));
        let turn_number = conversation
            .add_turn(Speaker::Npc, npc_response, Some(metadata))
            .turn_number;

        self.sessions.save_session(conversation).await?;
        Ok(turn_number)
    }

    async fn retrieve_context(&self, query: &str) -> Result<String, ApiError> {
        let Some(retriever) = &self.retriever else {
            return Ok(String::new());
        };

        let results = retriever.retrieve(query, RETRIEVE_TOP_K, 0.0, None).await?;
        if results.is_empty() {
            return Ok(String::new());
        }

        debug!(results = results.len(), "Retrieved context chunks");
        let parts: Vec<&str> = results.iter().map(|r| r.content.as_str()).collect();
        Ok(parts.join("\n---\n"))
    }
}
