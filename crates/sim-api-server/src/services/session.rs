use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;

use crate::domain::{Conversation, ConversationSummary, Npc, ScenarioState, Speaker};
use crate::memory::ConversationStore;
use crate::utils::error::ApiError;

/// Thin façade translating session identifiers into load/save calls against
/// the composite memory store. The only typed failure it introduces is
/// `ConversationNotFound`.
pub struct SessionManager {
    memory: Arc<dyn ConversationStore>,
}

impl SessionManager {
    pub fn new(memory: Arc<dyn ConversationStore>) -> Self {
        Self { memory }
    }

    pub async fn create_session(
        &self,
        user_id: &str,
        npc: Npc,
        scenario_id: Option<String>,
    ) -> Result<Conversation, ApiError> {
        let mut conversation = Conversation::new(user_id, npc);
        if let Some(scenario_id) = scenario_id {
            conversation = conversation.with_scenario(ScenarioState::new(scenario_id));
        }

        self.memory.save_conversation(&conversation).await?;
        info!(
            session_id = %conversation.id,
            user_id,
            npc = %conversation.npc.name,
            "Session created"
        );
        Ok(conversation)
    }

    /// Create a session under a caller-chosen id (used by the transport
    /// boundary's auto-create policy).
    pub async fn create_session_with_id(
        &self,
        session_id: &str,
        user_id: &str,
        npc: Npc,
    ) -> Result<Conversation, ApiError> {
        let conversation = Conversation::new(user_id, npc).with_id(session_id);
        self.memory.save_conversation(&conversation).await?;
        info!(session_id, user_id, "Session created");
        Ok(conversation)
    }

    pub async fn load_session(&self, session_id: &str) -> Result<Conversation, ApiError> {
        self.memory
            .load_conversation(session_id)
            .await?
            .ok_or_else(|| {
                ApiError::ConversationNotFound(format!("Session '{session_id}' not found"))
            })
    }

    pub async fn save_session(&self, conversation: &Conversation) -> Result<(), ApiError> {
        self.memory.save_conversation(conversation).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<bool, ApiError> {
        let deleted = self.memory.delete_conversation(session_id).await?;
        if deleted {
            info!(session_id, "Session deleted");
        }
        Ok(deleted)
    }

    pub async fn list_user_sessions(
        &self,
        user_id: &str,
    ) -> Result<Vec<ConversationSummary>, ApiError> {
        self.memory.list_conversations(user_id).await
    }

    /// Load, append one turn, save, return the updated conversation.
    pub async fn add_turn_to_session(
        &self,
        session_id: &str,
        speaker: Speaker,
        content: &str,
        metadata: Option<Map<String, Value>>,
    ) -> Result<Conversation, ApiError> {
        let mut conversation = self.load_session(session_id).await?;
        conversation.add_turn(speaker, content, metadata);
        self.save_session(&conversation).await?;
        Ok(conversation)
    }

    /// Mark a session completed and persist the final state.
    pub async fn end_session(&self, session_id: &str) -> Result<Conversation, ApiError> {
        let mut conversation = self.load_session(session_id).await?;
        conversation.end_conversation();
        self.save_session(&conversation).await?;
        info!(session_id, "Session ended");
        Ok(conversation)
    }
}
