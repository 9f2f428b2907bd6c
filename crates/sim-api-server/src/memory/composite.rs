use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::ConversationStore;
use crate::domain::{Conversation, ConversationSummary};
use crate::utils::error::ApiError;

/// Dual-tier conversation store: a TTL-bound cache in front of a durable
/// store.
///
/// Write strategy: the cache write is load-bearing; the durable write is
/// best-effort. Read strategy: cache first, durable fallback with
/// read-through repopulation. Only cache failures propagate — the cache is
/// what active sessions depend on every turn, while degraded durable
/// availability only affects retention and cross-session listing.
///
/// There is no per-session mutual exclusion: concurrent saves for one
/// session race and the last write wins (see DESIGN.md).
pub struct CompositeMemoryStore {
    cache: Arc<dyn ConversationStore>,
    durable: Arc<dyn ConversationStore>,
}

impl CompositeMemoryStore {
    pub fn new(cache: Arc<dyn ConversationStore>, durable: Arc<dyn ConversationStore>) -> Self {
        Self { cache, durable }
    }
}

#[async_trait]
impl ConversationStore for CompositeMemoryStore {
    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), ApiError> {
        self.cache.save_conversation(conversation).await?;

        if let Err(e) = self.durable.save_conversation(conversation).await {
            error!(
                session_id = %conversation.id,
                error = %e,
                "Durable save failed (cache still holds the latest state)"
            );
        }

        Ok(())
    }

    async fn load_conversation(&self, session_id: &str) -> Result<Option<Conversation>, ApiError> {
        if let Some(conversation) = self.cache.load_conversation(session_id).await? {
            return Ok(Some(conversation));
        }

        info!(session_id, "Session not cached, loading from durable store");
        let conversation = self.durable.load_conversation(session_id).await?;

        if let Some(conversation) = &conversation {
            if let Err(e) = self.cache.save_conversation(conversation).await {
                warn!(session_id, error = %e, "Failed to re-cache conversation");
            }
        }

        Ok(conversation)
    }

    async fn delete_conversation(&self, session_id: &str) -> Result<bool, ApiError> {
        let cache_deleted = self.cache.delete_conversation(session_id).await?;

        let durable_deleted = match self.durable.delete_conversation(session_id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                error!(session_id, error = %e, "Durable delete failed");
                false
            }
        };

        Ok(cache_deleted || durable_deleted)
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>, ApiError> {
        match self.durable.list_conversations(user_id).await {
            Ok(summaries) => Ok(summaries),
            Err(e) => {
                error!(
                    user_id,
                    error = %e,
                    "Durable listing failed, falling back to cache-resident sessions"
                );
                self.cache.list_conversations(user_id).await
            }
        }
    }

    async fn close(&self) -> Result<(), ApiError> {
        self.cache.close().await?;
        self.durable.close().await
    }
}
