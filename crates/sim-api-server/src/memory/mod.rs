//! Conversation persistence tiers.
//!
//! Both tiers (Redis cache, Postgres durable store) satisfy the same
//! `ConversationStore` contract; `CompositeMemoryStore` combines them into
//! the store the rest of the application talks to.

pub mod composite;
pub mod redis_store;

use async_trait::async_trait;

use crate::domain::{Conversation, ConversationSummary};
use crate::utils::error::ApiError;

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persist the full conversation state, overwriting any previous state.
    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), ApiError>;

    /// Load a conversation by session id. `None` when absent.
    async fn load_conversation(&self, session_id: &str) -> Result<Option<Conversation>, ApiError>;

    /// Delete a conversation. Returns true if something was removed.
    async fn delete_conversation(&self, session_id: &str) -> Result<bool, ApiError>;

    /// List conversation summaries for a user.
    async fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>, ApiError>;

    /// Release backend connections.
    async fn close(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

pub use composite::CompositeMemoryStore;
pub use redis_store::RedisMemoryStore;
