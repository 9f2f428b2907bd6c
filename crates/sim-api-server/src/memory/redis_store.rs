use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::OnceCell;
use tracing::debug;

use super::ConversationStore;
use crate::domain::{Conversation, ConversationSummary};
use crate::utils::error::ApiError;

const KEY_PREFIX: &str = "session";
const USER_INDEX_PREFIX: &str = "user_sessions";

/// Redis-backed session cache.
///
/// Conversations are stored as JSON under `session:{id}` with a TTL, plus a
/// per-user SET index `user_sessions:{user_id}` so listing does not scan the
/// keyspace. Record and index are written in one MULTI/EXEC pipeline; index
/// entries are allowed to go stale and are filtered at read time.
pub struct RedisMemoryStore {
    client: redis::Client,
    session_ttl: u64,
    conn: OnceCell<ConnectionManager>,
}

impl RedisMemoryStore {
    pub fn new(redis_url: &str, session_ttl: u64) -> Result<Self, ApiError> {
        let client = redis::Client::open(redis_url).map_err(|e| {
            ApiError::MemoryStoreUnavailable(format!("Invalid Redis URL: {e}"))
        })?;
        Ok(Self {
            client,
            session_ttl,
            conn: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, ApiError> {
        let manager = self
            .conn
            .get_or_try_init(|| async { ConnectionManager::new(self.client.clone()).await })
            .await
            .map_err(|e| {
                ApiError::MemoryStoreUnavailable(format!("Failed to connect to Redis: {e}"))
            })?;
        Ok(manager.clone())
    }

    fn key(session_id: &str) -> String {
        format!("{KEY_PREFIX}:{session_id}")
    }

    fn user_index_key(user_id: &str) -> String {
        format!("{USER_INDEX_PREFIX}:{user_id}")
    }
}

#[async_trait]
impl ConversationStore for RedisMemoryStore {
    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), ApiError> {
        let mut conn = self.connection().await?;

        let data = serde_json::to_string(conversation).map_err(|e| {
            ApiError::MemoryStoreUnavailable(format!("Failed to serialize conversation: {e}"))
        })?;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .set_ex(Self::key(&conversation.id), data, self.session_ttl)
            .ignore()
            .sadd(Self::user_index_key(&conversation.user_id), &conversation.id)
            .ignore();

        let _: () = pipe.query_async(&mut conn).await.map_err(|e| {
            ApiError::MemoryStoreUnavailable(format!("Failed to save conversation: {e}"))
        })?;

        debug!(session_id = %conversation.id, "Conversation cached");
        Ok(())
    }

    async fn load_conversation(&self, session_id: &str) -> Result<Option<Conversation>, ApiError> {
        let mut conn = self.connection().await?;

        let data: Option<String> = conn.get(Self::key(session_id)).await.map_err(|e| {
            ApiError::MemoryStoreUnavailable(format!("Failed to load conversation: {e}"))
        })?;

        match data {
            None => Ok(None),
            Some(json) => {
                let conversation = serde_json::from_str(&json).map_err(|e| {
                    ApiError::MemoryStoreUnavailable(format!(
                        "Failed to deserialize conversation: {e}"
                    ))
                })?;
                Ok(Some(conversation))
            }
        }
    }

    async fn delete_conversation(&self, session_id: &str) -> Result<bool, ApiError> {
        let mut conn = self.connection().await?;

        let deleted: i64 = conn.del(Self::key(session_id)).await.map_err(|e| {
            ApiError::MemoryStoreUnavailable(format!("Failed to delete conversation: {e}"))
        })?;

        Ok(deleted > 0)
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>, ApiError> {
        let mut conn = self.connection().await?;

        let session_ids: Vec<String> =
            conn.smembers(Self::user_index_key(user_id)).await.map_err(|e| {
                ApiError::MemoryStoreUnavailable(format!("Failed to list sessions: {e}"))
            })?;

        let mut summaries = Vec::with_capacity(session_ids.len());
        for session_id in session_ids {
            let data: Option<String> = conn.get(Self::key(&session_id)).await.map_err(|e| {
                ApiError::MemoryStoreUnavailable(format!("Failed to read session {session_id}: {e}"))
            })?;

            // Expired records leave stale index entries behind; skip them.
            let Some(json) = data else {
                continue;
            };
            let conversation: Conversation = serde_json::from_str(&json).map_err(|e| {
                ApiError::MemoryStoreUnavailable(format!(
                    "Failed to deserialize session {session_id}: {e}"
                ))
            })?;
            summaries.push(ConversationSummary::from_conversation(&conversation));
        }

        Ok(summaries)
    }

    async fn close(&self) -> Result<(), ApiError> {
        // ConnectionManager closes its multiplexed connection on drop; there
        // is no explicit shutdown in the redis API.
        Ok(())
    }
}
