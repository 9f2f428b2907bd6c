use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::models::{ConversationRow, SummaryRow, TurnRow};
use super::DbPool;
use crate::domain::{Conversation, ConversationSummary};
use crate::memory::ConversationStore;
use crate::utils::error::ApiError;

/// Durable conversation persistence in PostgreSQL.
///
/// The full in-memory Conversation is always the source of truth being
/// persisted; `save_conversation` replaces the entire turn set inside one
/// transaction rather than diffing (turns are append-only, so the replaced
/// set is a superset of the old one).
pub struct ConversationRepository {
    pool: DbPool,
}

impl ConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they don't exist.
    pub async fn ensure_tables(&self) -> Result<()> {
        let pool = self.pool.get_pool();

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                npc_name TEXT NOT NULL,
                npc_role_title TEXT NOT NULL DEFAULT '',
                npc_data JSONB NOT NULL,
                scenario_data JSONB,
                hints_data JSONB NOT NULL DEFAULT '[]'::jsonb,
                status TEXT NOT NULL,
                started_at TIMESTAMP WITH TIME ZONE NOT NULL,
                ended_at TIMESTAMP WITH TIME ZONE
            )"#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS turns (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
                turn_number INT NOT NULL,
                speaker TEXT NOT NULL,
                content TEXT NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL
            )"#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversations_user ON conversations(user_id)",
        )
        .execute(pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_turns_conversation
             ON turns(conversation_id, turn_number)",
        )
        .execute(pool)
        .await?;

        debug!("Conversation tables ensured");
        Ok(())
    }

    pub async fn save(&self, conversation: &Conversation) -> Result<()> {
        let npc_data =
            serde_json::to_value(&conversation.npc).context("failed to serialize npc snapshot")?;
        let scenario_data: Option<Value> = conversation
            .scenario
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .context("failed to serialize scenario snapshot")?;
        let hints_data =
            serde_json::to_value(&conversation.hints).context("failed to serialize hints")?;

        let mut transaction = self.pool.get_pool().begin().await?;

        sqlx::query(
            r#"INSERT INTO conversations
                   (id, user_id, npc_name, npc_role_title, npc_data, scenario_data,
                    hints_data, status, started_at, ended_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               ON CONFLICT (id) DO UPDATE SET
                   npc_data = EXCLUDED.npc_data,
                   scenario_data = EXCLUDED.scenario_data,
                   hints_data = EXCLUDED.hints_data,
                   status = EXCLUDED.status,
                   ended_at = EXCLUDED.ended_at"#,
        )
        .bind(&conversation.id)
        .bind(&conversation.user_id)
        .bind(&conversation.npc.name)
        .bind(&conversation.npc.role_title)
        .bind(&npc_data)
        .bind(&scenario_data)
        .bind(&hints_data)
        .bind(conversation.status.as_str())
        .bind(conversation.started_at)
        .bind(conversation.ended_at)
        .execute(&mut *transaction)
        .await?;

        sqlx::query("DELETE FROM turns WHERE conversation_id = $1")
            .bind(&conversation.id)
            .execute(&mut *transaction)
            .await?;

        for turn in &conversation.turns {
            sqlx::query(
                r#"INSERT INTO turns
                       (id, conversation_id, turn_number, speaker, content, metadata, created_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            )
            .bind(&turn.id)
            .bind(&conversation.id)
            .bind(turn.turn_number as i32)
            .bind(turn.speaker.as_str())
            .bind(&turn.content)
            .bind(Value::Object(turn.metadata.clone()))
            .bind(turn.created_at)
            .execute(&mut *transaction)
            .await?;
        }

        transaction.commit().await?;

        debug!(
            session_id = %conversation.id,
            turns = conversation.turns.len(),
            "Conversation saved to PostgreSQL"
        );
        Ok(())
    }

    pub async fn load(&self, session_id: &str) -> Result<Option<Conversation>> {
        let pool = self.pool.get_pool();

        let row: Option<ConversationRow> = sqlx::query_as(
            r#"SELECT id, user_id, npc_name, npc_role_title, npc_data, scenario_data,
                      hints_data, status, started_at, ended_at
               FROM conversations
               WHERE id = $1"#,
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let turn_rows: Vec<TurnRow> = sqlx::query_as(
            r#"SELECT id, conversation_id, turn_number, speaker, content, metadata, created_at
               FROM turns
               WHERE conversation_id = $1
               ORDER BY turn_number"#,
        )
        .bind(session_id)
        .fetch_all(pool)
        .await?;

        let turns = turn_rows
            .into_iter()
            .map(TurnRow::into_domain)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(row.into_domain(turns)?))
    }

    pub async fn delete(&self, session_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(session_id)
            .execute(self.pool.get_pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<ConversationSummary>> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"SELECT c.id, c.npc_name, c.npc_role_title, c.status, c.started_at, c.ended_at,
                      (SELECT COUNT(*) FROM turns t WHERE t.conversation_id = c.id) AS turn_count
               FROM conversations c
               WHERE c.user_id = $1
               ORDER BY c.started_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.into_iter().map(SummaryRow::into_domain).collect()
    }
}

#[async_trait]
impl ConversationStore for ConversationRepository {
    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), ApiError> {
        self.save(conversation)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    async fn load_conversation(&self, session_id: &str) -> Result<Option<Conversation>, ApiError> {
        self.load(session_id)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    async fn delete_conversation(&self, session_id: &str) -> Result<bool, ApiError> {
        self.delete(session_id)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>, ApiError> {
        self.list(user_id)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    async fn close(&self) -> Result<(), ApiError> {
        self.pool.close().await;
        Ok(())
    }
}
