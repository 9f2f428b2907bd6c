use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

use crate::domain::{
    Conversation, ConversationSummary, Npc, ScenarioState, SimulationStatus, Speaker, Turn,
};

#[derive(Debug, FromRow)]
pub struct ConversationRow {
    pub id: String,
    pub user_id: String,
    pub npc_name: String,
    pub npc_role_title: String,
    pub npc_data: Value,
    pub scenario_data: Option<Value>,
    pub hints_data: Value,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
pub struct TurnRow {
    pub id: String,
    pub conversation_id: String,
    pub turn_number: i32,
    pub speaker: String,
    pub content: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct SummaryRow {
    pub id: String,
    pub npc_name: String,
    pub npc_role_title: String,
    pub status: String,
    pub turn_count: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl TurnRow {
    pub fn into_domain(self) -> Result<Turn> {
        let speaker = Speaker::from_str(&self.speaker)
            .with_context(|| format!("unknown speaker '{}'", self.speaker))?;
        let metadata = match self.metadata {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        Ok(Turn {
            id: self.id,
            turn_number: self.turn_number as u32,
            speaker,
            content: self.content,
            metadata,
            created_at: self.created_at,
        })
    }
}

impl ConversationRow {
    pub fn into_domain(self, turns: Vec<Turn>) -> Result<Conversation> {
        let npc: Npc = serde_json::from_value(self.npc_data)
            .with_context(|| format!("invalid npc snapshot for conversation {}", self.id))?;
        let scenario: Option<ScenarioState> = self
            .scenario_data
            .map(serde_json::from_value)
            .transpose()
            .with_context(|| format!("invalid scenario snapshot for conversation {}", self.id))?;
        let hints = serde_json::from_value(self.hints_data)
            .with_context(|| format!("invalid hints for conversation {}", self.id))?;
        let status = SimulationStatus::from_str(&self.status)
            .with_context(|| format!("unknown status '{}'", self.status))?;

        Ok(Conversation {
            id: self.id,
            user_id: self.user_id,
            npc,
            scenario,
            turns,
            status,
            hints,
            started_at: self.started_at,
            ended_at: self.ended_at,
        })
    }
}

impl SummaryRow {
    pub fn into_domain(self) -> Result<ConversationSummary> {
        let status = SimulationStatus::from_str(&self.status)
            .with_context(|| format!("unknown status '{}'", self.status))?;

        Ok(ConversationSummary {
            id: self.id,
            npc_name: self.npc_name,
            npc_role_title: self.npc_role_title,
            status,
            turn_count: self.turn_count as u32,
            started_at: self.started_at,
            ended_at: self.ended_at,
        })
    }
}
