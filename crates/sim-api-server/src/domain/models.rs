//! Core business entities: Conversation, Turn, NPC, ScenarioState, Hint.
//!
//! Pure data types with no storage or transport dependencies. A
//! `Conversation` is the aggregate root; `Turn`s are value objects that are
//! never mutated after construction and only appended by their owning
//! conversation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Who is speaking in a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Npc,
    System,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Npc => "npc",
            Speaker::System => "system",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Speaker::User),
            "npc" => Some(Speaker::Npc),
            "system" => Some(Speaker::System),
            _ => None,
        }
    }

    /// Capitalized label used in prompt transcripts.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Npc => "Npc",
            Speaker::System => "System",
        }
    }
}

/// Status of a simulation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    Active,
    Completed,
    Archived,
}

impl SimulationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationStatus::Active => "active",
            SimulationStatus::Completed => "completed",
            SimulationStatus::Archived => "archived",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "active" => Some(SimulationStatus::Active),
            "completed" => Some(SimulationStatus::Completed),
            "archived" => Some(SimulationStatus::Archived),
            _ => None,
        }
    }
}

/// A single exchange in a conversation. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub turn_number: u32,
    pub speaker: Speaker,
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    fn new(turn_number: u32, speaker: Speaker, content: String, metadata: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            turn_number,
            speaker,
            content,
            metadata,
            created_at: Utc::now(),
        }
    }
}

/// Contextual suggestion surfaced to the user during a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub id: String,
    pub content: String,
    pub hint_type: String,
    pub relevance_score: f64,
    pub created_at: DateTime<Utc>,
}

/// An AI persona (non-player character). One snapshot is stored per
/// conversation; editing a persona definition never rewrites history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub role_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub traits: BTreeMap<String, f64>,
    #[serde(default)]
    pub communication_style: Map<String, Value>,
    #[serde(default)]
    pub knowledge_domains: Vec<String>,
}

/// Progress of a running scenario, owned by its conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioState {
    pub scenario_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_difficulty")]
    pub difficulty_level: u32,
    #[serde(default = "default_phase")]
    pub current_phase: String,
    #[serde(default)]
    pub objectives_met: Vec<String>,
    #[serde(default)]
    pub is_complete: bool,
}

fn default_difficulty() -> u32 {
    1
}

fn default_phase() -> String {
    "introduction".to_string()
}

impl ScenarioState {
    pub fn new(scenario_id: impl Into<String>) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            title: String::new(),
            description: String::new(),
            difficulty_level: default_difficulty(),
            current_phase: default_phase(),
            objectives_met: Vec::new(),
            is_complete: false,
        }
    }
}

/// Aggregate root: a full conversation session between a user and an NPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub npc: Npc,
    #[serde(default)]
    pub scenario: Option<ScenarioState>,
    #[serde(default)]
    pub turns: Vec<Turn>,
    pub status: SimulationStatus,
    #[serde(default)]
    pub hints: Vec<Hint>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn new(user_id: impl Into<String>, npc: Npc) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            npc,
            scenario: None,
            turns: Vec::new(),
            status: SimulationStatus::Active,
            hints: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_scenario(mut self, scenario: ScenarioState) -> Self {
        self.scenario = Some(scenario);
        self
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Create and append a new turn. Turn numbers are assigned here and only
    /// here, so the n-th turn always carries `turn_number == n`.
    pub fn add_turn(
        &mut self,
        speaker: Speaker,
        content: impl Into<String>,
        metadata: Option<Map<String, Value>>,
    ) -> &Turn {
        let turn = Turn::new(
            self.turn_count() as u32 + 1,
            speaker,
            content.into(),
            metadata.unwrap_or_default(),
        );
        self.turns.push(turn);
        self.turns.last().expect("turn was just pushed")
    }

    pub fn add_hint(&mut self, content: impl Into<String>, hint_type: impl Into<String>, score: f64) -> &Hint {
        let hint = Hint {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            hint_type: hint_type.into(),
            relevance_score: score,
            created_at: Utc::now(),
        };
        self.hints.push(hint);
        self.hints.last().expect("hint was just pushed")
    }

    /// Mark the conversation as completed and stamp the end time.
    pub fn end_conversation(&mut self) {
        self.status = SimulationStatus::Completed;
        self.ended_at = Some(Utc::now());
    }
}

/// Lightweight listing entry, shared by both storage tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub npc_name: String,
    pub npc_role_title: String,
    pub status: SimulationStatus,
    pub turn_count: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ConversationSummary {
    pub fn from_conversation(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id.clone(),
            npc_name: conversation.npc.name.clone(),
            npc_role_title: conversation.npc.role_title.clone(),
            status: conversation.status,
            turn_count: conversation.turn_count() as u32,
            started_at: conversation.started_at,
            ended_at: conversation.ended_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_npc() -> Npc {
        Npc {
            id: "npc-1".to_string(),
            name: "meridian_ceo".to_string(),
            role_title: "Chief Executive Officer".to_string(),
            company: "Meridian Group".to_string(),
            traits: BTreeMap::new(),
            communication_style: Map::new(),
            knowledge_domains: vec![],
        }
    }

    #[test]
    fn test_turn_numbers_are_sequential() {
        let mut conversation = Conversation::new("user-1", test_npc());

        for i in 1..=25u32 {
            let number = conversation
                .add_turn(
                    if i % 2 == 1 { Speaker::User } else { Speaker::Npc },
                    format!("message {i}"),
                    None,
                )
                .turn_number;
            assert_eq!(number, i);
        }

        assert_eq!(conversation.turn_count(), 25);
        for (idx, turn) in conversation.turns.iter().enumerate() {
            assert_eq!(turn.turn_number as usize, idx + 1);
        }
    }

    #[test]
    fn test_end_conversation_sets_status_and_timestamp() {
        let mut conversation = Conversation::new("user-1", test_npc());
        assert_eq!(conversation.status, SimulationStatus::Active);
        assert!(conversation.ended_at.is_none());

        conversation.end_conversation();

        assert_eq!(conversation.status, SimulationStatus::Completed);
        assert!(conversation.ended_at.is_some());
    }

    #[test]
    fn test_serde_round_trip_is_deep_equal() {
        let mut conversation = Conversation::new("user-1", test_npc());
        conversation.add_turn(Speaker::User, "hello", None);
        let mut metadata = Map::new();
        metadata.insert("rag_used".to_string(), Value::Bool(true));
        conversation.add_turn(Speaker::Npc, "hi there", Some(metadata));
        conversation.add_hint("try asking about the budget", "suggestion", 0.8);

        let json = serde_json::to_string(&conversation).unwrap();
        let restored: Conversation = serde_json::from_str(&json).unwrap();

        assert_eq!(conversation, restored);
    }

    #[test]
    fn test_last_turn() {
        let mut conversation = Conversation::new("user-1", test_npc());
        assert!(conversation.last_turn().is_none());

        conversation.add_turn(Speaker::User, "first", None);
        conversation.add_turn(Speaker::Npc, "second", None);

        assert_eq!(conversation.last_turn().unwrap().content, "second");
    }

    #[test]
    fn test_summary_reflects_conversation() {
        let mut conversation = Conversation::new("user-1", test_npc());
        conversation.add_turn(Speaker::User, "hello", None);

        let summary = ConversationSummary::from_conversation(&conversation);
        assert_eq!(summary.id, conversation.id);
        assert_eq!(summary.npc_name, "meridian_ceo");
        assert_eq!(summary.turn_count, 1);
        assert_eq!(summary.status, SimulationStatus::Active);
    }
}
