pub mod models;

pub use models::{
    Conversation, ConversationSummary, Hint, Npc, ScenarioState, SimulationStatus, Speaker, Turn,
};
