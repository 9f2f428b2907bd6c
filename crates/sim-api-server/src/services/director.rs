use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use crate::domain::Conversation;
use crate::services::chat_service::LlmProvider;
use crate::utils::error::ApiError;

const DIRECTOR_SYSTEM_PROMPT: &str = r#"You are the Director — a hidden supervisor overseeing a workplace simulation between a user and an AI NPC. Your job is to analyze the conversation quality.

Your responsibilities:
1. Assess the user's communication effectiveness (clarity, confidence, professionalism).
2. Evaluate whether the NPC is staying in character.
3. Identify if the user needs guidance (hints).
4. Flag any conversation that is going off-track or becoming unproductive.

Output your analysis as structured JSON:
{
    "user_assessment": {
        "confidence_level": 0.0-1.0,
        "professionalism": 0.0-1.0,
        "clarity": 0.0-1.0,
        "communication_style": "assertive|passive|aggressive|passive-aggressive"
    },
    "npc_assessment": {
        "in_character": true/false,
        "response_quality": 0.0-1.0
    },
    "intervention": {
        "needed": true/false,
        "type": "hint|redirect|none",
        "message": "optional message for the user or NPC"
    },
    "overall_score": 0.0-1.0
}"#;

/// Meta-agent that reviews the ongoing conversation and produces a quality
/// assessment.
pub struct DirectorService {
    llm: Arc<dyn LlmProvider>,
}

impl DirectorService {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Analyze the last `last_n_turns` turns and return the raw structured
    /// assessment.
    pub async fn analyze_conversation(
        &self,
        conversation: &Conversation,
        last_n_turns: usize,
    ) -> Result<Value, ApiError> {
        let window_start = conversation.turns.len().saturating_sub(last_n_turns);
        let recent_turns = &conversation.turns[window_start..];

        if recent_turns.is_empty() {
            return Ok(Self::empty_assessment());
        }

        let history_text: String = recent_turns
            .iter()
            .map(|t| format!("{}: {}", t.speaker.label(), t.content))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Analyze the following conversation excerpt between a User and an NPC named \"{}\" ({}).\n\nConversation:\n{}\n\nProvide your analysis.",
            conversation.npc.name, conversation.npc.role_title, history_text
        );

        info!(
            session_id = %conversation.id,
            turns_analyzed = recent_turns.len(),
            "Director analyzing conversation"
        );

        // Low temperature keeps assessments comparable across calls.
        let response = self
            .llm
            .generate(&prompt, DIRECTOR_SYSTEM_PROMPT, Some(0.3), None)
            .await?;

        Ok(json!({
            "raw_analysis": response,
            "session_id": conversation.id,
            "turns_analyzed": recent_turns.len(),
        }))
    }

    /// Quick intervention check; returns a hint message when one is needed.
    pub async fn should_intervene(
        &self,
        conversation: &Conversation,
    ) -> Result<Option<String>, ApiError> {
        if conversation.turn_count() < 2 {
            return Ok(None);
        }

        let analysis = self.analyze_conversation(conversation, 4).await?;
        let hint = analysis
            .get("raw_analysis")
            .and_then(Value::as_str)
            .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
            .filter(|parsed| {
                parsed
                    .pointer("/intervention/needed")
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
            })
            .and_then(|parsed| {
                parsed
                    .pointer("/intervention/message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });

        Ok(hint)
    }

    fn empty_assessment() -> Value {
        json!({
            "user_assessment": {
                "confidence_level": 0.0,
                "professionalism": 0.0,
                "clarity": 0.0,
                "communication_style": "unknown",
            },
            "npc_assessment": {
                "in_character": true,
                "response_quality": 0.0,
            },
            "intervention": {
                "needed": false,
                "type": "none",
                "message": "",
            },
            "overall_score": 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Speaker;
    use crate::personas;
    use crate::services::chat_service::MockLlmProvider;

    fn conversation_with_turns(n: usize) -> Conversation {
        let npc = personas::get_persona("meridian_chro").unwrap().to_npc();
        let mut conversation = Conversation::new("user-1", npc);
        for i in 1..=n {
            let speaker = if i % 2 == 1 { Speaker::User } else { Speaker::Npc };
            conversation.add_turn(speaker, format!("turn {i}"), None);
        }
        conversation
    }

    #[tokio::test]
    async fn test_empty_conversation_returns_default_assessment() {
        let director = DirectorService::new(Arc::new(MockLlmProvider::new()));
        let analysis = director
            .analyze_conversation(&conversation_with_turns(0), 6)
            .await
            .unwrap();

        assert_eq!(analysis["overall_score"], 0.0);
        assert_eq!(analysis["intervention"]["needed"], false);
    }

    #[tokio::test]
    async fn test_analysis_covers_requested_window() {
        let mut llm = MockLlmProvider::new();
        llm.expect_generate().returning(|prompt, _, temperature, _| {
            assert!(prompt.contains("turn 8"));
            assert!(!prompt.contains("turn 2"));
            assert_eq!(temperature, Some(0.3));
            Ok("{\"overall_score\": 0.7}".to_string())
        });

        let director = DirectorService::new(Arc::new(llm));
        let analysis = director
            .analyze_conversation(&conversation_with_turns(8), 6)
            .await
            .unwrap();

        assert_eq!(analysis["turns_analyzed"], 6);
        assert!(analysis["raw_analysis"].as_str().unwrap().contains("0.7"));
    }

    #[tokio::test]
    async fn test_intervention_parsed_from_analysis() {
        let mut llm = MockLlmProvider::new();
        llm.expect_generate().returning(|_, _, _, _| {
            Ok(r#"{"intervention": {"needed": true, "type": "hint", "message": "Ask about the budget."}}"#.to_string())
        });

        let director = DirectorService::new(Arc::new(llm));
        let hint = director
            .should_intervene(&conversation_with_turns(4))
            .await
            .unwrap();

        assert_eq!(hint.as_deref(), Some("Ask about the budget."));
    }

    #[tokio::test]
    async fn test_too_early_for_intervention() {
        let director = DirectorService::new(Arc::new(MockLlmProvider::new()));
        let hint = director
            .should_intervene(&conversation_with_turns(1))
            .await
            .unwrap();
        assert!(hint.is_none());
    }
}
