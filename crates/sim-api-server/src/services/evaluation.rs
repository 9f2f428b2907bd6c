use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use crate::domain::Conversation;
use crate::services::chat_service::LlmProvider;
use crate::utils::error::ApiError;

const EVALUATION_SYSTEM_PROMPT: &str = r#"You are an evaluation expert assessing a user's performance in a workplace simulation. Analyze the full conversation and score the user on the following competencies:

1. **Communication** (0-10): Clarity, professionalism, active listening.
2. **Negotiation** (0-10): Assertiveness, compromise ability, value creation.
3. **Decision Making** (0-10): Analytical thinking, risk assessment, timeliness.
4. **Emotional Intelligence** (0-10): Empathy, self-awareness, conflict management.
5. **Strategic Thinking** (0-10): Big-picture awareness, long-term planning.

Output your evaluation as JSON:
{
    "scores": {
        "communication": 0,
        "negotiation": 0,
        "decision_making": 0,
        "emotional_intelligence": 0,
        "strategic_thinking": 0
    },
    "overall_score": 0.0,
    "strengths": ["..."],
    "areas_for_improvement": ["..."],
    "summary": "..."
}"#;

/// Post-session assessment over the full transcript.
pub struct EvaluationService {
    llm: Arc<dyn LlmProvider>,
}

impl EvaluationService {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    pub async fn evaluate_session(&self, conversation: &Conversation) -> Result<Value, ApiError> {
        if conversation.turn_count() == 0 {
            return Ok(Self::empty_evaluation());
        }

        let transcript: String = conversation
            .turns
            .iter()
            .map(|t| format!("{}: {}", t.speaker.label(), t.content))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Evaluate the user's performance in this workplace simulation.\n\nNPC: {} ({})\nTotal Turns: {}\n\nFull Transcript:\n{}\n\nProvide your detailed evaluation.",
            conversation.npc.name,
            conversation.npc.role_title,
            conversation.turn_count(),
            transcript
        );

        info!(
            session_id = %conversation.id,
            turns = conversation.turn_count(),
            "Evaluating session"
        );

        let response = self
            .llm
            .generate(&prompt, EVALUATION_SYSTEM_PROMPT, Some(0.2), None)
            .await?;

        Ok(json!({
            "raw_evaluation": response,
            "session_id": conversation.id,
            "npc_name": conversation.npc.name,
            "total_turns": conversation.turn_count(),
        }))
    }

    fn empty_evaluation() -> Value {
        json!({
            "scores": {
                "communication": 0,
                "negotiation": 0,
                "decision_making": 0,
                "emotional_intelligence": 0,
                "strategic_thinking": 0,
            },
            "overall_score": 0.0,
            "strengths": [],
            "areas_for_improvement": [],
            "summary": "No turns to evaluate.",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Speaker;
    use crate::personas;
    use crate::services::chat_service::MockLlmProvider;

    #[tokio::test]
    async fn test_empty_session_gets_default_evaluation() {
        let npc = personas::get_persona("meridian_ceo").unwrap().to_npc();
        let conversation = Conversation::new("user-1", npc);

        let service = EvaluationService::new(Arc::new(MockLlmProvider::new()));
        let evaluation = service.evaluate_session(&conversation).await.unwrap();

        assert_eq!(evaluation["summary"], "No turns to evaluate.");
        assert_eq!(evaluation["overall_score"], 0.0);
    }

    #[tokio::test]
    async fn test_full_transcript_reaches_the_model() {
        let npc = personas::get_persona("meridian_ceo").unwrap().to_npc();
        let mut conversation = Conversation::new("user-1", npc);
        conversation.add_turn(Speaker::User, "I want to discuss the expansion plan", None);
        conversation.add_turn(Speaker::Npc, "Then bring numbers, not adjectives.", None);

        let mut llm = MockLlmProvider::new();
        llm.expect_generate().returning(|prompt, system, temperature, _| {
            assert!(prompt.contains("expansion plan"));
            assert!(prompt.contains("Total Turns: 2"));
            assert!(system.contains("evaluation expert"));
            assert_eq!(temperature, Some(0.2));
            Ok("{\"overall_score\": 6.5}".to_string())
        });

        let service = EvaluationService::new(Arc::new(llm));
        let evaluation = service.evaluate_session(&conversation).await.unwrap();

        assert_eq!(evaluation["total_turns"], 2);
        assert_eq!(evaluation["npc_name"], "meridian_ceo");
    }
}
