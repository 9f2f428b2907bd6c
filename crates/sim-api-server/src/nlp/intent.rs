use once_cell::sync::Lazy;
use regex::Regex;

/// Heuristic user intent, attached to user turns as metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Question,
    Proposal,
    Negotiation,
    Greeting,
    Farewell,
    Agreement,
    Disagreement,
    RequestInfo,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Question => "question",
            Intent::Proposal => "proposal",
            Intent::Negotiation => "negotiation",
            Intent::Greeting => "greeting",
            Intent::Farewell => "farewell",
            Intent::Agreement => "agreement",
            Intent::Disagreement => "disagreement",
            Intent::RequestInfo => "request_info",
            Intent::Unknown => "unknown",
        }
    }
}

static INTENT_PATTERNS: Lazy<Vec<(Intent, Vec<Regex>)>> = Lazy::new(|| {
    let compile = |patterns: &[&str]| {
        patterns
            .iter()
            .map(|p| Regex::new(p).expect("intent pattern must compile"))
            .collect::<Vec<_>>()
    };

    vec![
        (
            Intent::Question,
            compile(&[
                r"\b(what|how|why|when|where|who|which|can you|could you|would you)\b",
                r"\?$",
            ]),
        ),
        (
            Intent::Proposal,
            compile(&[r"\b(i (think|propose|suggest|recommend)|let's|we (should|could|might)|my plan)\b"]),
        ),
        (
            Intent::Negotiation,
            compile(&[r"\b(offer|deal|terms|counter|negotiate|compromise|trade-off|agree on)\b"]),
        ),
        (
            Intent::Greeting,
            compile(&[r"\b(hello|hi|hey|good (morning|afternoon|evening)|greetings)\b"]),
        ),
        (
            Intent::Farewell,
            compile(&[r"\b(bye|goodbye|see you|farewell|take care|talk later)\b"]),
        ),
        (
            Intent::Agreement,
            compile(&[r"\b(i agree|absolutely|exactly|correct|yes|sure|definitely|sounds good)\b"]),
        ),
        (
            Intent::Disagreement,
            compile(&[r"\b(i disagree|no|nope|i don't think|that's wrong|incorrect)\b"]),
        ),
        (
            Intent::RequestInfo,
            compile(&[r"\b(tell me|show me|can i see|give me|share|provide)\b"]),
        ),
    ]
});

/// Keyword/pattern intent classifier. Cheap by design; an LLM-based
/// classifier would go behind the same interface.
pub struct IntentDetector;

impl IntentDetector {
    pub fn detect(text: &str) -> Intent {
        Self::detect_with_confidence(text).0
    }

    /// Classify and return a confidence in [0.0, 1.0]: the share of all
    /// pattern matches belonging to the winning intent.
    pub fn detect_with_confidence(text: &str) -> (Intent, f64) {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return (Intent::Unknown, 0.0);
        }

        let mut best: Option<(Intent, usize)> = None;
        let mut total_matches = 0usize;

        for (intent, patterns) in INTENT_PATTERNS.iter() {
            let score = patterns.iter().filter(|p| p.is_match(&text)).count();
            if score == 0 {
                continue;
            }
            total_matches += score;
            if best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((*intent, score));
            }
        }

        match best {
            None => (Intent::Unknown, 0.0),
            Some((intent, score)) => {
                let confidence = score as f64 / total_matches.max(1) as f64;
                (intent, (confidence * 100.0).round() / 100.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_intent() {
        assert_eq!(IntentDetector::detect("What is the Q3 revenue target?"), Intent::Question);
        assert_eq!(IntentDetector::detect("could you walk me through the plan"), Intent::Question);
    }

    #[test]
    fn test_greeting_intent() {
        assert_eq!(IntentDetector::detect("Hello, nice to meet you"), Intent::Greeting);
    }

    #[test]
    fn test_proposal_intent() {
        assert_eq!(
            IntentDetector::detect("I propose we cut the marketing budget"),
            Intent::Proposal
        );
    }

    #[test]
    fn test_negotiation_intent() {
        assert_eq!(
            IntentDetector::detect("Here is my counter offer on the licensing terms"),
            Intent::Negotiation
        );
    }

    #[test]
    fn test_empty_text_is_unknown() {
        let (intent, confidence) = IntentDetector::detect_with_confidence("   ");
        assert_eq!(intent, Intent::Unknown);
        assert_eq!(confidence, 0.0);
    }

    #[test]
    fn test_confidence_is_bounded() {
        let (_, confidence) = IntentDetector::detect_with_confidence("hello, what should we do?");
        assert!(confidence > 0.0 && confidence <= 1.0);
    }
}
