//! Static NPC persona registry.
//!
//! Personas are reference data: the registry hands out `Npc` snapshots and
//! system prompts, and a conversation keeps its own copy of the snapshot so
//! later edits here never rewrite history.

mod ceo;
mod chro;
mod finance_ic;

use serde::Serialize;
use serde_json::{json, Map};

use crate::domain::Npc;
use crate::utils::error::ApiError;

/// A configured AI character definition.
pub struct Persona {
    pub name: &'static str,
    pub display_name: &'static str,
    pub role: &'static str,
    pub company: &'static str,
    pub system_prompt: &'static str,
    /// (user, assistant) example exchanges.
    pub few_shots: &'static [(&'static str, &'static str)],
    pub traits: &'static [(&'static str, f64)],
    pub communication_style: &'static [(&'static str, &'static str)],
    pub knowledge_domains: &'static [&'static str],
}

impl Persona {
    /// Build the per-conversation NPC snapshot.
    pub fn to_npc(&self) -> Npc {
        let mut style = Map::new();
        for (key, value) in self.communication_style {
            style.insert((*key).to_string(), json!(value));
        }

        Npc {
            id: self.name.to_string(),
            name: self.name.to_string(),
            role_title: self.role.to_string(),
            company: self.company.to_string(),
            traits: self
                .traits
                .iter()
                .map(|(k, v)| ((*k).to_string(), *v))
                .collect(),
            communication_style: style,
            knowledge_domains: self
                .knowledge_domains
                .iter()
                .map(|d| (*d).to_string())
                .collect(),
        }
    }
}

static REGISTRY: &[&Persona] = &[&ceo::PERSONA, &chro::PERSONA, &finance_ic::PERSONA];

pub fn get_persona(name: &str) -> Result<&'static Persona, ApiError> {
    REGISTRY
        .iter()
        .find(|p| p.name == name)
        .copied()
        .ok_or_else(|| ApiError::NpcNotFound(format!("Persona '{name}' is not registered")))
}

pub fn system_prompt(name: &str) -> Result<&'static str, ApiError> {
    Ok(get_persona(name)?.system_prompt)
}

pub fn few_shot_examples(name: &str) -> Result<&'static [(&'static str, &'static str)], ApiError> {
    Ok(get_persona(name)?.few_shots)
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonaInfo {
    pub name: String,
    pub display_name: String,
    pub role: String,
}

pub fn list_personas() -> Vec<PersonaInfo> {
    REGISTRY
        .iter()
        .map(|p| PersonaInfo {
            name: p.name.to_string(),
            display_name: p.display_name.to_string(),
            role: p.role.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contains_three_personas() {
        let personas = list_personas();
        assert_eq!(personas.len(), 3);
        assert!(personas.iter().any(|p| p.name == "meridian_ceo"));
        assert!(personas.iter().any(|p| p.name == "meridian_chro"));
        assert!(personas.iter().any(|p| p.name == "meridian_finance_ic"));
    }

    #[test]
    fn test_unknown_persona_is_typed_error() {
        assert!(matches!(
            get_persona("meridian_intern"),
            Err(ApiError::NpcNotFound(_))
        ));
    }

    #[test]
    fn test_npc_snapshot_carries_persona_data() {
        let npc = get_persona("meridian_ceo").unwrap().to_npc();
        assert_eq!(npc.name, "meridian_ceo");
        assert_eq!(npc.company, "Meridian Group");
        assert!(!npc.traits.is_empty());
        assert!(!npc.knowledge_domains.is_empty());
    }

    #[test]
    fn test_every_persona_has_prompt_and_few_shots() {
        for info in list_personas() {
            let persona = get_persona(&info.name).unwrap();
            assert!(!persona.system_prompt.is_empty());
            assert!(!persona.few_shots.is_empty());
        }
    }
}
