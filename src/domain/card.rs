// src/domain/card.rs
use crate::constants::{DEFAULT_DECK, DEFAULT_GAME_TAG, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};

/// A mastered problem as the page hands it to the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub front: String,
    pub back: String,
    pub level: u8,
}

/// Where and how notes land in the Anki collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTemplate {
    pub deck: String,
    pub model: String,
    pub game_tag: String,
}

impl Default for NoteTemplate {
    fn default() -> Self {
        Self {
            deck: DEFAULT_DECK.to_string(),
            model: DEFAULT_MODEL.to_string(),
            game_tag: DEFAULT_GAME_TAG.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFields {
    #[serde(rename = "Front")]
    pub front: String,
    #[serde(rename = "Back")]
    pub back: String,
}

/// AnkiConnect `addNote` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardNote {
    pub deck_name: String,
    pub model_name: String,
    pub fields: NoteFields,
    pub tags: Vec<String>,
}

impl FlashcardNote {
    pub fn from_card(card: &Card, template: &NoteTemplate) -> Self {
        Self {
            deck_name: template.deck.clone(),
            model_name: template.model.clone(),
            fields: NoteFields {
                front: card.front.clone(),
                back: card.back.clone(),
            },
            tags: vec![template.game_tag.clone(), format!("level-{}", card.level)],
        }
    }
}
