//! Card catalog: the definitions decks are built from

use crate::core::CardDefinition;
use crate::{DuelError, Result};
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::Arc;

/// Card definitions indexed by catalog key
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: FxHashMap<String, Arc<CardDefinition>>,
}

impl CardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, validating every definition and rejecting
    /// duplicate keys
    pub fn from_definitions(definitions: impl IntoIterator<Item = CardDefinition>) -> Result<Self> {
        let mut catalog = CardCatalog::new();
        for def in definitions {
            catalog.insert(def)?;
        }
        Ok(catalog)
    }

    /// Parse a JSON array of card definitions
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<CardDefinition> =
            serde_json::from_str(json).map_err(|e| DuelError::SerializationError(e.to_string()))?;
        Self::from_definitions(definitions)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, definition: CardDefinition) -> Result<()> {
        definition.validate()?;
        let key = definition.key.to_lowercase();
        if self.cards.contains_key(&key) {
            return Err(DuelError::InvalidCard(format!("duplicate card key '{key}'")));
        }
        self.cards.insert(key, Arc::new(definition));
        Ok(())
    }

    /// Case-insensitive lookup
    pub fn get(&self, key: &str) -> Option<Arc<CardDefinition>> {
        self.cards.get(&key.to_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All definitions, sorted by key
    pub fn definitions(&self) -> Vec<Arc<CardDefinition>> {
        let mut defs: Vec<_> = self.cards.values().cloned().collect();
        defs.sort_by(|a, b| a.key.cmp(&b.key));
        defs
    }
}
