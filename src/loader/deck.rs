//! Deck list loader
//!
//! One entry per line, `<count> <card-key>`. Blank lines and lines starting
//! with `#` are ignored, as are `[section]` headers.

use crate::core::CardDefinition;
use crate::loader::CardCatalog;
use crate::{DuelError, Result};
use std::fs;
use std::path::Path;

pub struct DeckLoader;

impl DeckLoader {
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<DeckList> {
        let mut entries = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }

            let parsed = line
                .split_once(char::is_whitespace)
                .and_then(|(count, key)| Some((count.parse::<u8>().ok()?, key.trim())));
            match parsed {
                Some((count, key)) if count > 0 && !key.is_empty() => entries.push(DeckEntry {
                    card_key: key.to_string(),
                    count,
                }),
                _ => {
                    return Err(DuelError::InvalidDeck(format!(
                        "line {}: expected '<count> <card-key>', got '{line}'",
                        line_no + 1
                    )))
                }
            }
        }

        if entries.is_empty() {
            return Err(DuelError::InvalidDeck("Empty deck".to_string()));
        }
        Ok(DeckList { entries })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub card_key: String,
    pub count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckList {
    pub entries: Vec<DeckEntry>,
}

impl DeckList {
    pub fn total_cards(&self) -> usize {
        self.entries.iter().map(|e| e.count as usize).sum()
    }

    /// Expand the list into one definition per card copy
    pub fn resolve(&self, catalog: &CardCatalog) -> Result<Vec<CardDefinition>> {
        let mut cards = Vec::with_capacity(self.total_cards());
        for entry in &self.entries {
            let def = catalog
                .get(&entry.card_key)
                .ok_or_else(|| DuelError::InvalidDeck(format!("unknown card '{}'", entry.card_key)))?;
            cards.extend(std::iter::repeat(def.as_ref().clone()).take(entry.count as usize));
        }
        Ok(cards)
    }
}
