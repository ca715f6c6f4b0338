//! Deck state: shuffle, draw, fatigue and deck validation

use crate::core::{Card, CardDefinition, CardId};
use crate::{DuelError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One side's deck during a match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckState {
    /// Remaining cards, head first
    pub cards: VecDeque<Card>,

    /// Every card drawn so far, in draw order
    pub drawn_cards: Vec<Card>,

    /// Number of draws attempted from an empty deck. Never decreases.
    pub fatigue_counter: u32,
}

/// Result of drawing from a deck
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn(Card),
    /// The deck was empty; the caller applies `damage` to the side's health
    Fatigue { damage: u32 },
}

impl DeckState {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Look at the next card without drawing it
    pub fn peek(&self) -> Option<&Card> {
        self.cards.front()
    }

    /// Put a card on top, so it is drawn next
    pub fn insert_top(&mut self, card: Card) {
        self.cards.push_front(card);
    }

    /// Put a card at the bottom
    pub fn insert_bottom(&mut self, card: Card) {
        self.cards.push_back(card);
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.cards.iter().any(|c| c.id == card_id)
    }
}

/// Deck operations
pub struct DeckEngine;

impl DeckEngine {
    /// Create per-match instances of the given definitions
    ///
    /// Instance ids are consecutive starting at `first_id`.
    pub fn instantiate(definitions: &[CardDefinition], first_id: u32) -> Vec<Card> {
        definitions
            .iter()
            .zip(first_id..)
            .map(|(def, id)| Card::from_definition(CardId::new(id), def))
            .collect()
    }

    /// Shuffle the cards into a fresh deck with no history and no fatigue
    pub fn initialize_deck(cards: Vec<Card>, rng: &mut impl Rng) -> DeckState {
        let mut cards = cards;
        // SliceRandom::shuffle is a Fisher-Yates shuffle
        cards.shuffle(rng);
        DeckState {
            cards: cards.into(),
            drawn_cards: Vec::new(),
            fatigue_counter: 0,
        }
    }

    /// Draw the head card, or take fatigue if the deck is empty
    ///
    /// Fatigue damage equals the counter after incrementing, so successive
    /// empty draws cost 1, 2, 3, ...
    pub fn draw_card(deck: &mut DeckState) -> DrawOutcome {
        match deck.cards.pop_front() {
            Some(card) => {
                deck.drawn_cards.push(card.clone());
                DrawOutcome::Drawn(card)
            }
            None => {
                deck.fatigue_counter += 1;
                DrawOutcome::Fatigue {
                    damage: deck.fatigue_counter,
                }
            }
        }
    }

    /// Check a deck list against size bounds and card stat bounds
    pub fn validate_deck(definitions: &[CardDefinition], min: usize, max: usize) -> Result<()> {
        if definitions.len() < min || definitions.len() > max {
            return Err(DuelError::InvalidDeck(format!(
                "deck has {} cards, must have between {min} and {max}",
                definitions.len()
            )));
        }
        for def in definitions {
            def.validate()
                .map_err(|e| DuelError::InvalidDeck(e.to_string()))?;
        }
        Ok(())
    }
}
