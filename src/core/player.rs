//! Per-side match state

use crate::core::{Card, CardId, DeckState, ManaPool, Side};
use serde::{Deserialize, Serialize};

/// Everything one side owns during a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideState {
    pub side: Side,

    pub health: i32,

    pub mana: ManaPool,

    pub hand: Vec<Card>,

    /// Creatures in play, in the order they entered
    pub board: Vec<Card>,

    pub deck: DeckState,

    /// Consecutive correct combat answers
    pub streak: u32,

    pub best_streak: u32,
}

impl SideState {
    pub fn new(side: Side, starting_health: i32, deck: DeckState) -> Self {
        SideState {
            side,
            health: starting_health,
            mana: ManaPool::new(),
            hand: Vec::new(),
            board: Vec::new(),
            deck,
            streak: 0,
            best_streak: 0,
        }
    }

    pub fn fatigue_counter(&self) -> u32 {
        self.deck.fatigue_counter
    }

    /// Lose health, never dropping below zero
    pub fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount.max(0)).max(0);
    }

    /// Gain health up to `cap`; returns the amount actually restored
    pub fn heal(&mut self, amount: i32, cap: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount.max(0)).min(cap.max(before));
        self.health - before
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    pub fn hand_card(&self, card_id: CardId) -> Option<&Card> {
        self.hand.iter().find(|c| c.id == card_id)
    }

    pub fn board_card(&self, card_id: CardId) -> Option<&Card> {
        self.board.iter().find(|c| c.id == card_id)
    }

    pub fn board_card_mut(&mut self, card_id: CardId) -> Option<&mut Card> {
        self.board.iter_mut().find(|c| c.id == card_id)
    }

    /// Remove a card from the board; returns it if it was there
    pub fn remove_from_board(&mut self, card_id: CardId) -> Option<Card> {
        let pos = self.board.iter().position(|c| c.id == card_id)?;
        // remove() keeps board order stable for deterministic iteration
        Some(self.board.remove(pos))
    }

    /// Record a combat answer and update the streak counters
    pub fn record_answer(&mut self, is_correct: bool) {
        if is_correct {
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }
    }
}
