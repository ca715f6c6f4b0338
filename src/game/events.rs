//! Events emitted while the engine mutates a match
//!
//! Each successful operation returns the events it produced, in order.
//! The owning application uses them for presentation and for recording
//! match results (`GameEnded`); the engine itself writes no records.

use crate::core::{AbilityTarget, CardId, Side};
use crate::game::{AttackTarget, Outcome, Phase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    TurnStarted {
        turn_number: u32,
        side: Side,
    },

    ManaRefilled {
        side: Side,
        mana: u8,
    },

    CardDrawn {
        side: Side,
        card_id: CardId,
    },

    /// Drew from an empty deck
    FatigueDamage {
        side: Side,
        damage: u32,
    },

    PhaseChanged {
        from: Phase,
        to: Phase,
    },

    CardPlayed {
        side: Side,
        card_id: CardId,
        cost: u8,
    },

    AttackerDeclared {
        side: Side,
        card_id: CardId,
        target: AttackTarget,
    },

    BlockerDeclared {
        side: Side,
        blocker_id: CardId,
        attacker_id: CardId,
    },

    CombatAnswered {
        side: Side,
        card_id: CardId,
        is_correct: bool,
        response_time_ms: u64,
    },

    /// An unblocked attacker hit the defending side
    FaceDamage {
        attacker_id: CardId,
        side: Side,
        amount: i32,
    },

    /// Two creatures fought
    Clash {
        attacker_id: CardId,
        defender_id: CardId,
        attacker_strike: i32,
        defender_strike: i32,
    },

    CreatureDestroyed {
        side: Side,
        card_id: CardId,
    },

    AbilityUsed {
        side: Side,
        card_id: CardId,
        target: AbilityTarget,
        amount: i32,
    },

    Healed {
        side: Side,
        amount: i32,
    },

    TurnEnded {
        side: Side,
    },

    /// Emitted exactly once, when either side's health reaches zero
    GameEnded {
        winner: Outcome,
    },
}
