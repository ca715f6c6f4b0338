//! Player-submitted actions

use crate::core::{CardId, Side};
use crate::game::ActionType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What an attack is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackTarget {
    /// The defending side's health
    #[default]
    Face,
    /// A creature on the defending board
    Creature(CardId),
}

/// Action payloads, one shape per action type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ActionKind {
    PlayCard {
        card_id: CardId,
    },

    /// Direct attack resolved on the spot, answer correctness included
    Attack {
        attacker_id: CardId,
        #[serde(default)]
        target: AttackTarget,
        is_correct: bool,
    },

    DeclareAttacker {
        card_id: CardId,
        #[serde(default)]
        target: AttackTarget,
    },

    DeclareBlocker {
        attacker_id: CardId,
        blocker_id: CardId,
    },

    ConfirmAttackers,

    SkipBlockers,

    SubmitCombatAnswer {
        card_id: CardId,
        is_attacker: bool,
        is_correct: bool,
        #[serde(default)]
        response_time_ms: u64,
    },

    UseAbility {
        card_id: CardId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_id: Option<CardId>,
    },

    EndPhase,

    PassTurn,
}

impl ActionKind {
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionKind::PlayCard { .. } => ActionType::PlayCard,
            ActionKind::Attack { .. } => ActionType::Attack,
            ActionKind::DeclareAttacker { .. } => ActionType::DeclareAttacker,
            ActionKind::DeclareBlocker { .. } => ActionType::DeclareBlocker,
            ActionKind::ConfirmAttackers => ActionType::ConfirmAttackers,
            ActionKind::SkipBlockers => ActionType::SkipBlockers,
            ActionKind::SubmitCombatAnswer { .. } => ActionType::SubmitCombatAnswer,
            ActionKind::UseAbility { .. } => ActionType::UseAbility,
            ActionKind::EndPhase => ActionType::EndPhase,
            ActionKind::PassTurn => ActionType::PassTurn,
        }
    }
}

/// One submitted action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAction {
    pub player: Side,
    pub timestamp: DateTime<Utc>,
    pub action: ActionKind,
}

impl GameAction {
    /// Stamp an action with the current time
    pub fn new(player: Side, action: ActionKind) -> Self {
        GameAction {
            player,
            timestamp: Utc::now(),
            action,
        }
    }

    /// Build an action with an explicit timestamp (replays, tests)
    pub fn at(player: Side, timestamp: DateTime<Utc>, action: ActionKind) -> Self {
        GameAction {
            player,
            timestamp,
            action,
        }
    }

    pub fn action_type(&self) -> ActionType {
        self.action.action_type()
    }
}
