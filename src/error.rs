//! Error types for Mindspark Duel

use crate::core::{CardId, Side};
use crate::game::{ActionType, Phase};
use thiserror::Error;

/// Rule violations for a submitted action.
///
/// These are always recovered locally: the action is rejected and the
/// match state is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The match is already over")]
    GameOver,

    #[error("It is {expected}'s decision, not {actual}'s")]
    NotYourDecision { expected: Side, actual: Side },

    #[error("Action {action} is not allowed during {phase}")]
    ActionNotAllowed { action: ActionType, phase: Phase },

    #[error("Insufficient mana: need {required}, have {available}")]
    InsufficientMana { required: u8, available: u8 },

    #[error("Board is full ({limit} creatures)")]
    BoardFull { limit: usize },

    #[error("Card {0} is not in hand")]
    CardNotInHand(CardId),

    #[error("Creature {0} is not on the board")]
    CreatureNotOnBoard(CardId),

    #[error("Creature {0} is tapped")]
    CreatureTapped(CardId),

    #[error("Creature {0} entered play this turn and cannot attack yet")]
    SummoningSick(CardId),

    #[error("Creature {0} is already attacking")]
    AlreadyAttacking(CardId),

    #[error("Creature {0} is not a declared attacker")]
    InvalidBlockTarget(CardId),

    #[error("Attacker {0} is already blocked")]
    AttackerAlreadyBlocked(CardId),

    #[error("Creature {0} is already blocking")]
    BlockerAlreadyAssigned(CardId),

    #[error("Creature {0} is not a valid attack target")]
    InvalidAttackTarget(CardId),

    #[error("Card {0} has no ability")]
    NoAbility(CardId),

    #[error("Ability of card {0} was already used this turn")]
    AbilityAlreadyUsed(CardId),

    #[error("Ability of card {0} needs an enemy creature target")]
    MissingAbilityTarget(CardId),

    #[error("No combat is in progress")]
    NoActiveCombat,

    #[error("No combat declaration for card {0}")]
    DeclarationNotFound(CardId),

    #[error("Combat problem for card {0} was already answered")]
    AlreadyAnswered(CardId),
}

impl ValidationError {
    /// Stable machine-readable name for API replies
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::GameOver => "game_over",
            ValidationError::NotYourDecision { .. } => "not_your_decision",
            ValidationError::ActionNotAllowed { .. } => "action_not_allowed",
            ValidationError::InsufficientMana { .. } => "insufficient_mana",
            ValidationError::BoardFull { .. } => "board_full",
            ValidationError::CardNotInHand(_) => "card_not_in_hand",
            ValidationError::CreatureNotOnBoard(_) => "creature_not_on_board",
            ValidationError::CreatureTapped(_) => "creature_tapped",
            ValidationError::SummoningSick(_) => "summoning_sick",
            ValidationError::AlreadyAttacking(_) => "already_attacking",
            ValidationError::InvalidBlockTarget(_) => "invalid_block_target",
            ValidationError::AttackerAlreadyBlocked(_) => "attacker_already_blocked",
            ValidationError::BlockerAlreadyAssigned(_) => "blocker_already_assigned",
            ValidationError::InvalidAttackTarget(_) => "invalid_attack_target",
            ValidationError::NoAbility(_) => "no_ability",
            ValidationError::AbilityAlreadyUsed(_) => "ability_already_used",
            ValidationError::MissingAbilityTarget(_) => "missing_ability_target",
            ValidationError::NoActiveCombat => "no_active_combat",
            ValidationError::DeclarationNotFound(_) => "declaration_not_found",
            ValidationError::AlreadyAnswered(_) => "already_answered",
        }
    }
}

#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Invalid action: {0}")]
    Validation(#[from] ValidationError),

    #[error("Corrupted game state: {0}")]
    StateCorruption(String),

    #[error("Content service error: {0}")]
    ExternalService(String),

    #[error("Game {game_id} was modified concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        game_id: String,
        expected: u64,
        found: u64,
    },

    #[error("Game not found: {0}")]
    GameNotFound(String),

    #[error("Game already exists: {0}")]
    GameAlreadyExists(String),

    #[error("Invalid deck: {0}")]
    InvalidDeck(String),

    #[error("Invalid card: {0}")]
    InvalidCard(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DuelError {
    /// Stable machine-readable name for API replies
    pub fn kind(&self) -> &'static str {
        match self {
            DuelError::Validation(e) => e.kind(),
            DuelError::StateCorruption(_) => "state_corruption",
            DuelError::ExternalService(_) => "external_service",
            DuelError::VersionConflict { .. } => "version_conflict",
            DuelError::GameNotFound(_) => "game_not_found",
            DuelError::GameAlreadyExists(_) => "game_already_exists",
            DuelError::InvalidDeck(_) => "invalid_deck",
            DuelError::InvalidCard(_) => "invalid_card",
            DuelError::InvalidConfig(_) => "invalid_config",
            DuelError::IoError(_) => "io",
            DuelError::SerializationError(_) => "serialization",
        }
    }

    /// The validation error behind this error, if it is a rule violation
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            DuelError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DuelError>;
