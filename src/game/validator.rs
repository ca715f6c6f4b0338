//! Action legality checks
//!
//! Validation never mutates state. The orchestrator runs it before touching
//! anything, so a rejected action leaves the match exactly as it was.

use crate::config::DuelConfig;
use crate::core::{AbilityTarget, CardId, Side};
use crate::error::ValidationError;
use crate::game::{ActionKind, AttackTarget, ExtendedGameState, GameAction, PhaseSequencer};

type Check = Result<(), ValidationError>;

pub struct ActionValidator<'a> {
    config: &'a DuelConfig,
}

impl<'a> ActionValidator<'a> {
    pub fn new(config: &'a DuelConfig) -> Self {
        ActionValidator { config }
    }

    /// Full check: match still running, right side, phase permits the
    /// action type, then the action's own preconditions
    pub fn validate(&self, state: &ExtendedGameState, action: &GameAction) -> Check {
        if state.winner.is_some() || state.is_game_over().is_some() {
            return Err(ValidationError::GameOver);
        }

        let expected = state.deciding_side();
        if action.player != expected {
            return Err(ValidationError::NotYourDecision {
                expected,
                actual: action.player,
            });
        }

        let action_type = action.action_type();
        if !PhaseSequencer::is_allowed(state.current_phase, action_type) {
            return Err(ValidationError::ActionNotAllowed {
                action: action_type,
                phase: state.current_phase,
            });
        }

        let side = action.player;
        match &action.action {
            ActionKind::PlayCard { card_id } => self.validate_play_card(state, side, *card_id),
            ActionKind::Attack {
                attacker_id,
                target,
                ..
            } => {
                self.validate_attacker(state, side, *attacker_id)?;
                self.validate_attack_target(state, side, *target)
            }
            ActionKind::DeclareAttacker { card_id, target } => {
                self.validate_attacker(state, side, *card_id)?;
                self.validate_attack_target(state, side, *target)
            }
            ActionKind::DeclareBlocker {
                attacker_id,
                blocker_id,
            } => self.validate_blocker(state, side, *attacker_id, *blocker_id),
            ActionKind::SubmitCombatAnswer {
                card_id,
                is_attacker,
                ..
            } => self.validate_answer(state, side, *card_id, *is_attacker),
            ActionKind::UseAbility { card_id, target_id } => {
                self.validate_ability(state, side, *card_id, *target_id)
            }
            ActionKind::ConfirmAttackers
            | ActionKind::SkipBlockers
            | ActionKind::EndPhase
            | ActionKind::PassTurn => Ok(()),
        }
    }

    pub fn validate_play_card(&self, state: &ExtendedGameState, side: Side, card_id: CardId) -> Check {
        let s = state.side(side);
        let card = s
            .hand_card(card_id)
            .ok_or(ValidationError::CardNotInHand(card_id))?;
        if !s.mana.can_afford(card.cost) {
            return Err(ValidationError::InsufficientMana {
                required: card.cost,
                available: s.mana.current,
            });
        }
        if s.board.len() >= self.config.board_limit {
            return Err(ValidationError::BoardFull {
                limit: self.config.board_limit,
            });
        }
        Ok(())
    }

    pub fn validate_attacker(&self, state: &ExtendedGameState, side: Side, card_id: CardId) -> Check {
        let card = state
            .side(side)
            .board_card(card_id)
            .ok_or(ValidationError::CreatureNotOnBoard(card_id))?;
        if state.combat().is_some_and(|c| c.is_attacking(card_id)) {
            return Err(ValidationError::AlreadyAttacking(card_id));
        }
        if card.is_tapped {
            return Err(ValidationError::CreatureTapped(card_id));
        }
        if !card.can_attack {
            return Err(ValidationError::SummoningSick(card_id));
        }
        Ok(())
    }

    pub fn validate_attack_target(
        &self,
        state: &ExtendedGameState,
        side: Side,
        target: AttackTarget,
    ) -> Check {
        match target {
            AttackTarget::Face => Ok(()),
            AttackTarget::Creature(id) => {
                if state.side(side.other()).board_card(id).is_some() {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidAttackTarget(id))
                }
            }
        }
    }

    pub fn validate_blocker(
        &self,
        state: &ExtendedGameState,
        side: Side,
        attacker_id: CardId,
        blocker_id: CardId,
    ) -> Check {
        let combat = state.combat().ok_or(ValidationError::NoActiveCombat)?;
        if !combat.is_attacking(attacker_id) {
            return Err(ValidationError::InvalidBlockTarget(attacker_id));
        }
        if combat.blocker_for(attacker_id).is_some() {
            return Err(ValidationError::AttackerAlreadyBlocked(attacker_id));
        }
        let blocker = state
            .side(side)
            .board_card(blocker_id)
            .ok_or(ValidationError::CreatureNotOnBoard(blocker_id))?;
        if combat.is_blocking(blocker_id) {
            return Err(ValidationError::BlockerAlreadyAssigned(blocker_id));
        }
        if blocker.is_tapped {
            return Err(ValidationError::CreatureTapped(blocker_id));
        }
        Ok(())
    }

    /// Attackers are answered by the active side, blockers by the defender
    pub fn validate_answer(&self, state: &ExtendedGameState, side: Side, card_id: CardId, is_attacker: bool) -> Check {
        let combat = state.combat().ok_or(ValidationError::NoActiveCombat)?;
        if is_attacker != (side == state.active_player) {
            return Err(ValidationError::DeclarationNotFound(card_id));
        }
        let answered = if is_attacker {
            combat
                .attackers
                .iter()
                .find(|a| a.attacker_id == card_id)
                .map(|a| a.answered)
        } else {
            combat
                .blockers
                .iter()
                .find(|b| b.blocker_id == card_id)
                .map(|b| b.answered)
        };
        match answered {
            None => Err(ValidationError::DeclarationNotFound(card_id)),
            Some(true) => Err(ValidationError::AlreadyAnswered(card_id)),
            Some(false) => Ok(()),
        }
    }

    pub fn validate_ability(
        &self,
        state: &ExtendedGameState,
        side: Side,
        card_id: CardId,
        target_id: Option<CardId>,
    ) -> Check {
        let s = state.side(side);
        let card = s
            .board_card(card_id)
            .ok_or(ValidationError::CreatureNotOnBoard(card_id))?;
        let ability = card
            .ability
            .as_ref()
            .ok_or(ValidationError::NoAbility(card_id))?;
        if card.ability_used_this_turn {
            return Err(ValidationError::AbilityAlreadyUsed(card_id));
        }
        if !s.mana.can_afford(ability.mana_cost) {
            return Err(ValidationError::InsufficientMana {
                required: ability.mana_cost,
                available: s.mana.current,
            });
        }
        if ability.target == AbilityTarget::EnemyCreature {
            let target = target_id.ok_or(ValidationError::MissingAbilityTarget(card_id))?;
            if state.side(side.other()).board_card(target).is_none() {
                return Err(ValidationError::InvalidAttackTarget(target));
            }
        }
        Ok(())
    }
}
